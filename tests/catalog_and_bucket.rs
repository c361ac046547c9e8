use chrono::{Duration, Utc};
use kisan_kart_api::{
    dto::bucket::{AddBucketItemRequest, CheckoutRequest},
    dto::farmers::RegisterFarmerRequest,
    dto::products::CreateProductRequest,
    error::AppError,
    middleware::auth::{Principal, Role},
    models::{GeoPoint, OrderStatus, Product, ProductStatus},
    routes::params::{CatalogQuery, FarmerProductsQuery},
    services::{bucket_service, catalog_service, farmer_service, product_service},
    state::AppState,
    store::OrderFilter,
};
use uuid::Uuid;

const NASHIK: GeoPoint = GeoPoint {
    latitude: 19.9975,
    longitude: 73.7898,
};
const PUNJAB: GeoPoint = GeoPoint {
    latitude: 31.1471,
    longitude: 75.3412,
};

fn farmer() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role: Role::Farmer,
    }
}

fn customer() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        role: Role::Customer,
    }
}

async fn seed_product(
    state: &AppState,
    owner: &Principal,
    name: &str,
    quantity: i64,
    location: Option<GeoPoint>,
) -> Product {
    let resp = product_service::create_product(
        state,
        owner,
        CreateProductRequest {
            name: name.into(),
            category: None,
            price: 40.0,
            quantity,
            area: "Nashik".into(),
            description: None,
            image: None,
            expires_at: None,
            location,
        },
    )
    .await
    .expect("create product");
    resp.data.expect("product data")
}

fn near(point: GeoPoint, radius_km: f64) -> CatalogQuery {
    CatalogQuery {
        latitude: Some(point.latitude),
        longitude: Some(point.longitude),
        radius_km: Some(radius_km),
        ..Default::default()
    }
}

#[tokio::test]
async fn radius_query_filters_and_falls_back() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let owner = farmer();

    let tomatoes = seed_product(&state, &owner, "Fresh Organic Tomatoes", 20, Some(NASHIK)).await;
    let rice = seed_product(&state, &owner, "Basmati Rice", 50, Some(PUNJAB)).await;

    // Viewer near Nashik sees only the Nashik crop.
    let nearby = catalog_service::list_available(&state, near(NASHIK, 100.0)).await?;
    let items = nearby.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, tomatoes.id);

    // Nothing grows in the middle of the ocean: fall back to the full listing.
    let remote = GeoPoint {
        latitude: 0.0,
        longitude: -160.0,
    };
    let fallback = catalog_service::list_available(&state, near(remote, 50.0)).await?;
    assert_eq!(fallback.data.unwrap().items.len(), 2);

    // No location known: plain available listing.
    let all = catalog_service::list_available(&state, CatalogQuery::default()).await?;
    let ids: Vec<Uuid> = all.data.unwrap().items.iter().map(|p| p.id).collect();
    assert!(ids.contains(&tomatoes.id) && ids.contains(&rice.id));

    Ok(())
}

#[tokio::test]
async fn delisted_products_leave_the_catalog_but_stay_resolvable() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let owner = farmer();

    let product = seed_product(&state, &owner, "Fresh Organic Tomatoes", 20, None).await;
    product_service::delete_product(&state, &owner, product.id).await?;

    let listing = catalog_service::list_available(&state, CatalogQuery::default()).await?;
    assert!(listing.data.unwrap().items.is_empty());

    // Soft delete: the record survives with a flipped status.
    let fetched = product_service::get_product(&state, product.id).await?;
    assert_eq!(fetched.data.unwrap().status, ProductStatus::Unavailable);

    Ok(())
}

#[tokio::test]
async fn farmer_listing_can_exclude_expired_products() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let owner = farmer();

    seed_product(&state, &owner, "Fresh Organic Tomatoes", 20, None).await;
    let expired = product_service::create_product(
        &state,
        &owner,
        CreateProductRequest {
            name: "Last Season Mangoes".into(),
            category: None,
            price: 90.0,
            quantity: 5,
            area: "Ratnagiri".into(),
            description: None,
            image: None,
            expires_at: Some(Utc::now() - Duration::days(3)),
            location: None,
        },
    )
    .await?
    .data
    .unwrap();

    let everything = catalog_service::list_for_farmer(
        &state,
        owner.id,
        FarmerProductsQuery {
            include_expired: None,
        },
    )
    .await?;
    assert_eq!(everything.data.unwrap().items.len(), 2);

    let fresh_only = catalog_service::list_for_farmer(
        &state,
        owner.id,
        FarmerProductsQuery {
            include_expired: Some(false),
        },
    )
    .await?;
    let items = fresh_only.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|p| p.id != expired.id));

    Ok(())
}

#[tokio::test]
async fn bucket_merges_additively_and_checks_out() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let owner = farmer();
    let buyer = customer();

    let product = seed_product(&state, &owner, "Fresh Organic Tomatoes", 20, None).await;

    for _ in 0..2 {
        bucket_service::add_to_bucket(
            &state,
            &buyer,
            AddBucketItemRequest {
                product_id: product.id,
                quantity: 3,
            },
        )
        .await?;
    }

    let view = bucket_service::view_bucket(&state, &buyer).await?;
    let lines = view.data.unwrap().items;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 6);

    // Staging never reserves stock.
    assert_eq!(state.inventory.get(product.id).await?.unwrap().quantity, 20);

    let checked_out = bucket_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            payment_method: "upi".into(),
        },
    )
    .await?;
    let orders = checked_out.data.unwrap().orders;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].quantity, 6);
    assert_eq!(orders[0].total_price, 240.0);
    assert_eq!(orders[0].status, OrderStatus::Pending);

    assert_eq!(state.inventory.get(product.id).await?.unwrap().quantity, 14);

    // Checkout drains the bucket.
    let emptied = bucket_service::view_bucket(&state, &buyer).await?;
    assert!(emptied.data.unwrap().items.is_empty());

    Ok(())
}

#[tokio::test]
async fn failed_checkout_restores_every_debit() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let owner = farmer();
    let buyer = customer();

    let tomatoes = seed_product(&state, &owner, "Fresh Organic Tomatoes", 20, None).await;
    let rice = seed_product(&state, &owner, "Basmati Rice", 2, None).await;

    bucket_service::add_to_bucket(
        &state,
        &buyer,
        AddBucketItemRequest {
            product_id: tomatoes.id,
            quantity: 5,
        },
    )
    .await?;
    bucket_service::add_to_bucket(
        &state,
        &buyer,
        AddBucketItemRequest {
            product_id: rice.id,
            quantity: 10,
        },
    )
    .await?;

    let err = bucket_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            payment_method: "upi".into(),
        },
    )
    .await
    .expect_err("second line exceeds stock");
    assert!(matches!(err, AppError::InsufficientStock));

    // All-or-nothing: the first line's debit was rolled back.
    assert_eq!(state.inventory.get(tomatoes.id).await?.unwrap().quantity, 20);
    assert_eq!(state.inventory.get(rice.id).await?.unwrap().quantity, 2);
    assert!(state.ledger.list(OrderFilter::default()).await?.is_empty());

    // The bucket is untouched and can be fixed up and retried.
    let view = bucket_service::view_bucket(&state, &buyer).await?;
    assert_eq!(view.data.unwrap().items.len(), 2);

    Ok(())
}

#[tokio::test]
async fn farmer_profiles_round_trip() -> anyhow::Result<()> {
    let state = AppState::in_memory();

    let registered = farmer_service::register_farmer(
        &state,
        RegisterFarmerRequest {
            name: "Nashik Demo Farm".into(),
            phone_number: "+91-9000000001".into(),
            location: NASHIK,
            bio: Some("Family-run vegetable farm.".into()),
            profile_picture: None,
        },
    )
    .await?
    .data
    .unwrap();

    let fetched = farmer_service::get_farmer(&state, registered.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched.name, "Nashik Demo Farm");
    assert_eq!(fetched.location, NASHIK);

    // Ids collide only on a duplicate insert, which the store refuses.
    let err = state
        .farmers
        .insert(registered)
        .await
        .expect_err("duplicate id");
    assert!(matches!(err, AppError::DuplicateEntry));

    Ok(())
}

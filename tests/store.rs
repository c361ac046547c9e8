use chrono::{Duration, Utc};
use kisan_kart_api::{
    error::AppError,
    models::{GeoPoint, Product, ProductStatus},
    state::AppState,
};
use uuid::Uuid;

fn sample_product() -> Product {
    Product {
        id: Uuid::new_v4(),
        farmer_id: Some(Uuid::new_v4()),
        name: "Fresh Organic Tomatoes".into(),
        category: "Vegetables".into(),
        price: 40.0,
        quantity: 20,
        area: "Nashik".into(),
        description: Some("Farm-fresh ripe tomatoes.".into()),
        image: Some("background.png".into()),
        status: ProductStatus::Available,
        expires_at: Some(Utc::now() + Duration::days(7)),
        location: Some(GeoPoint {
            latitude: 19.9975,
            longitude: 73.7898,
        }),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn product_round_trips_through_the_store() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let product = sample_product();

    state.inventory.insert(product.clone()).await?;
    let fetched = state.inventory.get(product.id).await?.expect("product");

    assert_eq!(fetched.id, product.id);
    assert_eq!(fetched.farmer_id, product.farmer_id);
    assert_eq!(fetched.name, product.name);
    assert_eq!(fetched.category, product.category);
    assert_eq!(fetched.price, product.price);
    assert_eq!(fetched.quantity, product.quantity);
    assert_eq!(fetched.area, product.area);
    assert_eq!(fetched.description, product.description);
    assert_eq!(fetched.image, product.image);
    assert_eq!(fetched.status, product.status);
    assert_eq!(fetched.expires_at, product.expires_at);
    assert_eq!(fetched.location, product.location);
    assert_eq!(fetched.created_at, product.created_at);

    Ok(())
}

#[tokio::test]
async fn duplicate_product_ids_are_refused() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let product = sample_product();

    state.inventory.insert(product.clone()).await?;
    let err = state
        .inventory
        .insert(product)
        .await
        .expect_err("same id twice");
    assert!(matches!(err, AppError::DuplicateEntry));

    Ok(())
}

#[tokio::test]
async fn debit_stops_at_the_zero_floor() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let product = sample_product();
    state.inventory.insert(product.clone()).await?;

    // Draining to exactly zero is allowed.
    let drained = state.inventory.debit(product.id, 20).await?;
    assert_eq!(drained.quantity, 0);

    let err = state
        .inventory
        .debit(product.id, 1)
        .await
        .expect_err("empty shelf");
    assert!(matches!(err, AppError::InsufficientStock));

    state.inventory.credit(product.id, 5).await?;
    let restocked = state.inventory.debit(product.id, 5).await?;
    assert_eq!(restocked.quantity, 0);

    let err = state
        .inventory
        .debit(Uuid::new_v4(), 1)
        .await
        .expect_err("unknown product");
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn fulfilling_an_unknown_order_is_not_found() {
    let state = AppState::in_memory();
    let err = state
        .ledger
        .transition_to_successful(Uuid::new_v4())
        .await
        .expect_err("no such order");
    assert!(matches!(err, AppError::NotFound));
}

#[test]
fn haversine_distance_is_sane() {
    let origin = GeoPoint {
        latitude: 19.0,
        longitude: 73.0,
    };
    assert!(origin.distance_km(&origin) < 1e-9);

    // One degree of latitude is roughly 111 km.
    let one_degree_north = GeoPoint {
        latitude: 20.0,
        longitude: 73.0,
    };
    let d = origin.distance_km(&one_degree_north);
    assert!((110.0..113.0).contains(&d), "got {d}");
}

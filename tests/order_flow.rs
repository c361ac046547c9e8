use kisan_kart_api::{
    dto::orders::PlaceOrderRequest,
    dto::products::CreateProductRequest,
    error::AppError,
    middleware::auth::{Principal, Role},
    models::{OrderStatus, Product},
    routes::params::OrderListQuery,
    services::order_service,
    services::product_service,
    state::AppState,
    store::OrderFilter,
};
use uuid::Uuid;

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

fn order_query(status: Option<OrderStatus>) -> OrderListQuery {
    OrderListQuery {
        status,
        ..Default::default()
    }
}

async fn seed_product(
    state: &AppState,
    owner: &Principal,
    name: &str,
    price: f64,
    quantity: i64,
) -> Product {
    let resp = product_service::create_product(
        state,
        owner,
        CreateProductRequest {
            name: name.into(),
            category: Some("Vegetables".into()),
            price,
            quantity,
            area: "Nashik".into(),
            description: None,
            image: None,
            expires_at: None,
            location: None,
        },
    )
    .await
    .expect("create product");
    resp.data.expect("product data")
}

// Scenario from the marketplace flow: a 5-unit purchase captures the price,
// debits stock, and the order later moves to successful exactly once.
#[tokio::test]
async fn place_and_fulfill_order_flow() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let farmer = farmer();
    let customer = customer();

    let product = seed_product(&state, &farmer, "Fresh Organic Tomatoes", 40.0, 20).await;

    let placed = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            product_id: product.id,
            quantity: 5,
            payment_method: "cash".into(),
        },
    )
    .await?;
    let order = placed.data.expect("order data");
    assert_eq!(order.total_price, 200.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.completed_at.is_none());

    let live = state.inventory.get(product.id).await?.expect("product");
    assert_eq!(live.quantity, 15);

    // A later price change never rewrites the captured total.
    let fulfilled = order_service::fulfill_order(&state, &farmer, order.id).await?;
    let fulfilled = fulfilled.data.expect("order data");
    assert_eq!(fulfilled.status, OrderStatus::Successful);
    assert!(fulfilled.completed_at.is_some());
    assert_eq!(fulfilled.total_price, 200.0);

    // Fulfilled orders leave the pending listings for both parties.
    let farmer_pending =
        order_service::list_orders(&state, &farmer, order_query(Some(OrderStatus::Pending)))
            .await?;
    assert!(farmer_pending.data.unwrap().items.is_empty());
    let customer_pending =
        order_service::list_orders(&state, &customer, order_query(Some(OrderStatus::Pending)))
            .await?;
    assert!(customer_pending.data.unwrap().items.is_empty());

    Ok(())
}

#[tokio::test]
async fn insufficient_stock_leaves_everything_unchanged() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let farmer = farmer();
    let customer = customer();

    let product = seed_product(&state, &farmer, "Fresh Organic Tomatoes", 40.0, 15).await;

    let err = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            product_id: product.id,
            quantity: 16,
            payment_method: "cash".into(),
        },
    )
    .await
    .expect_err("should exceed stock");
    assert!(matches!(err, AppError::InsufficientStock));

    let live = state.inventory.get(product.id).await?.expect("product");
    assert_eq!(live.quantity, 15);

    let ledger = state.ledger.list(OrderFilter::default()).await?;
    assert!(ledger.is_empty());

    Ok(())
}

#[tokio::test]
async fn rejects_missing_product_and_bad_quantity() {
    let state = AppState::in_memory();
    let farmer = farmer();
    let customer = customer();

    let err = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
            payment_method: "cash".into(),
        },
    )
    .await
    .expect_err("unknown product");
    assert!(matches!(err, AppError::NotFound));

    let product =
        seed_product(&state, &farmer, "Fresh Organic Tomatoes", 40.0, 20).await;
    for quantity in [0, -3] {
        let err = order_service::place_order(
            &state,
            &customer,
            PlaceOrderRequest {
                product_id: product.id,
                quantity,
                payment_method: "cash".into(),
            },
        )
        .await
        .expect_err("bad quantity");
        assert!(matches!(err, AppError::InvalidQuantity));
    }
}

// Two buyers race for 5 units, each wanting 3: exactly one wins and stock
// never dips below zero.
#[tokio::test]
async fn concurrent_orders_never_overdraw_stock() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let farmer = farmer();

    let product = seed_product(&state, &farmer, "Fresh Organic Tomatoes", 40.0, 5).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let state = state.clone();
        let buyer = customer();
        let product_id = product.id;
        handles.push(tokio::spawn(async move {
            order_service::place_order(
                &state,
                &buyer,
                PlaceOrderRequest {
                    product_id,
                    quantity: 3,
                    payment_method: "cash".into(),
                },
            )
            .await
        }));
    }

    let mut successes = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(AppError::InsufficientStock) => insufficient += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(insufficient, 1);

    let live = state.inventory.get(product.id).await?.expect("product");
    assert_eq!(live.quantity, 2);

    let ledger = state.ledger.list(OrderFilter::default()).await?;
    assert_eq!(ledger.len(), 1);

    Ok(())
}

#[tokio::test]
async fn duplicate_fulfillment_is_rejected() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let farmer = farmer();
    let customer = customer();

    let product = seed_product(&state, &farmer, "Fresh Organic Tomatoes", 40.0, 20).await;

    let placed = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            product_id: product.id,
            quantity: 2,
            payment_method: "upi".into(),
        },
    )
    .await?;
    let order = placed.data.expect("order data");

    order_service::fulfill_order(&state, &farmer, order.id).await?;

    let err = order_service::fulfill_order(&state, &farmer, order.id)
        .await
        .expect_err("already successful");
    assert!(matches!(err, AppError::InvalidState));

    // The successful set holds the order exactly once.
    let successful =
        order_service::list_orders(&state, &farmer, order_query(Some(OrderStatus::Successful)))
            .await?;
    let items = successful.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, order.id);

    Ok(())
}

#[tokio::test]
async fn only_the_owning_farmer_can_fulfill() -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let owner = farmer();
    let other_farmer = farmer();
    let customer = customer();

    let product = seed_product(&state, &owner, "Fresh Organic Tomatoes", 40.0, 20).await;

    let placed = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            product_id: product.id,
            quantity: 1,
            payment_method: "cash".into(),
        },
    )
    .await?;
    let order = placed.data.expect("order data");

    let err = order_service::fulfill_order(&state, &other_farmer, order.id)
        .await
        .expect_err("wrong farmer");
    assert!(matches!(err, AppError::Forbidden));

    let err = order_service::fulfill_order(&state, &customer, order.id)
        .await
        .expect_err("customers cannot fulfill");
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

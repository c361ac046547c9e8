use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderList, PlaceOrderRequest},
    error::{AppError, AppResult},
    middleware::auth::{ensure_farmer, Principal, Role},
    models::{NewOrder, Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
    store::OrderFilter,
};

/// Validate a purchase against current stock, debit the inventory and append
/// a pending order, all-or-nothing. The debit itself is the atomic
/// compare-and-decrement; if the append fails afterwards the debit is
/// compensated before the error propagates.
pub async fn place_order(
    state: &AppState,
    principal: &Principal,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let product = state
        .inventory
        .get(payload.product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if payload.quantity <= 0 {
        return Err(AppError::InvalidQuantity);
    }

    // Price is captured here; later price changes never touch this order.
    let total_price = payload.quantity as f64 * product.price;

    let debited = state
        .inventory
        .debit(product.id, payload.quantity)
        .await?;

    let new_order = NewOrder {
        customer_id: Some(principal.id),
        product_id: product.id,
        farmer_id: product.farmer_id,
        quantity: payload.quantity,
        total_price,
        payment_method: payload.payment_method,
    };

    let order = match state.ledger.append(new_order).await {
        Ok(order) => order,
        Err(err) => {
            if let Err(credit_err) = state
                .inventory
                .credit(product.id, payload.quantity)
                .await
            {
                tracing::error!(
                    error = %credit_err,
                    product_id = %product.id,
                    quantity = payload.quantity,
                    "could not restore stock after ledger append failure"
                );
            }
            return Err(err);
        }
    };

    tracing::info!(
        order_id = %order.id,
        product_id = %product.id,
        quantity = order.quantity,
        remaining_stock = debited.quantity,
        "order placed"
    );

    if let Err(err) = log_audit(
        state.audit.as_ref(),
        Some(principal.id),
        "order_placed",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        order,
        Some(Meta::empty()),
    ))
}

/// Move an order from pending to successful. Farmer-initiated; stock was
/// already debited at placement, so fulfillment has no inventory effect.
pub async fn fulfill_order(
    state: &AppState,
    principal: &Principal,
    order_id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_farmer(principal)?;

    let order = state
        .ledger
        .get(order_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.farmer_id != Some(principal.id) {
        return Err(AppError::Forbidden);
    }
    if order.status != OrderStatus::Pending {
        return Err(AppError::InvalidState);
    }

    // The ledger re-checks the state atomically; a racing duplicate attempt
    // fails there with InvalidState.
    let order = state.ledger.transition_to_successful(order_id).await?;

    if let Err(err) = log_audit(
        state.audit.as_ref(),
        Some(principal.id),
        "order_fulfilled",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order fulfilled",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    principal: &Principal,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut filter = OrderFilter {
        status: query.status,
        ..Default::default()
    };
    match principal.role {
        Role::Customer => filter.customer_id = Some(principal.id),
        Role::Farmer => filter.farmer_id = Some(principal.id),
    }

    let mut orders = state.ledger.list(filter).await?;
    if matches!(query.sort_order, Some(SortOrder::Desc) | None) {
        orders.reverse();
    }

    let total = orders.len() as i64;
    let items: Vec<Order> = orders
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = state.ledger.get(id).await?.ok_or(AppError::NotFound)?;

    let owned = match principal.role {
        Role::Customer => order.customer_id == Some(principal.id),
        Role::Farmer => order.farmer_id == Some(principal.id),
    };
    if !owned {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

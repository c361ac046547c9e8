use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::bucket::{AddBucketItemRequest, BucketLine, BucketView, CheckoutRequest, CheckoutResponse},
    error::{AppError, AppResult},
    middleware::auth::{ensure_customer, Principal},
    models::{BucketItem, NewOrder, Product},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn view_bucket(
    state: &AppState,
    principal: &Principal,
) -> AppResult<ApiResponse<BucketView>> {
    ensure_customer(principal)?;

    let items = state.buckets.get(principal.id).await?;
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        // A delisted product keeps its record, so the line stays resolvable.
        if let Some(product) = state.inventory.get(item.product_id).await? {
            lines.push(BucketLine {
                product,
                quantity: item.quantity,
            });
        }
    }

    Ok(ApiResponse::success(
        "OK",
        BucketView { items: lines },
        Some(Meta::empty()),
    ))
}

/// Stage a product in the customer's bucket. Adding the same product twice
/// merges the quantities; nothing is reserved until checkout.
pub async fn add_to_bucket(
    state: &AppState,
    principal: &Principal,
    payload: AddBucketItemRequest,
) -> AppResult<ApiResponse<BucketView>> {
    ensure_customer(principal)?;

    if payload.quantity <= 0 {
        return Err(AppError::InvalidQuantity);
    }
    if state.inventory.get(payload.product_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    state
        .buckets
        .add(
            principal.id,
            BucketItem {
                product_id: payload.product_id,
                quantity: payload.quantity,
            },
        )
        .await?;

    view_bucket(state, principal).await
}

pub async fn remove_from_bucket(
    state: &AppState,
    principal: &Principal,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(principal)?;

    state.buckets.remove(principal.id, product_id).await?;

    Ok(ApiResponse::success(
        "Removed from bucket",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Commit the bucket: debit every line, then append one pending order per
/// line and clear the bucket. If any line cannot be debited, every debit
/// already taken is credited back so a failed checkout changes nothing.
pub async fn checkout(
    state: &AppState,
    principal: &Principal,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    ensure_customer(principal)?;

    let items = state.buckets.get(principal.id).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest("Bucket is empty".into()));
    }

    let mut debited: Vec<(Product, i64)> = Vec::with_capacity(items.len());
    for item in &items {
        if item.quantity <= 0 {
            rollback_debits(state, &debited).await;
            return Err(AppError::InvalidQuantity);
        }
        let product = match state.inventory.get(item.product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                rollback_debits(state, &debited).await;
                return Err(AppError::NotFound);
            }
            Err(err) => {
                rollback_debits(state, &debited).await;
                return Err(err);
            }
        };
        if let Err(err) = state.inventory.debit(product.id, item.quantity).await {
            rollback_debits(state, &debited).await;
            return Err(err);
        }
        debited.push((product, item.quantity));
    }

    let mut orders = Vec::with_capacity(debited.len());
    for (idx, (product, quantity)) in debited.iter().enumerate() {
        let new_order = NewOrder {
            customer_id: Some(principal.id),
            product_id: product.id,
            farmer_id: product.farmer_id,
            quantity: *quantity,
            total_price: *quantity as f64 * product.price,
            payment_method: payload.payment_method.clone(),
        };
        match state.ledger.append(new_order).await {
            Ok(order) => orders.push(order),
            Err(err) => {
                // Orders already appended stand; restore the stock of the
                // lines that never made it into the ledger.
                rollback_debits(state, &debited[idx..]).await;
                return Err(err);
            }
        }
    }

    state.buckets.clear(principal.id).await?;

    if let Err(err) = log_audit(
        state.audit.as_ref(),
        Some(principal.id),
        "bucket_checkout",
        Some("orders"),
        Some(serde_json::json!({
            "order_ids": orders.iter().map(|o| o.id).collect::<Vec<_>>()
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse { orders },
        Some(Meta::empty()),
    ))
}

async fn rollback_debits(state: &AppState, debited: &[(Product, i64)]) {
    for (product, quantity) in debited {
        if let Err(err) = state.inventory.credit(product.id, *quantity).await {
            tracing::error!(
                error = %err,
                product_id = %product.id,
                quantity,
                "could not restore stock during checkout rollback"
            );
        }
    }
}

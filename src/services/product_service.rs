use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::{ensure_farmer, Principal},
    models::{Product, ProductStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// A farmer lists a crop. Category and description fall back to the same
/// defaults the marketplace has always used.
pub async fn create_product(
    state: &AppState,
    principal: &Principal,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_farmer(principal)?;

    if payload.price < 0.0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.quantity < 0 {
        return Err(AppError::BadRequest("quantity must not be negative".into()));
    }

    let description = payload
        .description
        .or_else(|| Some(format!("Grown in {}", payload.area)));

    let product = Product {
        id: Uuid::new_v4(),
        farmer_id: Some(principal.id),
        name: payload.name,
        category: payload
            .category
            .unwrap_or_else(|| "Fresh Produce".to_string()),
        price: payload.price,
        quantity: payload.quantity,
        area: payload.area,
        description,
        image: payload.image,
        status: ProductStatus::Available,
        expires_at: payload.expires_at,
        location: payload.location,
        created_at: Utc::now(),
    };

    let product = state.inventory.insert(product).await?;

    if let Err(err) = log_audit(
        state.audit.as_ref(),
        Some(principal.id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = state.inventory.get(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn update_product(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_farmer(principal)?;

    let existing = state.inventory.get(id).await?.ok_or(AppError::NotFound)?;
    if existing.farmer_id != Some(principal.id) {
        return Err(AppError::Forbidden);
    }

    if matches!(payload.price, Some(p) if p < 0.0) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    let mut updated = existing;
    if let Some(name) = payload.name {
        updated.name = name;
    }
    if let Some(category) = payload.category {
        updated.category = category;
    }
    if let Some(price) = payload.price {
        updated.price = price;
    }
    if let Some(area) = payload.area {
        updated.area = area;
    }
    if let Some(description) = payload.description {
        updated.description = Some(description);
    }
    if let Some(image) = payload.image {
        updated.image = Some(image);
    }
    if let Some(status) = payload.status {
        updated.status = status;
    }
    if let Some(expires_at) = payload.expires_at {
        updated.expires_at = Some(expires_at);
    }
    if let Some(location) = payload.location {
        updated.location = Some(location);
    }

    let product = state.inventory.update(updated).await?;

    if let Err(err) = log_audit(
        state.audit.as_ref(),
        Some(principal.id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product,
        Some(Meta::empty()),
    ))
}

/// Products are never hard-deleted; the status flips to unavailable so
/// existing orders keep a resolvable product reference.
pub async fn delete_product(
    state: &AppState,
    principal: &Principal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_farmer(principal)?;

    let existing = state.inventory.get(id).await?.ok_or(AppError::NotFound)?;
    if existing.farmer_id != Some(principal.id) {
        return Err(AppError::Forbidden);
    }

    state.inventory.mark_unavailable(id).await?;

    if let Err(err) = log_audit(
        state.audit.as_ref(),
        Some(principal.id),
        "product_delist",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Delisted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

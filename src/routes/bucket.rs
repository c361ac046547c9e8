use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::bucket::{AddBucketItemRequest, BucketView, CheckoutRequest, CheckoutResponse},
    error::AppResult,
    middleware::auth::Principal,
    response::ApiResponse,
    services::bucket_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_bucket))
        .route("/items", post(add_to_bucket))
        .route("/items/{product_id}", delete(remove_from_bucket))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/bucket",
    responses(
        (status = 200, description = "Bucket contents", body = ApiResponse<BucketView>)
    ),
    tag = "Bucket"
)]
pub async fn view_bucket(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<BucketView>>> {
    let resp = bucket_service::view_bucket(&state, &principal).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bucket/items",
    request_body = AddBucketItemRequest,
    responses(
        (status = 200, description = "Bucket after the add", body = ApiResponse<BucketView>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Bucket"
)]
pub async fn add_to_bucket(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<AddBucketItemRequest>,
) -> AppResult<Json<ApiResponse<BucketView>>> {
    let resp = bucket_service::add_to_bucket(&state, &principal, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bucket/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed"),
        (status = 404, description = "Product not in bucket"),
    ),
    tag = "Bucket"
)]
pub async fn remove_from_bucket(
    State(state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = bucket_service::remove_from_bucket(&state, &principal, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bucket/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "One pending order per bucket line", body = ApiResponse<CheckoutResponse>),
        (status = 409, description = "Insufficient stock for a line"),
    ),
    tag = "Bucket"
)]
pub async fn checkout(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let resp = bucket_service::checkout(&state, &principal, payload).await?;
    Ok(Json(resp))
}

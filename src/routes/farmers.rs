use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::farmers::RegisterFarmerRequest,
    dto::products::ProductList,
    error::AppResult,
    models::Farmer,
    response::ApiResponse,
    routes::params::FarmerProductsQuery,
    services::{catalog_service, farmer_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_farmer))
        .route("/{id}", get(get_farmer))
        .route("/{id}/products", get(list_farmer_products))
}

#[utoipa::path(
    post,
    path = "/api/farmers",
    request_body = RegisterFarmerRequest,
    responses(
        (status = 200, description = "Farmer registered", body = ApiResponse<Farmer>),
        (status = 409, description = "Farmer already exists"),
    ),
    tag = "Farmers"
)]
pub async fn register_farmer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterFarmerRequest>,
) -> AppResult<Json<ApiResponse<Farmer>>> {
    let resp = farmer_service::register_farmer(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/farmers/{id}",
    params(
        ("id" = Uuid, Path, description = "Farmer ID")
    ),
    responses(
        (status = 200, description = "Farmer", body = ApiResponse<Farmer>),
        (status = 404, description = "Farmer not found"),
    ),
    tag = "Farmers"
)]
pub async fn get_farmer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Farmer>>> {
    let resp = farmer_service::get_farmer(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/farmers/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Farmer ID"),
        ("include_expired" = Option<bool>, Query, description = "Include expired products, default true"),
    ),
    responses(
        (status = 200, description = "Products listed by the farmer", body = ApiResponse<ProductList>)
    ),
    tag = "Farmers"
)]
pub async fn list_farmer_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<FarmerProductsQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::list_for_farmer(&state, id, query).await?;
    Ok(Json(resp))
}

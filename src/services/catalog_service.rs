use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::products::ProductList,
    error::AppResult,
    models::{GeoPoint, Product},
    response::{ApiResponse, Meta},
    routes::params::{CatalogQuery, FarmerProductsQuery},
    state::AppState,
    store::{GeoFence, ProductFilter},
};

/// Default radius for proximity browsing when the caller supplies a location
/// but no explicit radius.
const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Available products, nearest-farm first when a viewer location is given.
/// Falls back to the plain available listing when no location is known or
/// nothing grows within the radius.
pub async fn list_available(
    state: &AppState,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let viewer = match (query.latitude, query.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let mut items = match viewer {
        Some(center) => {
            let fence = GeoFence {
                center,
                radius_km: query.radius_km.unwrap_or(DEFAULT_RADIUS_KM),
            };
            let nearby = state
                .inventory
                .list(ProductFilter {
                    within: Some(fence),
                    ..ProductFilter::available()
                })
                .await?;
            if nearby.is_empty() {
                state.inventory.list(ProductFilter::available()).await?
            } else {
                nearby
            }
        }
        None => state.inventory.list(ProductFilter::available()).await?,
    };

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        items.retain(|p| p.category.eq_ignore_ascii_case(category));
    }

    let total = items.len() as i64;
    let items: Vec<Product> = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

/// Everything a farmer has listed, expired included unless the caller opts
/// out.
pub async fn list_for_farmer(
    state: &AppState,
    farmer_id: Uuid,
    query: FarmerProductsQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let include_expired = query.include_expired.unwrap_or(true);
    let filter = ProductFilter {
        farmer_id: Some(farmer_id),
        not_expired_at: (!include_expired).then(Utc::now),
        ..Default::default()
    };

    let items = state.inventory.list(filter).await?;
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

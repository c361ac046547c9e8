use axum::Router;

use crate::state::AppState;

pub mod bucket;
pub mod doc;
pub mod farmers;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/farmers", farmers::router())
        .nest("/orders", orders::router())
        .nest("/bucket", bucket::router())
}

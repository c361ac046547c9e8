use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{GeoPoint, Product, ProductStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    /// Defaults to "Fresh Produce" when omitted.
    pub category: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub area: String,
    /// Defaults to "Grown in {area}" when omitted.
    pub description: Option<String>,
    pub image: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub area: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: Option<ProductStatus>,
    pub expires_at: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

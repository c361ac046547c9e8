use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddBucketItemRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BucketLine {
    pub product: Product,
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BucketView {
    pub items: Vec<BucketLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub orders: Vec<Order>,
}

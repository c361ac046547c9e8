use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::GeoPoint;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterFarmerRequest {
    pub name: String,
    pub phone_number: String,
    pub location: GeoPoint,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

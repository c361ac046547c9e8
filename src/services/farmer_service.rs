use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::farmers::RegisterFarmerRequest,
    error::{AppError, AppResult},
    models::Farmer,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Create a farmer profile. Identity verification happened upstream; this
/// only records the marketplace-facing profile.
pub async fn register_farmer(
    state: &AppState,
    payload: RegisterFarmerRequest,
) -> AppResult<ApiResponse<Farmer>> {
    let farmer = Farmer {
        id: Uuid::new_v4(),
        name: payload.name,
        phone_number: payload.phone_number,
        location: payload.location,
        bio: payload.bio,
        profile_picture: payload.profile_picture,
        created_at: Utc::now(),
    };

    let farmer = state.farmers.insert(farmer).await?;

    if let Err(err) = log_audit(
        state.audit.as_ref(),
        Some(farmer.id),
        "farmer_register",
        Some("farmers"),
        Some(serde_json::json!({ "farmer_id": farmer.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Farmer registered",
        farmer,
        Some(Meta::empty()),
    ))
}

pub async fn get_farmer(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Farmer>> {
    let farmer = state.farmers.get(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Farmer", farmer, None))
}

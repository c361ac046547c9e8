use axum::extract::FromRequestParts;
use uuid::Uuid;

use crate::error::AppError;

/// An already-authenticated identity forwarded by the gateway. This service
/// never sees credentials; it trusts the `x-principal-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Farmer,
    Customer,
}

#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

pub fn ensure_farmer(principal: &Principal) -> Result<(), AppError> {
    if principal.role != Role::Farmer {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_customer(principal: &Principal) -> Result<(), AppError> {
    if principal.role != Role::Customer {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let id_header = parts
            .headers
            .get("x-principal-id")
            .ok_or_else(|| AppError::BadRequest("Missing x-principal-id header".into()))?;
        let id_str = id_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid x-principal-id header".into()))?;
        let id = Uuid::parse_str(id_str.trim())
            .map_err(|_| AppError::BadRequest("Invalid principal id".into()))?;

        let role_header = parts
            .headers
            .get("x-principal-role")
            .ok_or_else(|| AppError::BadRequest("Missing x-principal-role header".into()))?;
        let role = match role_header.to_str() {
            Ok("farmer") => Role::Farmer,
            Ok("customer") => Role::Customer,
            _ => return Err(AppError::BadRequest("Invalid principal role".into())),
        };

        Ok(Principal { id, role })
    }
}

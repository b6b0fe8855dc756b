use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{errors::ServiceError, AppState};

/// Claim structure for JWT tokens issued by the identity provider.
///
/// The core treats `merchant_id` as opaque and nullable: a token without a
/// merchant association is valid but fails the access guard on any
/// merchant-scoped operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub merchant_id: Option<i64>,
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated caller extracted from the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i64,
    pub merchant_id: Option<i64>,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn belongs_to_merchant(&self, merchant_id: i64) -> bool {
        self.merchant_id == Some(merchant_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("Missing Authorization header".to_string())
            })?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            ServiceError::Unauthorized("Authorization header must be a Bearer token".to_string())
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[state.config.auth_issuer.as_str()]);
        validation.set_audience(&[state.config.auth_audience.as_str()]);

        let data = decode::<Claims>(
            token.trim(),
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthorized(format!("Invalid token: {}", e)))?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| ServiceError::Unauthorized("Invalid subject claim".to_string()))?;

        Ok(AuthUser {
            user_id,
            merchant_id: data.claims.merchant_id,
            email: data.claims.email,
        })
    }
}

/// Access guard: accepts when the caller's merchant matches the resource's
/// owning merchant. Pure function, no side effects.
///
/// Callers without any merchant association are rejected outright; stores
/// translate a scoped-load miss into `NotFound` instead so cross-tenant
/// probes cannot distinguish "absent" from "not yours".
pub fn ensure_merchant_access(
    caller_merchant_id: Option<i64>,
    resource_merchant_id: i64,
) -> Result<(), ServiceError> {
    match caller_merchant_id {
        None => Err(ServiceError::Forbidden(
            "User is not associated with any merchant".to_string(),
        )),
        Some(id) if id == resource_merchant_id => Ok(()),
        Some(_) => Err(ServiceError::Forbidden(
            "You do not have access to this resource".to_string(),
        )),
    }
}

/// Returns the caller's merchant id or rejects callers with no association.
pub fn require_merchant(caller_merchant_id: Option<i64>) -> Result<i64, ServiceError> {
    caller_merchant_id.ok_or_else(|| {
        ServiceError::Forbidden("User is not associated with any merchant".to_string())
    })
}

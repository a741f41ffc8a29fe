use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::api::AppState;
use crate::auth::Identity;
use crate::errors::CyberImpactError;

/// Extractor for routes that need a verified caller.
pub struct AuthUser(pub Identity);

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = CyberImpactError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let verifier = state.verifier.as_ref().ok_or_else(|| {
            CyberImpactError::ServiceUnavailable("Authentication is not configured".into())
        })?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| CyberImpactError::Unauthorized("Missing Authorization header".into()))?;
        let token = bearer_token(header)
            .ok_or_else(|| CyberImpactError::Unauthorized("Invalid Authorization header".into()))?;

        let identity = verifier.verify(token).await?;
        debug!(uid = %identity.uid, verifier = verifier.name(), "Caller authenticated");
        Ok(AuthUser(identity))
    }
}

use axum::Json;

use crate::api::auth::AuthUser;
use crate::api::models::VerifyAuthResponse;

pub async fn verify_auth(AuthUser(identity): AuthUser) -> Json<VerifyAuthResponse> {
    Json(VerifyAuthResponse {
        message: "Authentication successful".to_string(),
        user: identity,
    })
}

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::errors::CyberImpactError;

impl CyberImpactError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRepository(_)
            | Self::InvalidFileType(_)
            | Self::NoToolsSelected
            | Self::BadRequest(_)
            | Self::Config(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CyberImpactError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let detail = match &self {
            Self::NoToolsSelected => "No tools selected".to_string(),
            Self::Unauthorized(msg) | Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            _ if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE => {
                error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({"detail": detail}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CyberImpactError::NoToolsSelected.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CyberImpactError::InvalidRepository("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CyberImpactError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(CyberImpactError::FileTooLarge("x".into()).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(CyberImpactError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(CyberImpactError::ServiceUnavailable("x".into()).status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(CyberImpactError::Database("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = CyberImpactError::Database("disk I/O error at /var/lib".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

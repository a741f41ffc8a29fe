use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::errors::CyberImpactError;

/// Stored markdown report; only its owner can read it.
pub async fn get_report(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CyberImpactError> {
    let report = state
        .db
        .get_report(&id)?
        .filter(|r| r.owner_id == identity.uid)
        .ok_or_else(|| CyberImpactError::NotFound(format!("Report {} not found", id)))?;

    let disposition = format!("attachment; filename=\"security-report-{}.md\"", report.id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.markdown,
    ))
}

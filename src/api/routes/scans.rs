use axum::{extract::State, Json};
use tracing::info;

use crate::api::auth::AuthUser;
use crate::api::models::{CloneResponse, ExecuteRequest, RepoRequest};
use crate::api::AppState;
use crate::errors::CyberImpactError;
use crate::pipeline::{AnalyzeOutcome, ExecuteOutcome};

pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<RepoRequest>,
) -> Result<Json<AnalyzeOutcome>, CyberImpactError> {
    info!(repo_url = %req.repo_url, "Analyze requested");
    Ok(Json(state.orchestrator.analyze(&req.repo_url).await?))
}

pub async fn clone_repository(
    State(state): State<AppState>,
    Json(req): Json<RepoRequest>,
) -> Result<Json<CloneResponse>, CyberImpactError> {
    let path = state.orchestrator.clone_repository(&req.repo_url).await?;
    Ok(Json(CloneResponse {
        message: "Repository cloned successfully".to_string(),
        temp_path: path.display().to_string(),
        repo_url: req.repo_url,
    }))
}

pub async fn execute(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteOutcome>, CyberImpactError> {
    info!(uid = %identity.uid, tools = ?req.selected_tools, "Execute requested");
    let outcome = state
        .orchestrator
        .execute(&req.repo_path, &req.selected_tools, &identity.uid)
        .await?;
    Ok(Json(outcome))
}

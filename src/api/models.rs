use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::models::DocumentRecord;

#[derive(Debug, Deserialize)]
pub struct RepoRequest {
    pub repo_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub repo_path: String,
    #[serde(default)]
    pub selected_tools: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CloneResponse {
    pub message: String,
    pub temp_path: String,
    pub repo_url: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(flatten)]
    pub document: DocumentRecord,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct VerifyAuthResponse {
    pub message: String,
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}

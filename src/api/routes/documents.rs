use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::api::auth::AuthUser;
use crate::api::models::{DeleteResponse, DocumentListResponse, UploadResponse};
use crate::api::AppState;
use crate::errors::CyberImpactError;
use crate::models::{DocumentKind, DocumentRecord};

const FILE_FIELD: &str = "file";

pub async fn upload_financial(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, CyberImpactError> {
    upload(&state, DocumentKind::Financial, &identity.uid, multipart).await
}

pub async fn upload_asset_inventory(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, CyberImpactError> {
    upload(&state, DocumentKind::AssetInventory, &identity.uid, multipart).await
}

async fn upload(
    state: &AppState,
    kind: DocumentKind,
    uid: &str,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, CyberImpactError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CyberImpactError::BadRequest("Uploaded file has no name".into()))?;
        let content = field.bytes().await.map_err(multipart_error)?;

        let document = state.documents.upload(kind, &filename, &content, uid)?;
        return Ok(Json(UploadResponse {
            message: format!("{} uploaded successfully", kind.label()),
            document,
        }));
    }

    Err(CyberImpactError::BadRequest(format!("Missing multipart field '{}'", FILE_FIELD)))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> CyberImpactError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CyberImpactError::FileTooLarge(e.body_text())
    } else {
        CyberImpactError::BadRequest(e.body_text())
    }
}

pub async fn list_financial(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DocumentListResponse>, CyberImpactError> {
    list(&state, DocumentKind::Financial, &identity.uid)
}

pub async fn list_asset_inventory(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DocumentListResponse>, CyberImpactError> {
    list(&state, DocumentKind::AssetInventory, &identity.uid)
}

fn list(state: &AppState, kind: DocumentKind, uid: &str) -> Result<Json<DocumentListResponse>, CyberImpactError> {
    let documents = state.documents.list(uid, kind)?;
    Ok(Json(DocumentListResponse { total: documents.len(), documents }))
}

pub async fn get_document(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, CyberImpactError> {
    Ok(Json(state.documents.get(&id, &identity.uid)?))
}

pub async fn delete_document(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, CyberImpactError> {
    state.documents.delete(&id, &identity.uid)?;
    info!(id = %id, uid = %identity.uid, "Document removed on request");
    Ok(Json(DeleteResponse { message: "Document deleted successfully".to_string(), id }))
}

pub async fn download_document(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CyberImpactError> {
    let (record, bytes) = state.documents.content(&id, &identity.uid)?;
    let disposition = format!("attachment; filename=\"{}\"", record.filename.replace('"', ""));

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&record.file_type).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

fn content_type(file_type: &str) -> &'static str {
    match file_type {
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".json" => "application/json",
        _ => "application/octet-stream",
    }
}

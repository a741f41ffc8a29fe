pub mod auth;
pub mod errors;
pub mod models;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::{verifier_from_config, IdentityVerifier};
use crate::config::AppConfig;
use crate::db::Database;
use crate::documents::DocumentStore;
use crate::errors::CyberImpactError;
use crate::git::WorkspaceRegistry;
use crate::pipeline::ScanOrchestrator;

/// Multipart framing on top of the file itself.
const UPLOAD_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub verifier: Option<Arc<dyn IdentityVerifier>>,
    pub documents: DocumentStore,
    pub orchestrator: Arc<ScanOrchestrator>,
    pub workspaces: Arc<WorkspaceRegistry>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: Database,
        verifier: Option<Arc<dyn IdentityVerifier>>,
    ) -> Result<Self, CyberImpactError> {
        let workspaces = Arc::new(WorkspaceRegistry::new(
            config.workspace.root.clone(),
            Duration::from_secs(config.workspace.ttl_minutes * 60),
        )
        .with_clone_timeout(Duration::from_secs(config.workspace.clone_timeout_secs)));
        let orchestrator = ScanOrchestrator::from_config(&config, db.clone(), Arc::clone(&workspaces))?;

        Ok(Self {
            documents: DocumentStore::new(db.clone(), config.uploads.clone()),
            db,
            config: Arc::new(config),
            verifier,
            orchestrator: Arc::new(orchestrator),
            workspaces,
        })
    }
}

pub async fn create_app_state(config: AppConfig) -> Result<AppState, CyberImpactError> {
    let db = Database::new(&config.database.path)?;
    let verifier = verifier_from_config(&config.auth);
    AppState::new(config, db, verifier)
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.uploads.max_file_size as usize + UPLOAD_OVERHEAD);
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/api/health", get(routes::health::health_check))
        .route("/api/verify-auth", get(routes::auth::verify_auth))
        .route("/scan/analyze", post(routes::scans::analyze))
        .route("/scan/execute", post(routes::scans::execute))
        .route("/scan/clone", post(routes::scans::clone_repository))
        .route(
            "/api/upload/financial-doc",
            post(routes::documents::upload_financial).layer(upload_limit.clone()),
        )
        .route(
            "/api/upload/asset-inventory",
            post(routes::documents::upload_asset_inventory).layer(upload_limit),
        )
        .route("/api/documents/financial", get(routes::documents::list_financial))
        .route("/api/documents/asset-inventory", get(routes::documents::list_asset_inventory))
        .route(
            "/api/documents/:id",
            get(routes::documents::get_document).delete(routes::documents::delete_document),
        )
        .route("/api/documents/:id/download", get(routes::documents::download_document))
        .route("/api/reports/:id", get(routes::reports::get_report))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

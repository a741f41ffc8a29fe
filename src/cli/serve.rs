use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api;
use crate::cli::commands::ServeArgs;
use crate::config::{self, AppConfig};
use crate::errors::CyberImpactError;

pub async fn handle_serve(args: ServeArgs) -> Result<(), CyberImpactError> {
    let path = args.config.as_ref().map(PathBuf::from);
    let mut config = config::load_config(path.as_deref()).await?;
    apply_overrides(&mut config, &args);

    info!(host = %config.server.host, port = config.server.port, "Starting API server");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = api::create_app_state(config).await?;
    let workspaces = state.workspaces.clone();
    if state.verifier.is_none() {
        info!("Authenticated routes are disabled until an identity provider is configured");
    }

    let cancel = CancellationToken::new();
    let sweeper = workspaces.spawn_sweeper(cancel.clone());

    let app = api::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CyberImpactError::Internal(format!("Server error: {}", e)));

    cancel.cancel();
    let _ = sweeper.await;
    info!(remaining = workspaces.len(), "Server stopped");
    served
}

fn apply_overrides(config: &mut AppConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db) = &args.db {
        config.database.path = db.clone();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

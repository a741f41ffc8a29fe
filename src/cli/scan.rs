use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cli::commands::ScanArgs;
use crate::config;
use crate::db::Database;
use crate::errors::CyberImpactError;
use crate::financial::parse_inventory;
use crate::git::WorkspaceRegistry;
use crate::pipeline::{normalize_selection, AssetSource, ScanOrchestrator};

/// Headless scan: clone, run tools, print or write the report. Nothing is
/// persisted; the database is in-memory.
pub async fn handle_scan(args: ScanArgs) -> Result<(), CyberImpactError> {
    let path = args.config.as_ref().map(PathBuf::from);
    let config = config::load_config(path.as_deref()).await?;

    let assets = match &args.assets {
        Some(file) => parse_inventory(&tokio::fs::read(file).await?)?,
        None => Vec::new(),
    };

    let workspaces = Arc::new(WorkspaceRegistry::new(
        config.workspace.root.clone(),
        Duration::from_secs(config.workspace.ttl_minutes * 60),
    )
    .with_clone_timeout(Duration::from_secs(config.workspace.clone_timeout_secs)));
    let orchestrator = ScanOrchestrator::from_config(&config, Database::in_memory()?, Arc::clone(&workspaces))?;

    let analyzed = orchestrator.analyze(&args.repo_url).await?;
    let tools = normalize_selection(&args.tool_list().unwrap_or(analyzed.suggested_tools))?;
    let workspace = workspaces.take(&analyzed.repo_path)?;
    info!(repo_url = %args.repo_url, tools = ?tools, "Running headless scan");

    let source = if args.assets.is_some() { AssetSource::Inventory(&assets) } else { AssetSource::None };
    let output = orchestrator.scan(workspace.path(), &args.repo_url, &tools, source).await;

    let rendered = if args.json {
        serde_json::to_string_pretty(&output.outcome)?
    } else {
        output.report
    };

    match &args.output {
        Some(file) => {
            tokio::fs::write(file, rendered).await?;
            info!(path = %file, "Report written");
        }
        None => println!("{}", rendered),
    }

    info!(
        tools = output.outcome.results.len(),
        failed = output.outcome.results.failure_count(),
        vulnerabilities = output.vulnerabilities.len(),
        "Scan completed"
    );
    Ok(())
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AppConfig, FinancialConfig};
use crate::db::Database;
use crate::documents::DocumentStore;
use crate::errors::{CyberImpactError, RetryConfig};
use crate::financial::{BusinessAsset, FinancialAnalysis, FinancialAnalyzer};
use crate::git::WorkspaceRegistry;
use crate::llm::{provider_from_config, Summarizer};
use crate::models::{DocumentKind, ScanResult, Vulnerability};
use crate::reporting::{assemble_report, ReportInput};
use crate::scanner::{extract_vulnerabilities, suggest_tools, ScannerInvoker, ToolRegistry};

/// What `analyze` hands back: where the clone lives and what to run on it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutcome {
    pub repo_path: String,
    pub suggested_tools: Vec<String>,
}

/// Response body of an execute. Enrichment fields are absent when their step
/// was skipped or failed.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteOutcome {
    pub results: ScanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_analysis: Option<FinancialAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
}

/// Where the business assets for a financial analysis come from.
#[derive(Debug, Clone, Copy)]
pub enum AssetSource<'a> {
    /// Skip financial analysis.
    None,
    /// The user's uploaded inventories; skipped when they uploaded nothing.
    User(&'a str),
    /// An inventory supplied directly, as the CLI does.
    Inventory(&'a [BusinessAsset]),
}

/// A finished scan plus its rendered markdown report.
pub struct ScanOutput {
    pub outcome: ExecuteOutcome,
    pub vulnerabilities: Vec<Vulnerability>,
    pub report: String,
}

/// Sequences fetch -> suggest -> run selected tools -> aggregate -> enrich.
pub struct ScanOrchestrator {
    invoker: ScannerInvoker,
    workspaces: Arc<WorkspaceRegistry>,
    summarizer: Option<Summarizer>,
    documents: DocumentStore,
    db: Database,
    financial: FinancialConfig,
    max_parallel: usize,
}

impl ScanOrchestrator {
    pub fn new(
        invoker: ScannerInvoker,
        workspaces: Arc<WorkspaceRegistry>,
        summarizer: Option<Summarizer>,
        documents: DocumentStore,
        db: Database,
        financial: FinancialConfig,
        max_parallel: usize,
    ) -> Self {
        Self {
            invoker,
            workspaces,
            summarizer,
            documents,
            db,
            financial,
            max_parallel: max_parallel.max(1),
        }
    }

    /// Wire the scanners, summarizer and document store described by `config`.
    /// A missing LLM key disables summaries; a bad provider name is an error.
    pub fn from_config(
        config: &AppConfig,
        db: Database,
        workspaces: Arc<WorkspaceRegistry>,
    ) -> Result<Self, CyberImpactError> {
        let registry = Arc::new(ToolRegistry::from_config(&config.scanner));
        let summarizer = provider_from_config(&config.llm)?.map(|provider| {
            info!(provider = provider.provider_name(), model = provider.model_name(), "AI summaries enabled");
            Summarizer::new(Arc::from(provider), RetryConfig { max_retries: config.llm.max_retries })
        });

        Ok(Self::new(
            ScannerInvoker::new(registry),
            workspaces,
            summarizer,
            DocumentStore::new(db.clone(), config.uploads.clone()),
            db,
            config.financial.clone(),
            config.scanner.max_parallel,
        ))
    }

    pub fn workspaces(&self) -> &Arc<WorkspaceRegistry> {
        &self.workspaces
    }

    /// Clone the repository and suggest tools for it. The clone stays
    /// registered until an execute claims it or it expires.
    pub async fn analyze(&self, repo_url: &str) -> Result<AnalyzeOutcome, CyberImpactError> {
        let path = self.workspaces.checkout(repo_url).await?;
        let suggested = suggest_in_background(path.clone()).await?;

        info!(path = %path.display(), suggested = ?suggested, "Repository analyzed");
        Ok(AnalyzeOutcome {
            repo_path: path.display().to_string(),
            suggested_tools: suggested.into_iter().collect(),
        })
    }

    /// Clone without suggesting.
    pub async fn clone_repository(&self, repo_url: &str) -> Result<PathBuf, CyberImpactError> {
        self.workspaces.checkout(repo_url).await
    }

    /// Run the selected tools against a registered clone for `uid`. The clone
    /// is consumed: it is deleted when this returns, on every path.
    pub async fn execute(
        &self,
        repo_path: &str,
        selected_tools: &[String],
        uid: &str,
    ) -> Result<ExecuteOutcome, CyberImpactError> {
        let tools = normalize_selection(selected_tools)?;
        let workspace = self.workspaces.take(repo_path)?;

        let ScanOutput { mut outcome, report, .. } = self
            .scan(workspace.path(), workspace.repo_url(), &tools, AssetSource::User(uid))
            .await;

        match self.db.insert_report(uid, workspace.repo_url(), &report) {
            Ok(id) => outcome.report_url = Some(format!("/api/reports/{}", id)),
            Err(e) => warn!(error = %e, "Report could not be stored"),
        }

        Ok(outcome)
    }

    /// Run tools on a checked-out tree and enrich the results. Never fails:
    /// tool errors are inline and enrichment steps are optional.
    pub async fn scan(
        &self,
        repo: &Path,
        repo_url: &str,
        tools: &BTreeSet<String>,
        assets: AssetSource<'_>,
    ) -> ScanOutput {
        let started = Instant::now();
        let results = self.run_tools(repo, tools).await;
        let vulnerabilities = extract_vulnerabilities(&results);

        info!(
            tools = results.len(),
            failed = results.failure_count(),
            vulnerabilities = vulnerabilities.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan complete"
        );

        let ai_summary = match &self.summarizer {
            // failures are logged by the summarizer; the field is just omitted
            Some(summarizer) => summarizer.summarize(repo_url, &results).await.ok(),
            None => None,
        };

        let financial_analysis = match assets {
            AssetSource::None => None,
            AssetSource::User(uid) => match self.user_financial_analysis(uid, &vulnerabilities) {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!(error = %e, "Financial analysis skipped");
                    None
                }
            },
            AssetSource::Inventory(assets) => Some(self.financial_analysis(&vulnerabilities, assets)),
        };

        let report = assemble_report(&ReportInput {
            repo_url,
            generated_at: Utc::now(),
            results: &results,
            vulnerabilities: &vulnerabilities,
            ai_summary: ai_summary.as_deref(),
            financial: financial_analysis.as_ref(),
        });

        ScanOutput {
            outcome: ExecuteOutcome { results, ai_summary, financial_analysis, report_url: None },
            vulnerabilities,
            report,
        }
    }

    /// Bounded fan-out over the selected tools. Waits for every tool (or its
    /// timeout) before returning; the map has exactly one entry per tool.
    pub async fn run_tools(&self, repo: &Path, tools: &BTreeSet<String>) -> ScanResult {
        stream::iter(tools.iter().cloned())
            .map(|tool| {
                let invoker = self.invoker.clone();
                async move {
                    let result = invoker.run(&tool, repo).await;
                    (tool, result)
                }
            })
            .buffer_unordered(self.max_parallel)
            .collect()
            .await
    }

    /// `Ok(None)` when the user has no documents to analyze against.
    fn user_financial_analysis(
        &self,
        uid: &str,
        vulnerabilities: &[Vulnerability],
    ) -> Result<Option<FinancialAnalysis>, CyberImpactError> {
        let has_documents = !self.documents.list(uid, DocumentKind::AssetInventory)?.is_empty()
            || !self.documents.list(uid, DocumentKind::Financial)?.is_empty();
        if !has_documents {
            return Ok(None);
        }

        let assets = self.documents.business_assets(uid)?;
        Ok(Some(self.financial_analysis(vulnerabilities, &assets)))
    }

    fn financial_analysis(&self, vulnerabilities: &[Vulnerability], assets: &[BusinessAsset]) -> FinancialAnalysis {
        let analysis = FinancialAnalyzer::from_config(&self.financial).analyze(vulnerabilities, assets);
        info!(
            assets = assets.len(),
            tickets = analysis.risk_tickets.len(),
            exposure = analysis.summary.total_financial_exposure,
            "Financial analysis complete"
        );
        analysis
    }
}

/// Deduplicated, trimmed selection; empty is `NoToolsSelected`.
pub fn normalize_selection(selected: &[String]) -> Result<BTreeSet<String>, CyberImpactError> {
    let tools: BTreeSet<String> = selected
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tools.is_empty() {
        return Err(CyberImpactError::NoToolsSelected);
    }
    Ok(tools)
}

async fn suggest_in_background(path: PathBuf) -> Result<BTreeSet<String>, CyberImpactError> {
    tokio::task::spawn_blocking(move || suggest_tools(&path))
        .await
        .map_err(|e| CyberImpactError::Internal(format!("suggestion task failed: {}", e)))
}

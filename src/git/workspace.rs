use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::fetch::clone_repository;
use crate::errors::CyberImpactError;

/// A cloned repository on disk. Dropping it deletes the directory.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    repo_url: String,
    created_at: Instant,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Clones handed out by `analyze`/`clone`, waiting for an `execute` to claim
/// them. Keys are the paths returned to the client.
pub struct WorkspaceRegistry {
    root: PathBuf,
    ttl: Duration,
    clone_timeout: Duration,
    entries: DashMap<PathBuf, Workspace>,
}

pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(300);

impl WorkspaceRegistry {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { root: root.into(), ttl, clone_timeout: DEFAULT_CLONE_TIMEOUT, entries: DashMap::new() }
    }

    pub fn with_clone_timeout(mut self, clone_timeout: Duration) -> Self {
        self.clone_timeout = clone_timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Clone `url` under the workspace root and register it.
    pub async fn checkout(&self, url: &str) -> Result<PathBuf, CyberImpactError> {
        let dir = clone_repository(url, &self.root, self.clone_timeout).await?;
        Ok(self.register(dir, url))
    }

    pub fn register(&self, dir: TempDir, repo_url: impl Into<String>) -> PathBuf {
        let path = dir.path().to_path_buf();
        self.entries.insert(
            path.clone(),
            Workspace { dir, repo_url: repo_url.into(), created_at: Instant::now() },
        );
        debug!(path = %path.display(), "Workspace registered");
        path
    }

    /// Claim a workspace. Ownership moves to the caller, so the directory is
    /// removed once the caller is done with it, whatever the outcome.
    pub fn take(&self, path: &str) -> Result<Workspace, CyberImpactError> {
        self.entries
            .remove(Path::new(path.trim()))
            .map(|(_, workspace)| workspace)
            .ok_or_else(|| {
                CyberImpactError::InvalidRepository(format!(
                    "unknown or expired repository path: {}",
                    path
                ))
            })
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop workspaces nobody claimed within the TTL. Returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, workspace| workspace.age() < self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            info!(removed, "Expired workspaces removed");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Periodically sweep until `cancel` fires, then remove everything left.
    pub fn spawn_sweeper(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let period = (registry.ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(300));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        registry.sweep_expired();
                    }
                }
            }
            registry.clear();
            debug!("Workspace sweeper stopped");
        })
    }
}

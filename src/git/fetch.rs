use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::CyberImpactError;

const ALLOWED_SCHEMES: &[&str] = &["https://", "http://", "ssh://", "git://"];

/// Reject anything that is not a remote git URL before touching the network.
/// Local paths and `file://` URLs are refused so callers cannot scan the
/// server's own filesystem.
pub fn validate_repo_url(url: &str) -> Result<(), CyberImpactError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CyberImpactError::InvalidRepository("repository URL is empty".into()));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(CyberImpactError::InvalidRepository(format!("malformed URL: {}", url)));
    }

    let remainder = ALLOWED_SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .or_else(|| scp_like(url));

    match remainder {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
        _ => Err(CyberImpactError::InvalidRepository(format!("unsupported repository URL: {}", url))),
    }
}

/// `git@github.com:owner/repo.git`
fn scp_like(url: &str) -> Option<&str> {
    let (user_host, path) = url.split_once(':')?;
    let (user, host) = user_host.split_once('@')?;
    (!user.is_empty() && !host.is_empty() && !path.is_empty()).then_some(user_host)
}

/// Last path segment without `.git`, sanitized for use as a directory prefix.
pub fn repo_name(url: &str) -> String {
    let last = url
        .trim_end_matches('/')
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or("");
    let name: String = last
        .trim_end_matches(".git")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    if name.is_empty() { "repo".to_string() } else { name }
}

/// Clone `url` into a fresh directory under `root`. The directory is removed
/// when the returned `TempDir` drops, including when the clone fails or runs
/// past `timeout`.
pub async fn clone_repository(url: &str, root: &Path, timeout: Duration) -> Result<TempDir, CyberImpactError> {
    validate_repo_url(url)?;
    clone_into(url.trim(), root, timeout).await
}

/// The directory lives on the blocking task for the whole clone. Dropping this
/// future or timing out cancels the transfer, and the task deletes the
/// directory once git2 has stopped writing to it.
pub(crate) async fn clone_into(url: &str, root: &Path, timeout: Duration) -> Result<TempDir, CyberImpactError> {
    let cancel = CancellationToken::new();
    let _abort_on_drop = cancel.clone().drop_guard();

    let task = {
        let url = url.to_string();
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&root)?;
            let dir = tempfile::Builder::new()
                .prefix(&format!("{}-", repo_name(&url)))
                .tempdir_in(&root)?;
            clone_blocking(&url, dir.path(), &cancel)?;
            Ok::<_, CyberImpactError>(dir)
        })
    };

    let started = Instant::now();
    let dir = match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined.map_err(|e| CyberImpactError::Internal(format!("clone task panicked: {}", e)))??,
        Err(_) => {
            warn!(url, timeout_secs = timeout.as_secs(), "Clone timed out");
            return Err(CyberImpactError::InvalidRepository(format!(
                "clone timed out after {}s",
                timeout.as_secs()
            )));
        }
    };

    info!(path = %dir.path().display(), elapsed_ms = started.elapsed().as_millis() as u64, "Repository cloned");
    Ok(dir)
}

pub(crate) fn clone_blocking(url: &str, dest: &Path, cancel: &CancellationToken) -> Result<(), CyberImpactError> {
    debug!(url, dest = %dest.display(), "Cloning");
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.transfer_progress(|_| !cancel.is_cancelled());
    let mut fetch = git2::FetchOptions::new();
    fetch.remote_callbacks(callbacks);

    git2::build::RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, dest)
        .map(|_| ())
        .map_err(|e| CyberImpactError::InvalidRepository(e.message().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_remote_urls() {
        assert!(validate_repo_url("https://github.com/owner/repo").is_ok());
        assert!(validate_repo_url("http://git.local/x.git").is_ok());
        assert!(validate_repo_url("ssh://git@host/x.git").is_ok());
        assert!(validate_repo_url("git@github.com:owner/repo.git").is_ok());
    }

    #[test]
    fn test_validate_rejects_local_and_malformed() {
        for bad in ["", "/etc", "file:///etc", "not a url", "https://", "ftp://host/x", "C:\\repo", "https:///etc"] {
            assert!(
                matches!(validate_repo_url(bad), Err(CyberImpactError::InvalidRepository(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_repo_name() {
        assert_eq!(repo_name("https://github.com/owner/my-repo.git"), "my-repo");
        assert_eq!(repo_name("https://github.com/owner/my-repo/"), "my-repo");
        assert_eq!(repo_name("git@github.com:owner/x.y"), "x_y");
        assert_eq!(repo_name("https://host/"), "host");
    }

    #[tokio::test]
    async fn test_clone_invalid_url_fails_before_io() {
        let root = tempfile::tempdir().unwrap();
        let err = clone_repository("file:///tmp", root.path(), Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, CyberImpactError::InvalidRepository(_)));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    /// A committed repository with `files` generated sources, served over file://.
    fn origin_repository(files: usize) -> (tempfile::TempDir, String) {
        let origin = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(origin.path()).unwrap();
        let mut index = repo.index().unwrap();
        std::fs::write(origin.path().join("package.json"), "{}").unwrap();
        index.add_path(Path::new("package.json")).unwrap();
        for i in 0..files {
            let name = format!("src_{}.js", i);
            std::fs::write(origin.path().join(&name), format!("module.exports = {};\n", i).repeat(200)).unwrap();
            index.add_path(Path::new(&name)).unwrap();
        }
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("test", "test@localhost").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();
        let url = format!("file://{}", origin.path().display());
        (origin, url)
    }

    async fn wait_until_empty(root: &Path) -> usize {
        let mut remaining = usize::MAX;
        for _ in 0..100 {
            remaining = std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0);
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        remaining
    }

    #[test]
    fn test_clone_blocking_local_repository() {
        let (_origin, url) = origin_repository(0);
        let dest = tempfile::tempdir().unwrap();
        let target = dest.path().join("clone");
        clone_blocking(&url, &target, &CancellationToken::new()).unwrap();
        assert!(target.join("package.json").exists());
    }

    #[test]
    fn test_clone_blocking_missing_repository() {
        let dest = tempfile::tempdir().unwrap();
        let err = clone_blocking("file:///definitely/not/here", &dest.path().join("c"), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, CyberImpactError::InvalidRepository(_)));
    }

    #[tokio::test]
    async fn test_clone_into_returns_populated_dir() {
        let (_origin, url) = origin_repository(3);
        let root = tempfile::tempdir().unwrap();
        let dir = clone_into(&url, &root.path().join("ws"), Duration::from_secs(30)).await.unwrap();
        assert!(dir.path().join("src_2.js").exists());
        assert!(dir.path().starts_with(root.path().join("ws")));
    }

    #[tokio::test]
    async fn test_clone_timeout_is_invalid_repository() {
        let (_origin, url) = origin_repository(300);
        let root = tempfile::tempdir().unwrap();
        let err = clone_into(&url, root.path(), Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, CyberImpactError::InvalidRepository(ref m) if m.contains("timed out")));
        assert_eq!(wait_until_empty(root.path()).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_clone_leaves_no_directory() {
        let (_origin, url) = origin_repository(300);
        let root = tempfile::tempdir().unwrap();

        let clone = clone_into(&url, root.path(), Duration::from_secs(60));
        // give the blocking task time to create the directory, then drop
        let _ = tokio::time::timeout(Duration::from_millis(20), clone).await;

        assert_eq!(wait_until_empty(root.path()).await, 0);
        // nothing reappears once the task has finished with it
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}

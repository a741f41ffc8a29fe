use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::models::{ToolOutput, ToolResult};
use crate::utils::truncation::{truncate_error, truncate_output};
use super::registry::ToolRegistry;

pub const TIMED_OUT: &str = "timed out";
const UNKNOWN_ERROR: &str = "unknown error";

/// Runs registered scanners as subprocesses against a checked-out repository.
#[derive(Clone)]
pub struct ScannerInvoker {
    registry: Arc<ToolRegistry>,
}

impl ScannerInvoker {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool. Every failure mode is folded into `ToolResult::Failure`
    /// so the caller can keep going with the other tools.
    pub async fn run(&self, tool: &str, repo_path: &Path) -> ToolResult {
        let Some(spec) = self.registry.get(tool) else {
            warn!(tool = %tool, "Requested tool is not registered");
            return ToolResult::failure(format!("unknown tool: {}", tool));
        };

        let argv = spec.render(repo_path);
        let Some((program, args)) = argv.split_first() else {
            return ToolResult::failure(format!("empty command for tool: {}", tool));
        };

        debug!(tool = %tool, program = %program, "Spawning scanner");
        let started = Instant::now();

        // kill_on_drop: a timed-out or abandoned invocation takes the child with it
        let child = Command::new(program)
            .args(args)
            .current_dir(repo_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(c) => c,
            Err(e) => {
                warn!(tool = %tool, error = %e, "Failed to start scanner");
                return ToolResult::failure(format!("failed to start {}: {}", program, e));
            }
        };

        let result = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Err(_) => {
                warn!(tool = %tool, timeout_secs = spec.timeout.as_secs(), "Scanner timed out");
                ToolResult::failure(TIMED_OUT)
            }
            Ok(Err(e)) => ToolResult::failure(format!("failed to collect output: {}", e)),
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                interpret_exit(output.status.success(), &stdout, &stderr)
            }
        };

        info!(
            tool = %tool,
            ok = !result.is_failure(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scanner finished"
        );
        result
    }
}

/// Many scanners exit non-zero when they *find* something, so a non-zero exit
/// only counts as failure when nothing was printed to stdout.
pub fn interpret_exit(success: bool, stdout: &str, stderr: &str) -> ToolResult {
    if !success && stdout.trim().is_empty() {
        let stderr = stderr.trim();
        let message = if stderr.is_empty() { UNKNOWN_ERROR } else { stderr };
        return ToolResult::failure(truncate_error(message));
    }
    ToolResult::success(parse_output(stdout))
}

/// Prefer structured output; fall back to text.
pub fn parse_output(stdout: &str) -> ToolOutput {
    let trimmed = stdout.trim();

    if let Some(value) = parse_document(trimmed) {
        return ToolOutput::Structured(value);
    }

    // Some tools print a banner before the JSON document
    let start = [trimmed.find('{'), trimmed.find('[')]
        .into_iter()
        .flatten()
        .min();
    if let Some(start) = start {
        if let Some(value) = parse_document(&trimmed[start..]) {
            return ToolOutput::Structured(value);
        }
    }

    ToolOutput::Text(truncate_output(stdout))
}

fn parse_document(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|v| v.is_object() || v.is_array())
}

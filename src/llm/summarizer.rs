use std::sync::Arc;

use tracing::{info, warn};

use super::provider::LLMProvider;
use crate::errors::{with_retry, CyberImpactError, RetryConfig};
use crate::models::ScanResult;
use crate::utils::truncation::truncate_output;

const SYSTEM_PROMPT: &str = "You are a security analyst writing for executives. \
Summarize automated scanner output in plain language: overall risk posture, the most \
serious issues with their location, and the first three remediation steps. Do not \
invent findings that are not present in the data. Tools that failed should be \
mentioned briefly as coverage gaps.";

/// Turns aggregated scanner output into an executive summary.
#[derive(Clone)]
pub struct Summarizer {
    provider: Arc<dyn LLMProvider>,
    retry: RetryConfig,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LLMProvider>, retry: RetryConfig) -> Self {
        Self { provider, retry }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Any failure comes back as `SummarizerUnavailable` so callers can drop
    /// the field without inspecting the cause.
    pub async fn summarize(&self, repo_url: &str, results: &ScanResult) -> Result<String, CyberImpactError> {
        let prompt = build_prompt(repo_url, results)?;
        let provider = Arc::clone(&self.provider);

        let response = with_retry("summarize", &self.retry, || {
            let provider = Arc::clone(&provider);
            let prompt = prompt.clone();
            async move { provider.complete(&prompt, Some(SYSTEM_PROMPT)).await }
        })
        .await
        .map_err(|e| {
            warn!(provider = self.provider.provider_name(), error = %e, "Summary failed");
            CyberImpactError::SummarizerUnavailable(e.to_string())
        })?;

        let summary = response.content.trim().to_string();
        if summary.is_empty() {
            return Err(CyberImpactError::SummarizerUnavailable("empty summary".into()));
        }

        info!(
            provider = self.provider.provider_name(),
            model = %response.model,
            chars = summary.len(),
            "Summary generated"
        );
        Ok(summary)
    }
}

fn build_prompt(repo_url: &str, results: &ScanResult) -> Result<String, CyberImpactError> {
    let serialized = serde_json::to_string(results)?;
    Ok(format!(
        "Repository: {}\nTools run: {}\n\nScanner results (JSON, may be truncated):\n{}",
        repo_url,
        results.tools().cloned().collect::<Vec<_>>().join(", "),
        truncate_output(&serialized),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMResponse;
    use crate::models::{ToolOutput, ToolResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Scripted {
        calls: AtomicU32,
        fail_first: u32,
        error: fn() -> CyberImpactError,
        reply: &'static str,
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<LLMResponse, CyberImpactError> {
            assert!(system.is_some());
            assert!(prompt.contains("semgrep"));
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err((self.error)());
            }
            Ok(LLMResponse {
                content: self.reply.to_string(),
                input_tokens: None,
                output_tokens: None,
                model: "scripted".into(),
            })
        }
        fn provider_name(&self) -> &str { "scripted" }
        fn model_name(&self) -> &str { "scripted" }
    }

    fn results() -> ScanResult {
        let mut r = ScanResult::new();
        r.insert("semgrep", ToolResult::success(ToolOutput::Text("2 findings".into())));
        r
    }

    fn summarizer(provider: Scripted, max_retries: u32) -> (Arc<Scripted>, Summarizer) {
        let provider = Arc::new(provider);
        let summarizer = Summarizer::new(provider.clone(), RetryConfig { max_retries });
        (provider, summarizer)
    }

    #[tokio::test]
    async fn test_summary_success() {
        let (_, s) = summarizer(
            Scripted { calls: AtomicU32::new(0), fail_first: 0, error: || CyberImpactError::Internal("x".into()), reply: "  All good.  " },
            0,
        );
        assert_eq!(s.summarize("https://x/r", &results()).await.unwrap(), "All good.");
    }

    #[tokio::test]
    async fn test_non_retryable_failure_is_unavailable() {
        let (provider, s) = summarizer(
            Scripted { calls: AtomicU32::new(0), fail_first: 5, error: || CyberImpactError::Config("bad key".into()), reply: "" },
            2,
        );
        let err = s.summarize("https://x/r", &results()).await.unwrap_err();
        assert!(matches!(err, CyberImpactError::SummarizerUnavailable(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_is_unavailable() {
        let (_, s) = summarizer(
            Scripted { calls: AtomicU32::new(0), fail_first: 0, error: || CyberImpactError::Internal("x".into()), reply: "   " },
            0,
        );
        assert!(s.summarize("https://x/r", &results()).await.is_err());
    }

    #[test]
    fn test_prompt_is_truncated() {
        let mut big = ScanResult::new();
        big.insert("semgrep", ToolResult::success(ToolOutput::Text("a".repeat(50_000))));
        let prompt = build_prompt("u", &big).unwrap();
        assert!(prompt.len() < 20_000);
    }
}

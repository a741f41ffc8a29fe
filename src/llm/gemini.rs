use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;
use crate::config::credentials::redact_credentials;
use crate::errors::CyberImpactError;
use super::provider::LLMProvider;
use super::types::LLMResponse;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: Option<&str>, base_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.unwrap_or("gemini-2.5-flash").to_string(),
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
        }
    }

    /// The key travels in the query string, so reqwest errors can echo it.
    fn scrub(&self, message: String) -> String {
        redact_credentials(&message, &[self.api_key.as_str()])
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<LLMResponse, CyberImpactError> {
        let text = match system {
            Some(sys) => format!("System: {}\n\n{}", sys, prompt),
            None => prompt.to_string(),
        };

        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": text}]}],
            "generationConfig": {
                "maxOutputTokens": 4096,
            }
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let resp = self.client.post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CyberImpactError::Network(self.scrub(format!("Gemini request failed: {}", e))))?;

        match resp.status().as_u16() {
            429 => return Err(CyberImpactError::RateLimit("Gemini rate limit".into())),
            401 | 403 => return Err(CyberImpactError::Config("Gemini rejected the API key".into())),
            _ => {}
        }

        let data: Value = resp.json().await
            .map_err(|e| CyberImpactError::LlmApi(self.scrub(format!("Parse error: {}", e))))?;

        if let Some(error) = data.get("error") {
            let msg = error["message"].as_str().unwrap_or("Unknown").to_string();
            return Err(CyberImpactError::LlmApi(self.scrub(msg)));
        }

        let content = data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| CyberImpactError::LlmApi("No content in Gemini response".into()))?
            .to_string();

        let input_tokens = data["usageMetadata"]["promptTokenCount"].as_u64();
        let output_tokens = data["usageMetadata"]["candidatesTokenCount"].as_u64();
        debug!(model = %self.model, input_tokens, output_tokens, "Gemini completion");

        Ok(LLMResponse {
            content,
            input_tokens,
            output_tokens,
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &str { "gemini" }
    fn model_name(&self) -> &str { &self.model }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_removes_key() {
        let provider = GeminiProvider::new("AIzaSecretKey123", None, None);
        let msg = provider.scrub("error sending request for url (https://x/?key=AIzaSecretKey123)".into());
        assert!(!msg.contains("AIzaSecretKey123"));
        assert!(msg.contains("[REDACTED]"));
    }

    #[test]
    fn test_defaults() {
        let provider = GeminiProvider::new("k", None, Some("http://localhost:9/"));
        assert_eq!(provider.model_name(), "gemini-2.5-flash");
        assert_eq!(provider.base_url, "http://localhost:9");
    }
}

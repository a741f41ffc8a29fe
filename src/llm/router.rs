use crate::config::LlmConfig;
use crate::errors::CyberImpactError;
use super::provider::LLMProvider;
use super::anthropic::AnthropicProvider;
use super::openai::OpenAIProvider;
use super::gemini::GeminiProvider;

pub fn create_provider(
    provider_name: &str,
    api_key: &str,
    model: Option<&str>,
    base_url: Option<&str>,
) -> Result<Box<dyn LLMProvider>, CyberImpactError> {
    match provider_name.to_lowercase().as_str() {
        "gemini" | "google" => Ok(Box::new(GeminiProvider::new(api_key, model, base_url))),
        "anthropic" | "claude" => Ok(Box::new(AnthropicProvider::new(api_key, model, base_url))),
        "openai" => Ok(Box::new(OpenAIProvider::new(api_key, model, base_url))),
        _ => Err(CyberImpactError::Config(format!("Unknown LLM provider: {}", provider_name))),
    }
}

/// Provider for the configured `llm` section, or `None` when no key is set.
pub fn provider_from_config(config: &LlmConfig) -> Result<Option<Box<dyn LLMProvider>>, CyberImpactError> {
    match config.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => create_provider(
            &config.provider,
            key,
            config.model.as_deref(),
            config.base_url.as_deref(),
        )
        .map(Some),
        None => Ok(None),
    }
}

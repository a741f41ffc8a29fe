use std::path::Path;
use crate::errors::CyberImpactError;
use super::credentials::{env_fallback, resolve_credential};
use super::types::AppConfig;
use tracing::warn;

const REPO_PLACEHOLDER: &str = "{repo}";

pub async fn parse_config(path: &Path) -> Result<AppConfig, CyberImpactError> {
    if !path.exists() {
        return Err(CyberImpactError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(CyberImpactError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let mut config: AppConfig = if content.trim().is_empty() {
        AppConfig::default()
    } else {
        serde_yaml::from_str(&content)?
    };

    resolve_secrets(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load the config at `path`, or defaults plus environment when no file is given.
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig, CyberImpactError> {
    match path {
        Some(p) => parse_config(p).await,
        None => {
            let mut config = AppConfig::default();
            resolve_secrets(&mut config);
            validate_config(&config)?;
            Ok(config)
        }
    }
}

/// Resolve `$VAR` references and fill unset keys from the environment.
fn resolve_secrets(config: &mut AppConfig) {
    config.llm.api_key = match config.llm.api_key.as_deref() {
        Some(key) => Some(resolve_credential(key)),
        None => {
            let vars: &[&str] = match config.llm.provider.as_str() {
                "anthropic" => &["ANTHROPIC_API_KEY"],
                "openai" => &["OPENAI_API_KEY"],
                _ => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            };
            env_fallback(vars)
        }
    };

    config.auth.firebase_api_key = match config.auth.firebase_api_key.as_deref() {
        Some(key) => Some(resolve_credential(key)),
        None => env_fallback(&["FIREBASE_API_KEY"]),
    };
}

/// Detect semantically invalid settings that deserialize fine.
fn validate_config(config: &AppConfig) -> Result<(), CyberImpactError> {
    if config.scanner.max_parallel == 0 {
        return Err(CyberImpactError::Config("scanner.max_parallel must be at least 1".into()));
    }
    if config.scanner.timeout_secs == 0 {
        return Err(CyberImpactError::Config("scanner.timeout_secs must be at least 1".into()));
    }
    if config.uploads.max_file_size == 0 {
        return Err(CyberImpactError::Config("uploads.max_file_size must be positive".into()));
    }

    for (id, template) in &config.scanner.tools {
        if template.command.is_empty() {
            return Err(CyberImpactError::Config(format!("Tool '{}' has an empty command", id)));
        }
        if !template.command.iter().any(|arg| arg.contains(REPO_PLACEHOLDER)) {
            return Err(CyberImpactError::Config(format!(
                "Tool '{}' command must contain the {} placeholder",
                id, REPO_PLACEHOLDER
            )));
        }
    }

    let extensions = config.uploads.financial_extensions.iter()
        .chain(config.uploads.asset_extensions.iter());
    for ext in extensions {
        if !ext.starts_with('.') {
            return Err(CyberImpactError::Config(format!("Extension '{}' must start with '.'", ext)));
        }
    }

    if config.financial.fix_cost < 0.0 {
        return Err(CyberImpactError::Config("financial.fix_cost cannot be negative".into()));
    }

    if config.llm.api_key.is_none() {
        warn!(provider = %config.llm.provider, "No LLM API key configured, AI summaries disabled");
    }
    if config.auth.firebase_api_key.is_none() && config.auth.static_tokens.is_empty() {
        warn!("No identity verifier configured, authenticated routes will answer 503");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolTemplate;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallelism() {
        let mut config = AppConfig::default();
        config.scanner.max_parallel = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_template_without_placeholder() {
        let mut config = AppConfig::default();
        config.scanner.tools.insert("openvas".into(), ToolTemplate {
            command: vec!["openvas".into(), "--scan".into()],
            timeout_secs: None,
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("{repo}"));
    }

    #[test]
    fn test_validate_rejects_bare_extension() {
        let mut config = AppConfig::default();
        config.uploads.asset_extensions.push("csv".into());
        assert!(validate_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_parse_config_missing_file() {
        let result = parse_config(Path::new("/nonexistent/cyberimpact.yaml")).await;
        assert!(matches!(result, Err(CyberImpactError::Config(_))));
    }

    #[tokio::test]
    async fn test_parse_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "financial:\n  fix_cost: 2500\n  max_tickets: 3\n  matcher: exact\n").unwrap();

        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.financial.fix_cost, 2500.0);
        assert_eq!(config.financial.max_tickets, 3);
        assert_eq!(config.financial.matcher, crate::config::MatcherKind::Exact);
    }

    #[tokio::test]
    async fn test_parse_config_resolves_env_reference() {
        std::env::set_var("TEST_CYBERIMPACT_FIREBASE", "fb-key-123");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "auth:\n  firebase_api_key: $TEST_CYBERIMPACT_FIREBASE\n").unwrap();

        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.auth.firebase_api_key.as_deref(), Some("fb-key-123"));
        std::env::remove_var("TEST_CYBERIMPACT_FIREBASE");
    }
}

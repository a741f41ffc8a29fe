use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub workspace: WorkspaceConfig,
    pub scanner: ScannerConfig,
    pub uploads: UploadConfig,
    pub llm: LlmConfig,
    pub auth: AuthConfig,
    pub financial: FinancialConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "./data/cyberimpact.db".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory that holds cloned repositories.
    pub root: PathBuf,
    /// Unclaimed clones older than this are swept.
    pub ttl_minutes: u64,
    /// A clone still running after this long is abandoned.
    pub clone_timeout_secs: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: std::env::temp_dir().join("cyberimpact"),
            ttl_minutes: 60,
            clone_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub timeout_secs: u64,
    pub max_parallel: usize,
    /// Extra or overriding tool templates keyed by tool id.
    pub tools: HashMap<String, ToolTemplate>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            max_parallel: 4,
            tools: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolTemplate {
    /// argv with a `{repo}` placeholder.
    pub command: Vec<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub financial_extensions: Vec<String>,
    pub asset_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            financial_extensions: vec![".pdf".into(), ".doc".into(), ".docx".into()],
            asset_extensions: vec![".xlsx".into(), ".json".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            api_key: None,
            base_url: None,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub firebase_api_key: Option<String>,
    /// token -> uid, for local development.
    pub static_tokens: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FinancialConfig {
    pub fix_cost: f64,
    pub max_tickets: usize,
    pub matcher: MatcherKind,
}

impl Default for FinancialConfig {
    fn default() -> Self {
        Self {
            fix_cost: 5000.0,
            max_tickets: 10,
            matcher: MatcherKind::Rules,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    Exact,
    #[default]
    Rules,
}

impl MatcherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Rules => "rules",
        }
    }
}

impl std::fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(config.uploads.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.financial.fix_cost, 5000.0);
        assert_eq!(config.financial.max_tickets, 10);
        assert_eq!(config.financial.matcher, MatcherKind::Rules);
        assert!(config.auth.static_tokens.is_empty());
    }

    #[test]
    fn test_upload_default_extensions() {
        let uploads = UploadConfig::default();
        assert!(uploads.financial_extensions.contains(&".pdf".to_string()));
        assert!(uploads.financial_extensions.contains(&".docx".to_string()));
        assert!(uploads.asset_extensions.contains(&".xlsx".to_string()));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.scanner.max_parallel, 4);
    }

    #[test]
    fn test_matcher_kind_deserialize() {
        let parsed: MatcherKind = serde_json::from_str("\"exact\"").unwrap();
        assert_eq!(parsed, MatcherKind::Exact);
        assert_eq!(format!("{}", MatcherKind::Rules), "rules");
    }

    #[test]
    fn test_tool_template_deserialize() {
        let yaml = "scanner:\n  tools:\n    openvas:\n      command: [\"ospd-scan\", \"{repo}\"]\n      timeout_secs: 900\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        let template = &config.scanner.tools["openvas"];
        assert_eq!(template.command, vec!["ospd-scan".to_string(), "{repo}".to_string()]);
        assert_eq!(template.timeout_secs, Some(900));
    }
}

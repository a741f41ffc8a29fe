use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::config::{ScannerConfig, ToolTemplate};

pub const REPO_PLACEHOLDER: &str = "{repo}";

/// Built-in command templates. `{repo}` is the only substitution.
const BUILTIN_TOOLS: &[(&str, &[&str])] = &[
    ("semgrep", &["semgrep", "scan", "--config=auto", "--json", "--quiet", "{repo}"]),
    ("trivy", &["trivy", "fs", "--format", "json", "--quiet", "{repo}"]),
    ("nikto", &["nikto", "-h", "{repo}"]),
    ("clamav", &["clamscan", "-r", "--infected", "--no-summary", "{repo}"]),
    ("bandit", &["bandit", "-r", "{repo}", "-f", "json", "-q"]),
    ("safety", &["safety", "check", "-r", "{repo}/requirements.txt", "--json"]),
    ("npm-audit", &["npm", "audit", "--json", "--prefix", "{repo}"]),
    ("njsscan", &["njsscan", "--json", "{repo}"]),
    ("gosec", &["gosec", "-fmt=json", "-quiet", "{repo}/..."]),
];

/// One invocable tool: argv template plus its wall-clock limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub id: String,
    pub command: Vec<String>,
    pub timeout: Duration,
}

impl ToolSpec {
    /// Substitute the repository path into the argv template.
    pub fn render(&self, repo_path: &Path) -> Vec<String> {
        let repo = repo_path.display().to_string();
        self.command
            .iter()
            .map(|arg| arg.replace(REPO_PLACEHOLDER, &repo))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolSpec>,
}

impl ToolRegistry {
    /// Built-in tools, overridden or extended by `scanner.tools`.
    pub fn from_config(config: &ScannerConfig) -> Self {
        let default_timeout = Duration::from_secs(config.timeout_secs);
        let mut registry = Self::default();

        for (id, argv) in BUILTIN_TOOLS {
            registry.register(ToolSpec {
                id: id.to_string(),
                command: argv.iter().map(|s| s.to_string()).collect(),
                timeout: default_timeout,
            });
        }

        for (id, template) in &config.tools {
            registry.register(spec_from_template(id, template, default_timeout));
        }

        registry
    }

    pub fn register(&mut self, spec: ToolSpec) {
        self.tools.insert(spec.id.clone(), spec);
    }

    pub fn get(&self, id: &str) -> Option<&ToolSpec> {
        self.tools.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }
}

fn spec_from_template(id: &str, template: &ToolTemplate, default_timeout: Duration) -> ToolSpec {
    ToolSpec {
        id: id.to_string(),
        command: template.command.clone(),
        timeout: template
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(default_timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tools_registered() {
        let registry = ToolRegistry::from_config(&ScannerConfig::default());
        for id in ["semgrep", "trivy", "nikto", "clamav", "bandit", "npm-audit"] {
            assert!(registry.contains(id), "missing {}", id);
        }
        assert!(!registry.contains("openvas"));
    }

    #[test]
    fn test_builtin_templates_carry_placeholder() {
        for (id, argv) in BUILTIN_TOOLS {
            assert!(argv.iter().any(|a| a.contains(REPO_PLACEHOLDER)), "{} lacks placeholder", id);
        }
    }

    #[test]
    fn test_render_substitutes_repo_path() {
        let registry = ToolRegistry::from_config(&ScannerConfig::default());
        let argv = registry.get("safety").unwrap().render(Path::new("/tmp/repo"));
        assert!(argv.contains(&"/tmp/repo/requirements.txt".to_string()));
    }

    #[test]
    fn test_config_adds_and_overrides_tools() {
        let mut config = ScannerConfig::default();
        config.tools.insert("openvas".into(), ToolTemplate {
            command: vec!["ospd-scan".into(), "{repo}".into()],
            timeout_secs: Some(900),
        });
        config.tools.insert("trivy".into(), ToolTemplate {
            command: vec!["trivy".into(), "repo".into(), "{repo}".into()],
            timeout_secs: None,
        });

        let registry = ToolRegistry::from_config(&config);
        let openvas = registry.get("openvas").unwrap();
        assert_eq!(openvas.timeout, Duration::from_secs(900));
        let trivy = registry.get("trivy").unwrap();
        assert_eq!(trivy.command[1], "repo");
        assert_eq!(trivy.timeout, Duration::from_secs(300));
    }
}

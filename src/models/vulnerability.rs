use serde::{Deserialize, Serialize};

/// Severity level reported by a scanner, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    #[default]
    Unknown,
}

impl Severity {
    /// Normalize a scanner's severity label. Matching is by substring so that
    /// labels like "SEVERITY.HIGH" or "moderate" land in the right bucket.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_uppercase();
        if normalized.contains("CRITICAL") {
            Severity::Critical
        } else if normalized.contains("HIGH") || normalized == "ERROR" {
            Severity::High
        } else if normalized.contains("MEDIUM") || normalized.contains("MODERATE") {
            Severity::Medium
        } else if normalized.contains("LOW") || normalized.contains("WARNING") {
            Severity::Low
        } else if normalized.contains("INFO") {
            Severity::Info
        } else {
            Severity::Unknown
        }
    }

    /// Prioritization weight: higher is more urgent.
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Critical => 10,
            Severity::High => 7,
            Severity::Medium => 4,
            Severity::Low => 2,
            Severity::Info => 1,
            Severity::Unknown => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Info => "INFO",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single issue extracted from a scanner's structured output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Tool id that reported this issue (e.g. "semgrep", "trivy").
    pub source_tool: String,
    pub file: Option<String>,
    pub line: Option<u64>,
    pub package: Option<String>,
    pub severity: Severity,
    pub rule_id: Option<String>,
    pub message: String,
    /// Set when the issue touches PII/PCI or credential material.
    #[serde(default)]
    pub sensitive_data: bool,
}

impl Vulnerability {
    /// Text used by the keyword matchers: file, package and message.
    pub fn searchable_text(&self) -> String {
        [
            self.file.as_deref().unwrap_or(""),
            self.package.as_deref().unwrap_or(""),
            self.rule_id.as_deref().unwrap_or(""),
            self.message.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a scanner printed: parsed JSON when it emitted some, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Text(String),
    Structured(Value),
}

impl ToolOutput {
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            ToolOutput::Structured(v) => Some(v),
            ToolOutput::Text(_) => None,
        }
    }
}

/// Outcome of one tool invocation. Serializes as `{"output": ...}` or
/// `{"error": "..."}`, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResult {
    Success { output: ToolOutput },
    Failure { error: String },
}

impl ToolResult {
    pub fn success(output: ToolOutput) -> Self {
        ToolResult::Success { output }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ToolResult::Failure { error: error.into() }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ToolResult::Failure { .. })
    }

    pub fn output(&self) -> Option<&ToolOutput> {
        match self {
            ToolResult::Success { output } => Some(output),
            ToolResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ToolResult::Failure { error } => Some(error),
            ToolResult::Success { .. } => None,
        }
    }
}

/// Aggregated results of one scan, keyed by tool id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult(BTreeMap<String, ToolResult>);

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool: impl Into<String>, result: ToolResult) {
        self.0.insert(tool.into(), result);
    }

    pub fn get(&self, tool: &str) -> Option<&ToolResult> {
        self.0.get(tool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ToolResult)> {
        self.0.iter()
    }

    pub fn tools(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tools whose invocation failed.
    pub fn failure_count(&self) -> usize {
        self.0.values().filter(|r| r.is_failure()).count()
    }
}

impl Extend<(String, ToolResult)> for ScanResult {
    fn extend<I: IntoIterator<Item = (String, ToolResult)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<(String, ToolResult)> for ScanResult {
    fn from_iter<I: IntoIterator<Item = (String, ToolResult)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

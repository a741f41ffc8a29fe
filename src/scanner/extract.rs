use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::models::{ScanResult, Severity, Vulnerability};

fn sensitive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(pii|pci|credit[\s_-]?card|card[\s_-]?number|ssn|social security|personal data)s?\b")
            .expect("static regex")
    })
}

/// Whether an issue's rule id or message points at PII or cardholder data.
/// Credential findings are only flagged where the tool itself says so.
pub fn mentions_sensitive_data(rule_id: Option<&str>, message: &str) -> bool {
    let pattern = sensitive_pattern();
    pattern.is_match(message) || rule_id.map_or(false, |r| pattern.is_match(r))
}

/// Flatten every successful structured output into vulnerabilities, highest
/// severity first. Text outputs and failed tools contribute nothing.
pub fn extract_vulnerabilities(results: &ScanResult) -> Vec<Vulnerability> {
    let mut all = Vec::new();
    for (tool, result) in results.iter() {
        if let Some(value) = result.output().and_then(|o| o.as_structured()) {
            all.extend(extract_from_tool(tool, value));
        }
    }
    // stable: equal severities keep tool order
    all.sort_by(|a, b| b.severity.weight().cmp(&a.severity.weight()));
    all
}

pub fn extract_from_tool(tool: &str, output: &Value) -> Vec<Vulnerability> {
    let mut vulns = match tool {
        "semgrep" => extract_semgrep(output),
        "trivy" => extract_trivy(output),
        "bandit" => extract_bandit(output),
        "npm-audit" => extract_npm_audit(output),
        "safety" => extract_safety(output),
        "gosec" => extract_gosec(output),
        "njsscan" => extract_njsscan(output),
        _ => Vec::new(),
    };
    for vuln in &mut vulns {
        vuln.source_tool = tool.to_string();
        vuln.sensitive_data = vuln.sensitive_data
            || mentions_sensitive_data(vuln.rule_id.as_deref(), &vuln.message);
    }
    vulns
}

fn blank() -> Vulnerability {
    Vulnerability {
        source_tool: String::new(),
        file: None,
        line: None,
        package: None,
        severity: Severity::Unknown,
        rule_id: None,
        message: String::new(),
        sensitive_data: false,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Lines arrive as numbers or numeric strings depending on the tool.
fn line_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.split('-').next().and_then(|s| s.trim().parse().ok()),
        _ => None,
    }
}

fn severity_field(value: &Value, key: &str) -> Severity {
    value.get(key).and_then(Value::as_str).map(Severity::from_label).unwrap_or_default()
}

fn extract_semgrep(output: &Value) -> Vec<Vulnerability> {
    let Some(results) = output.get("results").and_then(Value::as_array) else { return Vec::new() };
    results.iter().map(|r| {
        let extra = r.get("extra").cloned().unwrap_or(Value::Null);
        Vulnerability {
            file: str_field(r, "path"),
            line: r.get("start").and_then(|s| line_field(s, "line")),
            severity: severity_field(&extra, "severity"),
            rule_id: str_field(r, "check_id"),
            message: str_field(&extra, "message").unwrap_or_default(),
            ..blank()
        }
    }).collect()
}

fn extract_trivy(output: &Value) -> Vec<Vulnerability> {
    let Some(targets) = output.get("Results").and_then(Value::as_array) else { return Vec::new() };
    let mut vulns = Vec::new();
    for target in targets {
        let file = str_field(target, "Target");
        if let Some(items) = target.get("Vulnerabilities").and_then(Value::as_array) {
            for v in items {
                vulns.push(Vulnerability {
                    file: file.clone(),
                    package: str_field(v, "PkgName"),
                    severity: severity_field(v, "Severity"),
                    rule_id: str_field(v, "VulnerabilityID"),
                    message: str_field(v, "Title")
                        .or_else(|| str_field(v, "Description"))
                        .unwrap_or_default(),
                    ..blank()
                });
            }
        }
        if let Some(items) = target.get("Secrets").and_then(Value::as_array) {
            for s in items {
                vulns.push(Vulnerability {
                    file: file.clone(),
                    line: line_field(s, "StartLine"),
                    severity: severity_field(s, "Severity"),
                    rule_id: str_field(s, "RuleID"),
                    message: str_field(s, "Title").unwrap_or_default(),
                    sensitive_data: true,
                    ..blank()
                });
            }
        }
    }
    vulns
}

fn extract_bandit(output: &Value) -> Vec<Vulnerability> {
    let Some(results) = output.get("results").and_then(Value::as_array) else { return Vec::new() };
    results.iter().map(|r| Vulnerability {
        file: str_field(r, "filename"),
        line: line_field(r, "line_number"),
        severity: severity_field(r, "issue_severity"),
        rule_id: str_field(r, "test_id"),
        message: str_field(r, "issue_text").unwrap_or_default(),
        ..blank()
    }).collect()
}

fn extract_npm_audit(output: &Value) -> Vec<Vulnerability> {
    let Some(packages) = output.get("vulnerabilities").and_then(Value::as_object) else { return Vec::new() };
    packages.iter().map(|(name, v)| {
        // `via` mixes advisory objects and names of transitive packages
        let titles: Vec<String> = v.get("via")
            .and_then(Value::as_array)
            .map(|via| via.iter().filter_map(|item| match item {
                Value::Object(_) => str_field(item, "title"),
                Value::String(s) => Some(format!("via {}", s)),
                _ => None,
            }).collect())
            .unwrap_or_default();
        let rule_id = v.get("via")
            .and_then(Value::as_array)
            .and_then(|via| via.iter().find_map(|item| str_field(item, "url")));
        Vulnerability {
            package: Some(name.clone()),
            severity: severity_field(v, "severity"),
            rule_id,
            message: if titles.is_empty() {
                str_field(v, "range").map(|r| format!("vulnerable range {}", r)).unwrap_or_default()
            } else {
                titles.join("; ")
            },
            ..blank()
        }
    }).collect()
}

fn extract_safety(output: &Value) -> Vec<Vulnerability> {
    // Legacy format: array of objects; newer: {"vulnerabilities": [...]}
    let items = output.as_array()
        .or_else(|| output.get("vulnerabilities").and_then(Value::as_array));
    let Some(items) = items else { return Vec::new() };
    items.iter().filter(|v| v.is_object()).map(|v| Vulnerability {
        package: str_field(v, "package").or_else(|| str_field(v, "package_name")),
        severity: v.get("severity")
            .and_then(|s| s.as_str().map(str::to_string).or_else(|| str_field(s, "cvssv3_base_severity")))
            .map(|s| Severity::from_label(&s))
            .unwrap_or_default(),
        rule_id: str_field(v, "vulnerability_id").or_else(|| str_field(v, "CVE")),
        message: str_field(v, "vulnerability")
            .or_else(|| str_field(v, "advisory"))
            .unwrap_or_default(),
        ..blank()
    }).collect()
}

fn extract_gosec(output: &Value) -> Vec<Vulnerability> {
    let Some(issues) = output.get("Issues").and_then(Value::as_array) else { return Vec::new() };
    issues.iter().map(|i| Vulnerability {
        file: str_field(i, "file"),
        line: line_field(i, "line"),
        severity: severity_field(i, "severity"),
        rule_id: str_field(i, "rule_id"),
        message: str_field(i, "details").unwrap_or_default(),
        ..blank()
    }).collect()
}

fn extract_njsscan(output: &Value) -> Vec<Vulnerability> {
    let mut vulns = Vec::new();
    for section in ["nodejs", "templates"] {
        let Some(rules) = output.get(section).and_then(Value::as_object) else { continue };
        for (rule_id, entry) in rules {
            let metadata = entry.get("metadata").cloned().unwrap_or(Value::Null);
            let severity = severity_field(&metadata, "severity");
            let message = str_field(&metadata, "description").unwrap_or_default();
            let files = entry.get("files").and_then(Value::as_array).cloned().unwrap_or_default();
            for file in files {
                vulns.push(Vulnerability {
                    file: str_field(&file, "file_path"),
                    line: file.get("match_lines")
                        .and_then(Value::as_array)
                        .and_then(|lines| lines.first())
                        .and_then(Value::as_u64),
                    severity,
                    rule_id: Some(rule_id.clone()),
                    message: message.clone(),
                    ..blank()
                });
            }
        }
    }
    vulns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ToolOutput, ToolResult};
    use serde_json::json;

    #[test]
    fn test_extract_semgrep() {
        let output = json!({"results": [{
            "check_id": "python.django.security.injection.sql",
            "path": "app/views.py",
            "start": {"line": 42},
            "extra": {"severity": "ERROR", "message": "Detected SQL injection"}
        }]});
        let vulns = extract_from_tool("semgrep", &output);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].file.as_deref(), Some("app/views.py"));
        assert_eq!(vulns[0].line, Some(42));
        assert_eq!(vulns[0].severity, Severity::High);
        assert_eq!(vulns[0].source_tool, "semgrep");
        assert!(!vulns[0].sensitive_data);
    }

    #[test]
    fn test_extract_trivy_vulns_and_secrets() {
        let output = json!({"Results": [
            {"Target": "requirements.txt", "Vulnerabilities": [
                {"VulnerabilityID": "CVE-2023-1", "PkgName": "django", "Severity": "CRITICAL", "Title": "RCE"}
            ]},
            {"Target": "config.py", "Secrets": [
                {"RuleID": "aws-access-key-id", "Severity": "CRITICAL", "Title": "AWS Access Key ID", "StartLine": 3}
            ]}
        ]});
        let vulns = extract_from_tool("trivy", &output);
        assert_eq!(vulns.len(), 2);
        assert_eq!(vulns[0].package.as_deref(), Some("django"));
        assert!(!vulns[0].sensitive_data);
        assert_eq!(vulns[1].line, Some(3));
        assert!(vulns[1].sensitive_data);
    }

    #[test]
    fn test_extract_bandit_hardcoded_password_is_not_pii() {
        let output = json!({"results": [{
            "filename": "./settings.py", "line_number": 7, "issue_severity": "LOW",
            "issue_text": "Possible hardcoded password: 'hunter2'", "test_id": "B105"
        }]});
        let vulns = extract_from_tool("bandit", &output);
        assert_eq!(vulns[0].rule_id.as_deref(), Some("B105"));
        assert!(!vulns[0].sensitive_data);
    }

    #[test]
    fn test_extract_semgrep_credential_wording_is_not_sensitive() {
        let output = json!({"results": [
            {"path": "app/views.py", "check_id": "python.django.security.audit.csrf-exempt",
             "extra": {"severity": "WARNING", "message": "View is exempt from CSRF token validation"}},
            {"path": "app/auth.py", "check_id": "python.flask.security.audit.no-rate-limit",
             "extra": {"severity": "WARNING", "message": "Password reset form lacks rate limiting"}},
            {"path": "app/billing.py", "check_id": "python.lang.security.audit.logging-pci",
             "extra": {"severity": "ERROR", "message": "Card number written to application log"}}
        ]});
        let vulns = extract_from_tool("semgrep", &output);
        assert_eq!(vulns.len(), 3);
        assert!(!vulns[0].sensitive_data);
        assert!(!vulns[1].sensitive_data);
        assert!(vulns[2].sensitive_data);
    }

    #[test]
    fn test_extract_npm_audit() {
        let output = json!({"vulnerabilities": {
            "lodash": {"severity": "high", "range": "<4.17.21", "via": [
                {"title": "Prototype Pollution in lodash", "url": "https://github.com/advisories/GHSA-1"}
            ]},
            "express": {"severity": "moderate", "range": "<4.0.0", "via": ["body-parser"]}
        }});
        let vulns = extract_from_tool("npm-audit", &output);
        assert_eq!(vulns.len(), 2);
        let express = vulns.iter().find(|v| v.package.as_deref() == Some("express")).unwrap();
        assert_eq!(express.severity, Severity::Medium);
        assert_eq!(express.message, "via body-parser");
        let lodash = vulns.iter().find(|v| v.package.as_deref() == Some("lodash")).unwrap();
        assert_eq!(lodash.rule_id.as_deref(), Some("https://github.com/advisories/GHSA-1"));
    }

    #[test]
    fn test_extract_safety_both_formats() {
        let legacy = json!([{"package": "django", "vulnerability": "XSS", "severity": "high"}]);
        assert_eq!(extract_from_tool("safety", &legacy)[0].package.as_deref(), Some("django"));

        let modern = json!({"vulnerabilities": [{"package_name": "flask", "advisory": "DoS", "vulnerability_id": "123"}]});
        let vulns = extract_from_tool("safety", &modern);
        assert_eq!(vulns[0].package.as_deref(), Some("flask"));
        assert_eq!(vulns[0].rule_id.as_deref(), Some("123"));
    }

    #[test]
    fn test_extract_gosec_string_line() {
        let output = json!({"Issues": [{"severity": "MEDIUM", "rule_id": "G104", "details": "Errors unhandled.", "file": "main.go", "line": "12-14"}]});
        let vulns = extract_from_tool("gosec", &output);
        assert_eq!(vulns[0].line, Some(12));
    }

    #[test]
    fn test_extract_njsscan() {
        let output = json!({"nodejs": {"node_sqli_injection": {
            "files": [{"file_path": "db.js", "match_lines": [5, 6]}],
            "metadata": {"severity": "ERROR", "description": "SQL injection"}
        }}});
        let vulns = extract_from_tool("njsscan", &output);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].line, Some(5));
        assert_eq!(vulns[0].rule_id.as_deref(), Some("node_sqli_injection"));
    }

    #[test]
    fn test_unknown_tool_yields_nothing() {
        assert!(extract_from_tool("nikto", &json!({"results": [{}]})).is_empty());
    }

    #[test]
    fn test_extract_vulnerabilities_sorted_and_skips_failures() {
        let results: ScanResult = vec![
            ("bandit".to_string(), ToolResult::success(ToolOutput::Structured(json!({"results": [
                {"filename": "a.py", "issue_severity": "LOW", "issue_text": "assert used", "test_id": "B101"}
            ]})))),
            ("semgrep".to_string(), ToolResult::success(ToolOutput::Structured(json!({"results": [
                {"path": "b.py", "check_id": "x", "extra": {"severity": "CRITICAL", "message": "rce"}}
            ]})))),
            ("trivy".to_string(), ToolResult::failure("timed out")),
            ("nikto".to_string(), ToolResult::success(ToolOutput::Text("0 items".into()))),
        ].into_iter().collect();

        let vulns = extract_vulnerabilities(&results);
        assert_eq!(vulns.len(), 2);
        assert_eq!(vulns[0].severity, Severity::Critical);
        assert_eq!(vulns[1].source_tool, "bandit");
    }

    #[test]
    fn test_mentions_sensitive_data() {
        assert!(mentions_sensitive_data(None, "Credit card number logged"));
        assert!(mentions_sensitive_data(None, "exposes PII of customers"));
        assert!(mentions_sensitive_data(Some("ssn-in-url"), ""));
        assert!(!mentions_sensitive_data(Some("generic-api-key"), ""));
        assert!(!mentions_sensitive_data(None, "View is exempt from CSRF token validation"));
        assert!(!mentions_sensitive_data(None, "Password reset form lacks rate limiting"));
        assert!(!mentions_sensitive_data(Some("B101"), "Use of assert detected"));
    }
}

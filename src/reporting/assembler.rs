use chrono::{DateTime, Utc};

use crate::financial::FinancialAnalysis;
use crate::models::{ScanResult, Severity, ToolResult, Vulnerability};
use crate::reporting::formatter::{
    format_financial_dashboard, format_severity_summary, format_vulnerability_markdown,
};

/// Everything that goes into one downloadable scan report.
pub struct ReportInput<'a> {
    pub repo_url: &'a str,
    pub generated_at: DateTime<Utc>,
    pub results: &'a ScanResult,
    pub vulnerabilities: &'a [Vulnerability],
    pub ai_summary: Option<&'a str>,
    pub financial: Option<&'a FinancialAnalysis>,
}

pub fn assemble_report(input: &ReportInput<'_>) -> String {
    let mut report = String::from("# Security Scan Report\n\n");
    report.push_str(&format!("**Repository:** {}\n\n", input.repo_url));
    report.push_str(&format!("**Date:** {}\n\n", input.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    report.push_str("---\n\n## AI Executive Summary\n\n");
    match input.ai_summary {
        Some(summary) => report.push_str(summary.trim()),
        None => report.push_str("AI summary unavailable."),
    }
    report.push_str("\n\n---\n\n## Summary\n\n");
    report.push_str(&format_severity_summary(input.vulnerabilities));
    report.push_str("---\n\n## Detailed Findings\n\n");

    for (tool, result) in input.results.iter() {
        report.push_str(&format!("### Tool: {}\n\n", tool));
        match result {
            ToolResult::Failure { error } => {
                report.push_str(&format!("**Error executing tool:**\n\n```\n{}\n```\n\n", error));
            }
            ToolResult::Success { .. } => {
                let findings: Vec<&Vulnerability> = input
                    .vulnerabilities
                    .iter()
                    .filter(|v| &v.source_tool == tool)
                    .collect();
                if findings.is_empty() {
                    report.push_str("No issues extracted.\n\n");
                } else {
                    report.push_str(&format!("{} issue(s)\n\n", findings.len()));
                    for (i, vuln) in findings.iter().enumerate() {
                        report.push_str(&format_vulnerability_markdown(i + 1, vuln));
                    }
                }
            }
        }
    }

    if let Some(financial) = input.financial {
        report.push_str("---\n\n");
        report.push_str(&format_financial_dashboard(financial));
    }

    report.push_str("---\n\n");
    report.push_str(&recommendations(input.vulnerabilities));
    report.push_str("---\n\n*End of Report*\n");
    report
}

fn recommendations(vulns: &[Vulnerability]) -> String {
    let has = |s: Severity| vulns.iter().any(|v| v.severity == s);
    let mut out = String::from("## Recommendations\n\n");

    if has(Severity::Critical) {
        out.push_str("### Critical Priority\n\n");
        out.push_str("- Address all critical severity vulnerabilities immediately\n");
        out.push_str("- Consider blocking deployment until they are resolved\n\n");
    }
    if has(Severity::High) {
        out.push_str("### High Priority\n\n");
        out.push_str("- Address high severity issues within 24-48 hours\n");
        out.push_str("- Update vulnerable dependencies to patched versions\n\n");
    }
    if has(Severity::Medium) || has(Severity::Low) {
        out.push_str("### Medium/Low Priority\n\n");
        out.push_str("- Schedule fixes in the next maintenance cycle\n\n");
    }
    if vulns.iter().any(|v| v.sensitive_data) {
        out.push_str("### Sensitive Data\n\n");
        out.push_str("- Rotate any exposed secrets or credentials and remove them from history\n\n");
    }

    out.push_str("### General\n\n");
    out.push_str("- Keep dependencies up to date\n");
    out.push_str("- Run these scanners in CI on every change\n\n");
    out
}

use std::fmt::Write;

use crate::financial::{FinancialAnalysis, RiskTicket};
use crate::models::{Severity, Vulnerability};
use crate::utils::formatting::format_currency;

pub fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🟢",
        _ => "⚪",
    }
}

pub fn format_vulnerability_markdown(index: usize, vuln: &Vulnerability) -> String {
    let mut out = format!("#### {} Finding {}\n\n", severity_marker(vuln.severity), index);
    let location = match (&vuln.file, vuln.line) {
        (Some(file), Some(line)) => Some(format!("`{}:{}`", file, line)),
        (Some(file), None) => Some(format!("`{}`", file)),
        _ => None,
    };
    if let Some(location) = location {
        let _ = writeln!(out, "- **Location:** {}", location);
    }
    if let Some(package) = &vuln.package {
        let _ = writeln!(out, "- **Package:** `{}`", package);
    }
    let _ = writeln!(out, "- **Severity:** {}", vuln.severity);
    if let Some(rule) = &vuln.rule_id {
        let _ = writeln!(out, "- **Rule:** {}", rule);
    }
    if !vuln.message.is_empty() {
        let _ = writeln!(out, "- **Message:** {}", vuln.message);
    }
    if vuln.sensitive_data {
        out.push_str("- **Sensitive data:** yes\n");
    }
    out.push('\n');
    out
}

pub fn format_severity_summary(vulns: &[Vulnerability]) -> String {
    let count = |s: Severity| vulns.iter().filter(|v| v.severity == s).count();
    let mut out = format!("**Total Issues Found:** {}\n\n", vulns.len());
    if vulns.is_empty() {
        return out;
    }

    out.push_str("| Severity | Count |\n|---|---|\n");
    for severity in [Severity::Critical, Severity::High, Severity::Medium, Severity::Low, Severity::Info, Severity::Unknown] {
        let n = count(severity);
        if n > 0 {
            let _ = writeln!(out, "| {} {} | {} |", severity_marker(severity), severity, n);
        }
    }
    out.push('\n');
    out
}

pub fn format_financial_dashboard(analysis: &FinancialAnalysis) -> String {
    let s = &analysis.summary;
    let mut out = String::from("## Financial Impact\n\n");
    let _ = writeln!(out, "| Metric | Value |\n|---|---|");
    let _ = writeln!(out, "| Vulnerabilities processed | {} |", analysis.vulnerabilities_processed);
    let _ = writeln!(out, "| Mapped to business assets | {} |", analysis.assets_mapped);
    let _ = writeln!(out, "| Total financial exposure | {} |", format_currency(s.total_financial_exposure));
    let _ = writeln!(out, "| Total fix cost | {} |", format_currency(s.total_fix_cost));
    let _ = writeln!(out, "| Net benefit of fixing | {} |", format_currency(s.net_benefit));
    match s.average_rosi {
        Some(rosi) => { let _ = writeln!(out, "| Average ROSI | {:.1}% |", rosi); }
        None => out.push_str("| Average ROSI | n/a |\n"),
    }
    out.push('\n');

    for ticket in &analysis.risk_tickets {
        out.push_str(&format_ticket_markdown(ticket));
    }
    out
}

pub fn format_ticket_markdown(ticket: &RiskTicket) -> String {
    let e = &ticket.financial_exposure;
    let mut out = format!(
        "### {} Risk Ticket #{}: {} ({})\n\n{}\n\n",
        severity_marker(ticket.severity),
        ticket.ticket_number,
        ticket.asset_name,
        ticket.severity,
        ticket.executive_summary,
    );
    let _ = writeln!(out, "- **Direct loss:** {}", format_currency(e.direct_loss));
    let _ = writeln!(out, "- **Indirect loss:** {}", format_currency(e.indirect_loss));
    let _ = writeln!(out, "- **Breach penalty:** {}", format_currency(e.breach_penalty));
    let _ = writeln!(out, "- **Total exposure:** {}", format_currency(e.total));
    let _ = writeln!(out, "- **Recommendation:** {}", ticket.rosi.recommendation);
    if let Some(p) = ticket.rosi.rosi_percentage {
        let _ = writeln!(out, "- **ROSI:** {:.1}%", p);
    }
    out.push('\n');
    out
}

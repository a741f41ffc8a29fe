use serde::{Deserialize, Serialize};

use super::impact::{FinancialExposure, Rosi};
use super::matcher::MatchTier;
use crate::models::Severity;
use crate::utils::formatting::format_compact;

/// Technical phrase -> what it means to the business. First hit wins.
const BUSINESS_TRANSLATIONS: &[(&str, &str)] = &[
    ("sql injection", "database manipulation that could expose customer data"),
    ("cross-site scripting", "malicious code injection that could compromise user sessions"),
    ("xss", "malicious code injection that could compromise user sessions"),
    ("buffer overflow", "system instability that could cause crashes or data theft"),
    ("authentication bypass", "unauthorized access to protected systems"),
    ("csrf", "unauthorized actions performed on behalf of legitimate users"),
    ("path traversal", "unauthorized file access that could expose sensitive data"),
    ("command injection", "system takeover that could compromise all data"),
    ("deserialization", "code execution that could lead to system compromise"),
    ("sensitive data", "unprotected customer or business information"),
    ("access control", "unauthorized access to restricted features or data"),
    ("misconfiguration", "improper settings that create security gaps"),
    ("hardcoded", "embedded passwords that could grant unauthorized access"),
    ("password", "embedded passwords that could grant unauthorized access"),
    ("weak cryptography", "inadequate data protection that could be easily broken"),
    ("cve-", "outdated software component with known security flaws"),
];

const DEFAULT_BUSINESS_IMPACT: &str =
    "security vulnerability that could compromise system integrity or data confidentiality";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDetails {
    pub source_tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub original_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTicket {
    /// 1-based position after ranking.
    pub ticket_number: usize,
    pub asset_id: String,
    pub asset_name: String,
    pub severity: Severity,
    pub severity_weight: u8,
    pub match_tier: MatchTier,
    pub confidence: u8,
    pub financial_exposure: FinancialExposure,
    pub rosi: Rosi,
    pub business_impact: String,
    pub executive_summary: String,
    pub technical_details: TechnicalDetails,
}

/// Plain-language description of what a finding means for the business.
pub fn business_impact(message: &str, rule_id: Option<&str>) -> &'static str {
    let haystack = format!("{} {}", message, rule_id.unwrap_or("")).to_lowercase();
    BUSINESS_TRANSLATIONS
        .iter()
        .find(|(term, _)| haystack.contains(term))
        .map(|(_, phrase)| *phrase)
        .unwrap_or(DEFAULT_BUSINESS_IMPACT)
}

pub fn executive_summary(severity: Severity, asset_name: &str, impact: &str, total: f64) -> String {
    format!(
        "A {} security vulnerability has been identified in {}, exposing the organization to {}. \
         The estimated financial impact is {}, including potential downtime costs, reputation damage, \
         and regulatory penalties.",
        severity.as_str().to_lowercase(),
        asset_name,
        impact,
        format_compact(total),
    )
}

//! Exposure and ROSI arithmetic.
//!
//! Direct loss is modeled as 4% of the total business impact, so the indirect
//! part is always derived from it. Every amount is rounded to cents before it
//! is summed, which keeps `total` exactly equal to the sum of its parts.
//! Negative or non-finite inputs count as zero and no result is ever NaN or
//! infinite.

use serde::{Deserialize, Serialize};

use crate::models::Severity;

/// Share of the total impact that direct downtime loss represents.
pub const DIRECT_LOSS_RATIO: f64 = 0.04;
/// Flat regulatory penalty for exposing PCI/PII data.
pub const BREACH_PENALTY: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialExposure {
    pub direct_loss: f64,
    pub indirect_loss: f64,
    pub breach_penalty: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rosi {
    pub fix_cost: f64,
    pub net_benefit: f64,
    /// Absent when `fix_cost` is zero or the ratio does not fit in an f64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rosi_percentage: Option<f64>,
    pub recommendation: String,
}

pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

fn amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Sum that stops at `f64::MAX` instead of overflowing to infinity.
pub fn saturating_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().map(amount).fold(0.0, |acc, v| {
        let sum = acc + v;
        if sum.is_finite() {
            sum
        } else {
            f64::MAX
        }
    })
}

pub fn compute_exposure(hourly_downtime_cost: f64, rto_hours: f64, exposes_sensitive_data: bool) -> FinancialExposure {
    let mut direct_loss = round_cents(amount(hourly_downtime_cost) * amount(rto_hours));
    // an impact too large to represent cannot be priced
    if !(direct_loss / DIRECT_LOSS_RATIO).is_finite() {
        direct_loss = 0.0;
    }
    let indirect_loss = round_cents(direct_loss / DIRECT_LOSS_RATIO - direct_loss);
    let breach_penalty = if exposes_sensitive_data { BREACH_PENALTY } else { 0.0 };
    let total = round_cents(direct_loss + indirect_loss + breach_penalty);

    FinancialExposure { direct_loss, indirect_loss, breach_penalty, total }
}

pub fn compute_rosi(total_exposure: f64, fix_cost: f64) -> Rosi {
    let fix_cost = amount(fix_cost);
    let net_benefit = round_cents(amount(total_exposure) - fix_cost);
    let rosi_percentage = (fix_cost > 0.0)
        .then(|| round_cents(net_benefit / fix_cost * 100.0))
        .filter(|p| p.is_finite());

    Rosi {
        fix_cost: round_cents(fix_cost),
        net_benefit,
        rosi_percentage,
        recommendation: recommendation(rosi_percentage).to_string(),
    }
}

pub fn recommendation(rosi_percentage: Option<f64>) -> &'static str {
    match rosi_percentage {
        None => "UNDEFINED - No remediation cost provided",
        Some(p) if p > 10_000.0 => "CRITICAL INVESTMENT - Immediate action required",
        Some(p) if p > 1_000.0 => "HIGH PRIORITY - Strong financial justification",
        Some(p) if p > 100.0 => "RECOMMENDED - Positive return on investment",
        Some(p) if p > 0.0 => "CONSIDER - Marginal positive return",
        Some(_) => "LOW PRIORITY - Cost exceeds immediate risk",
    }
}

/// Hourly downtime cost for an asset type when the inventory omits one.
pub fn estimate_hourly_cost(asset_type: Option<&str>) -> f64 {
    let asset_type = asset_type.unwrap_or("").to_lowercase();
    if asset_type.contains("payment") {
        50_000.0
    } else if asset_type.contains("ecommerce") || asset_type.contains("e-commerce") {
        40_000.0
    } else if asset_type.contains("auth") {
        35_000.0
    } else if asset_type.contains("database") {
        30_000.0
    } else if asset_type.contains("api") {
        25_000.0
    } else {
        10_000.0
    }
}

/// Recovery time for a vulnerability when the asset omits one, scaled by how
/// critical the asset is (critical assets get restored first).
pub fn estimate_rto_hours(severity: Severity, criticality: Option<&str>) -> f64 {
    let base = match severity {
        Severity::Critical => 24.0,
        Severity::High => 72.0,
        Severity::Medium => 168.0,
        _ => 720.0,
    };
    let multiplier = match criticality.map(|c| c.to_lowercase()).as_deref() {
        Some("critical") => 0.5,
        Some("high") => 0.75,
        Some("low") => 1.5,
        _ => 1.0,
    };
    base * multiplier
}

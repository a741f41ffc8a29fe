use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::assets::BusinessAsset;
use super::impact::{compute_exposure, compute_rosi, estimate_hourly_cost, estimate_rto_hours, round_cents,
    saturating_sum};
use super::matcher::AssetMatcher;
use super::tickets::{business_impact, executive_summary, RiskTicket, TechnicalDetails};
use crate::config::FinancialConfig;
use crate::models::{Severity, Vulnerability};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_vulnerabilities: usize,
    pub total_financial_exposure: f64,
    pub total_fix_cost: f64,
    pub net_benefit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rosi: Option<f64>,
    pub severity_breakdown: BTreeMap<String, usize>,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysis {
    pub summary: FinancialSummary,
    pub risk_tickets: Vec<RiskTicket>,
    pub vulnerabilities_processed: usize,
    pub assets_mapped: usize,
}

pub struct FinancialAnalyzer {
    matcher: Box<dyn AssetMatcher>,
    fix_cost: f64,
    max_tickets: usize,
}

impl FinancialAnalyzer {
    pub fn new(matcher: Box<dyn AssetMatcher>, fix_cost: f64, max_tickets: usize) -> Self {
        Self { matcher, fix_cost, max_tickets }
    }

    pub fn from_config(config: &FinancialConfig) -> Self {
        Self::new(super::matcher::matcher_for(config.matcher), config.fix_cost, config.max_tickets)
    }

    /// Map each vulnerability to an asset, price it, and rank the resulting
    /// tickets. Pure: same inputs always give the same output.
    pub fn analyze(&self, vulnerabilities: &[Vulnerability], assets: &[BusinessAsset]) -> FinancialAnalysis {
        let mut tickets: Vec<RiskTicket> = vulnerabilities
            .iter()
            .filter_map(|vuln| {
                let found = self.matcher.match_asset(vuln, assets)?;
                let asset = assets.get(found.asset_index)?;
                Some(self.build_ticket(vuln, asset, found.tier, found.confidence))
            })
            .collect();
        let assets_mapped = tickets.len();

        // stable sort keeps input order for equal keys
        tickets.sort_by(|a, b| {
            b.financial_exposure
                .total
                .total_cmp(&a.financial_exposure.total)
                .then(b.severity_weight.cmp(&a.severity_weight))
        });
        tickets.truncate(self.max_tickets);
        for (i, ticket) in tickets.iter_mut().enumerate() {
            ticket.ticket_number = i + 1;
        }

        debug!(
            matcher = self.matcher.name(),
            processed = vulnerabilities.len(),
            mapped = assets_mapped,
            tickets = tickets.len(),
            "Financial analysis complete"
        );

        FinancialAnalysis {
            summary: summarize(&tickets),
            risk_tickets: tickets,
            vulnerabilities_processed: vulnerabilities.len(),
            assets_mapped,
        }
    }

    fn build_ticket(
        &self,
        vuln: &Vulnerability,
        asset: &BusinessAsset,
        tier: super::matcher::MatchTier,
        confidence: u8,
    ) -> RiskTicket {
        let hourly = asset
            .hourly_downtime_cost
            .unwrap_or_else(|| estimate_hourly_cost(asset.asset_type.as_deref()));
        let rto = asset
            .rto_hours
            .unwrap_or_else(|| estimate_rto_hours(vuln.severity, asset.criticality.as_deref()));
        let exposure = compute_exposure(hourly, rto, vuln.sensitive_data || asset.sensitive_data);
        let rosi = compute_rosi(exposure.total, self.fix_cost);
        let impact = business_impact(&vuln.message, vuln.rule_id.as_deref());

        RiskTicket {
            ticket_number: 0,
            asset_id: asset.asset_id.clone(),
            asset_name: asset.name.clone(),
            severity: vuln.severity,
            severity_weight: vuln.severity.weight(),
            match_tier: tier,
            confidence,
            executive_summary: executive_summary(vuln.severity, &asset.name, impact, exposure.total),
            business_impact: impact.to_string(),
            financial_exposure: exposure,
            rosi,
            technical_details: TechnicalDetails {
                source_tool: vuln.source_tool.clone(),
                file: vuln.file.clone(),
                line: vuln.line,
                package: vuln.package.clone(),
                rule_id: vuln.rule_id.clone(),
                original_message: vuln.message.clone(),
            },
        }
    }
}

fn summarize(tickets: &[RiskTicket]) -> FinancialSummary {
    let total_financial_exposure = round_cents(saturating_sum(tickets.iter().map(|t| t.financial_exposure.total)));
    let total_fix_cost = round_cents(saturating_sum(tickets.iter().map(|t| t.rosi.fix_cost)));

    let defined: Vec<f64> = tickets.iter().filter_map(|t| t.rosi.rosi_percentage).collect();
    let average_rosi = (!defined.is_empty())
        .then(|| round_cents(defined.iter().sum::<f64>() / defined.len() as f64))
        .filter(|avg| avg.is_finite());

    let mut severity_breakdown = BTreeMap::new();
    for ticket in tickets {
        *severity_breakdown.entry(ticket.severity.as_str().to_string()).or_insert(0) += 1;
    }
    let count = |s: Severity| tickets.iter().filter(|t| t.severity == s).count();

    FinancialSummary {
        total_vulnerabilities: tickets.len(),
        total_financial_exposure,
        total_fix_cost,
        net_benefit: round_cents(total_financial_exposure - total_fix_cost),
        average_rosi,
        severity_breakdown,
        critical_count: count(Severity::Critical),
        high_count: count(Severity::High),
        medium_count: count(Severity::Medium),
        low_count: count(Severity::Low),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::matcher::{ExactMatcher, MatchTier, RulesMatcher};

    fn vuln(package: &str, severity: Severity, sensitive: bool) -> Vulnerability {
        Vulnerability {
            source_tool: "trivy".into(),
            file: Some("requirements.txt".into()),
            line: None,
            package: Some(package.into()),
            severity,
            rule_id: Some("CVE-2024-0001".into()),
            message: "vulnerable dependency".into(),
            sensitive_data: sensitive,
        }
    }

    fn asset(id: &str, hourly: f64, rto: f64) -> BusinessAsset {
        let mut a = BusinessAsset::new(id, id.to_uppercase());
        a.hourly_downtime_cost = Some(hourly);
        a.rto_hours = Some(rto);
        a
    }

    #[test]
    fn test_reference_ticket() {
        let analyzer = FinancialAnalyzer::new(Box::new(ExactMatcher), 5_000.0, 10);
        let result = analyzer.analyze(&[vuln("payments", Severity::Critical, true)], &[asset("payments", 10_000.0, 4.0)]);

        let ticket = &result.risk_tickets[0];
        assert_eq!(ticket.ticket_number, 1);
        assert_eq!(ticket.match_tier, MatchTier::Exact);
        assert_eq!(ticket.financial_exposure.direct_loss, 40_000.0);
        assert_eq!(ticket.financial_exposure.indirect_loss, 960_000.0);
        assert_eq!(ticket.financial_exposure.breach_penalty, 1_000_000.0);
        assert_eq!(ticket.financial_exposure.total, 2_000_000.0);
        assert_eq!(ticket.rosi.net_benefit, 1_995_000.0);
        assert_eq!(result.summary.total_financial_exposure, 2_000_000.0);
        assert_eq!(result.summary.critical_count, 1);
    }

    #[test]
    fn test_asset_sensitivity_triggers_breach_penalty() {
        let mut a = asset("payments", 10_000.0, 4.0);
        a.sensitive_data = true;
        let analyzer = FinancialAnalyzer::new(Box::new(ExactMatcher), 5_000.0, 10);
        let result = analyzer.analyze(&[vuln("payments", Severity::High, false)], &[a]);
        assert_eq!(result.risk_tickets[0].financial_exposure.breach_penalty, 1_000_000.0);
    }

    #[test]
    fn test_unmatched_counted_but_not_ticketed() {
        let analyzer = FinancialAnalyzer::new(Box::new(RulesMatcher), 5_000.0, 10);
        let vulns = vec![vuln("payments", Severity::High, false), vuln("leftpad", Severity::Low, false)];
        let result = analyzer.analyze(&vulns, &[asset("payments", 1_000.0, 2.0)]);
        assert_eq!(result.vulnerabilities_processed, 2);
        assert_eq!(result.assets_mapped, 1);
        assert_eq!(result.risk_tickets.len(), 1);
    }

    #[test]
    fn test_ranking_and_truncation() {
        let analyzer = FinancialAnalyzer::new(Box::new(ExactMatcher), 5_000.0, 2);
        let assets = vec![asset("a", 100.0, 1.0), asset("b", 10_000.0, 1.0), asset("c", 1_000.0, 1.0)];
        let vulns = vec![
            vuln("a", Severity::Low, false),
            vuln("b", Severity::Low, false),
            vuln("c", Severity::Low, false),
        ];
        let result = analyzer.analyze(&vulns, &assets);

        assert_eq!(result.risk_tickets.len(), 2);
        assert_eq!(result.assets_mapped, 3);
        assert_eq!(result.risk_tickets[0].asset_id, "b");
        assert_eq!(result.risk_tickets[1].asset_id, "c");
        assert_eq!(result.risk_tickets[1].ticket_number, 2);
        assert!(result
            .risk_tickets
            .windows(2)
            .all(|w| w[0].financial_exposure.total >= w[1].financial_exposure.total));
    }

    #[test]
    fn test_ties_broken_by_severity_then_input_order() {
        let analyzer = FinancialAnalyzer::new(Box::new(ExactMatcher), 5_000.0, 10);
        let assets = vec![asset("a", 100.0, 1.0), asset("b", 100.0, 1.0), asset("c", 100.0, 1.0)];
        let vulns = vec![
            vuln("a", Severity::Low, false),
            vuln("b", Severity::High, false),
            vuln("c", Severity::Low, false),
        ];
        let ids: Vec<_> = analyzer.analyze(&vulns, &assets).risk_tickets.into_iter().map(|t| t.asset_id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_zero_fix_cost_has_no_rosi() {
        let analyzer = FinancialAnalyzer::new(Box::new(ExactMatcher), 0.0, 10);
        let result = analyzer.analyze(&[vuln("payments", Severity::High, false)], &[asset("payments", 10.0, 1.0)]);
        assert_eq!(result.risk_tickets[0].rosi.rosi_percentage, None);
        assert_eq!(result.summary.average_rosi, None);

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("Infinity"));
        assert!(!json.contains("NaN"));
    }

    #[test]
    fn test_missing_costs_fall_back_to_estimates() {
        let mut a = BusinessAsset::new("payments", "Payments");
        a.asset_type = Some("payment".into());
        a.criticality = Some("critical".into());
        let analyzer = FinancialAnalyzer::new(Box::new(ExactMatcher), 5_000.0, 10);
        let result = analyzer.analyze(&[vuln("payments", Severity::Critical, false)], &[a]);
        // 50k/h for 24h halved for a critical asset
        assert_eq!(result.risk_tickets[0].financial_exposure.direct_loss, 600_000.0);
    }

    #[test]
    fn test_empty_inputs() {
        let analyzer = FinancialAnalyzer::new(Box::new(RulesMatcher), 5_000.0, 10);
        let result = analyzer.analyze(&[], &[]);
        assert!(result.risk_tickets.is_empty());
        assert_eq!(result.summary.total_financial_exposure, 0.0);
    }
}

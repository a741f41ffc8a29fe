use std::path::Path;

use serde::{Deserialize, Serialize};

use super::assets::BusinessAsset;
use crate::config::MatcherKind;
use crate::models::Vulnerability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Path,
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetMatch {
    /// Index into the asset slice passed to the matcher.
    pub asset_index: usize,
    pub tier: MatchTier,
    pub confidence: u8,
}

/// Associates a vulnerability with at most one business asset.
pub trait AssetMatcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn match_asset(&self, vuln: &Vulnerability, assets: &[BusinessAsset]) -> Option<AssetMatch>;
}

pub fn matcher_for(kind: MatcherKind) -> Box<dyn AssetMatcher> {
    match kind {
        MatcherKind::Exact => Box::new(ExactMatcher),
        MatcherKind::Rules => Box::new(RulesMatcher),
    }
}

/// Asset id or name equals the vulnerable package or the file stem,
/// ignoring case. First asset in inventory order wins.
pub struct ExactMatcher;

impl AssetMatcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn match_asset(&self, vuln: &Vulnerability, assets: &[BusinessAsset]) -> Option<AssetMatch> {
        let stem = vuln
            .file
            .as_deref()
            .and_then(|f| Path::new(f).file_stem())
            .and_then(|s| s.to_str());
        let candidates: Vec<&str> = [vuln.package.as_deref(), stem].into_iter().flatten().collect();
        if candidates.is_empty() {
            return None;
        }

        assets
            .iter()
            .position(|asset| {
                candidates.iter().any(|c| {
                    c.eq_ignore_ascii_case(&asset.asset_id) || c.eq_ignore_ascii_case(&asset.name)
                })
            })
            .map(|asset_index| AssetMatch { asset_index, tier: MatchTier::Exact, confidence: 100 })
    }
}

/// Exact match, then path rules, then keyword scoring.
pub struct RulesMatcher;

impl RulesMatcher {
    fn match_path(vuln: &Vulnerability, assets: &[BusinessAsset]) -> Option<AssetMatch> {
        let file = vuln.file.as_deref()?.to_lowercase();
        assets
            .iter()
            .position(|asset| {
                asset.paths.iter().any(|p| !p.is_empty() && file.contains(&p.to_lowercase()))
            })
            .map(|asset_index| AssetMatch { asset_index, tier: MatchTier::Path, confidence: 100 })
    }

    fn match_keywords(vuln: &Vulnerability, assets: &[BusinessAsset]) -> Option<AssetMatch> {
        let text = vuln.searchable_text();
        if text.trim().is_empty() {
            return None;
        }

        let mut best: Option<(usize, usize)> = None;
        for (index, asset) in assets.iter().enumerate() {
            let hits = asset
                .keywords
                .iter()
                .filter(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
                .count();
            // strict > keeps the earlier asset on ties
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((index, hits));
            }
        }

        best.map(|(asset_index, hits)| AssetMatch {
            asset_index,
            tier: MatchTier::Keyword,
            confidence: (60 + 10 * hits).min(90) as u8,
        })
    }
}

impl AssetMatcher for RulesMatcher {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn match_asset(&self, vuln: &Vulnerability, assets: &[BusinessAsset]) -> Option<AssetMatch> {
        ExactMatcher
            .match_asset(vuln, assets)
            .or_else(|| Self::match_path(vuln, assets))
            .or_else(|| Self::match_keywords(vuln, assets))
    }
}

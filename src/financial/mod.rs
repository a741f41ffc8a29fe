pub mod analyzer;
pub mod assets;
pub mod impact;
pub mod matcher;
pub mod tickets;

pub use analyzer::{FinancialAnalysis, FinancialAnalyzer, FinancialSummary};
pub use assets::{parse_inventory, BusinessAsset};
pub use impact::{compute_exposure, compute_rosi, FinancialExposure, Rosi};
pub use matcher::{matcher_for, AssetMatch, AssetMatcher, ExactMatcher, MatchTier, RulesMatcher};
pub use tickets::RiskTicket;

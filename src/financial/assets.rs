use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::CyberImpactError;

/// One row of a business asset inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAsset {
    pub asset_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_downtime_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rto_hours: Option<f64>,
    #[serde(default)]
    pub sensitive_data: bool,
    /// Path fragments owned by this asset (`services/payments`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl BusinessAsset {
    pub fn new(asset_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            name: name.into(),
            asset_type: None,
            criticality: None,
            hourly_downtime_cost: None,
            rto_hours: None,
            sensitive_data: false,
            paths: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

impl BusinessAsset {
    /// Downtime cost and RTO, when given, must be non-negative and their
    /// product must fit in an f64.
    pub fn has_valid_costs(&self) -> bool {
        let valid = |v: Option<f64>| v.map_or(true, |v| v.is_finite() && v >= 0.0);
        valid(self.hourly_downtime_cost)
            && valid(self.rto_hours)
            && (self.hourly_downtime_cost.unwrap_or(0.0) * self.rto_hours.unwrap_or(0.0)).is_finite()
    }
}

/// Parse a JSON inventory: either a top-level array of assets or
/// `{"assets": [...]}`. Assets with unusable cost figures are dropped.
pub fn parse_inventory(bytes: &[u8]) -> Result<Vec<BusinessAsset>, CyberImpactError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map.remove("assets").ok_or_else(|| {
            CyberImpactError::BadRequest("asset inventory has no \"assets\" list".into())
        })?,
        _ => {
            return Err(CyberImpactError::BadRequest(
                "asset inventory must be a JSON array or object".into(),
            ))
        }
    };
    let assets: Vec<BusinessAsset> = serde_json::from_value(list)?;
    Ok(assets
        .into_iter()
        .filter(|asset| {
            let valid = asset.has_valid_costs();
            if !valid {
                warn!(
                    asset_id = %asset.asset_id,
                    hourly_downtime_cost = ?asset.hourly_downtime_cost,
                    rto_hours = ?asset.rto_hours,
                    "Skipping asset with invalid downtime cost or RTO"
                );
            }
            valid
        })
        .collect())
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use super::firebase::FirebaseVerifier;
use crate::config::AuthConfig;
use crate::errors::CyberImpactError;

/// A caller whose bearer token checked out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub uid: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub claims: Map<String, Value>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into(), claims: Map::new() }
    }
}

/// Checks a bearer token with whoever issued it. Rejections are
/// `Unauthorized`; provider outages are `ServiceUnavailable` or `Network`.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, CyberImpactError>;

    fn name(&self) -> &str;
}

/// Fixed token -> uid table for local development and tests.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, CyberImpactError> {
        self.tokens
            .get(token)
            .map(Identity::new)
            .ok_or_else(|| CyberImpactError::Unauthorized("Invalid authentication token".into()))
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Firebase when an API key is configured, otherwise the static table when it
/// has entries, otherwise nothing (authenticated routes answer 503).
pub fn verifier_from_config(config: &AuthConfig) -> Option<Arc<dyn IdentityVerifier>> {
    if let Some(key) = config.firebase_api_key.as_deref().filter(|k| !k.is_empty()) {
        return Some(Arc::new(FirebaseVerifier::new(key)));
    }
    if !config.static_tokens.is_empty() {
        return Some(Arc::new(StaticTokenVerifier::new(config.static_tokens.clone())));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticTokenVerifier::new(HashMap::from([("tok".to_string(), "alice".to_string())]));
        assert_eq!(verifier.verify("tok").await.unwrap().uid, "alice");
        assert!(matches!(verifier.verify("nope").await, Err(CyberImpactError::Unauthorized(_))));
    }

    #[test]
    fn test_verifier_from_config() {
        assert!(verifier_from_config(&AuthConfig::default()).is_none());

        let mut config = AuthConfig::default();
        config.static_tokens.insert("t".into(), "u".into());
        assert_eq!(verifier_from_config(&config).unwrap().name(), "static");

        config.firebase_api_key = Some("key".into());
        assert_eq!(verifier_from_config(&config).unwrap().name(), "firebase");
    }

    #[test]
    fn test_identity_serializes_without_empty_claims() {
        let json = serde_json::to_value(Identity::new("u1")).unwrap();
        assert_eq!(json, serde_json::json!({"uid": "u1"}));
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::verifier::{Identity, IdentityVerifier};
use crate::config::credentials::redact_credentials;
use crate::errors::CyberImpactError;

const LOOKUP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

/// Verifies Firebase ID tokens through the Identity Toolkit lookup endpoint,
/// which checks signature and expiry server-side.
pub struct FirebaseVerifier {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl FirebaseVerifier {
    pub fn new(api_key: &str) -> Self {
        Self::with_endpoint(api_key, LOOKUP_URL)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, CyberImpactError> {
        let resp = self.client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({"idToken": token}))
            .send()
            .await
            .map_err(|e| CyberImpactError::ServiceUnavailable(redact_credentials(
                &format!("identity provider unreachable: {}", e),
                &[self.api_key.as_str()],
            )))?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(CyberImpactError::ServiceUnavailable(format!("identity provider returned {}", status)));
        }

        let data: Value = resp.json().await
            .map_err(|e| CyberImpactError::ServiceUnavailable(format!("identity provider response: {}", e)))?;

        if !status.is_success() {
            let reason = data["error"]["message"].as_str().unwrap_or("rejected");
            debug!(%status, reason, "Token rejected");
            return Err(CyberImpactError::Unauthorized(format!("Invalid authentication token: {}", reason)));
        }

        identity_from_lookup(&data)
    }

    fn name(&self) -> &str {
        "firebase"
    }
}

fn identity_from_lookup(data: &Value) -> Result<Identity, CyberImpactError> {
    let user = &data["users"][0];
    let uid = user["localId"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CyberImpactError::Unauthorized("Invalid authentication token".into()))?;

    let mut claims = Map::new();
    for key in ["email", "emailVerified", "displayName", "providerUserInfo"] {
        if let Some(value) = user.get(key) {
            claims.insert(key.to_string(), value.clone());
        }
    }
    Ok(Identity { uid: uid.to_string(), claims })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_lookup() {
        let data = json!({"users": [{"localId": "abc123", "email": "a@b.c", "emailVerified": true, "passwordHash": "x"}]});
        let identity = identity_from_lookup(&data).unwrap();
        assert_eq!(identity.uid, "abc123");
        assert_eq!(identity.claims["email"], "a@b.c");
        assert!(!identity.claims.contains_key("passwordHash"));
    }

    #[test]
    fn test_lookup_without_users_is_unauthorized() {
        assert!(matches!(identity_from_lookup(&json!({})), Err(CyberImpactError::Unauthorized(_))));
        assert!(matches!(identity_from_lookup(&json!({"users": []})), Err(CyberImpactError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        let verifier = FirebaseVerifier::with_endpoint("secretkey", "http://127.0.0.1:1/lookup");
        let err = verifier.verify("t").await.unwrap_err();
        assert!(matches!(err, CyberImpactError::ServiceUnavailable(_)));
        assert!(!err.to_string().contains("secretkey"));
    }
}

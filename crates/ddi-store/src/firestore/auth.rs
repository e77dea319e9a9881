//! Service-account credentials for the Firestore REST API
//!
//! A Google service-account key is exchanged for a short-lived OAuth2 access
//! token by posting a signed RS256 JWT assertion to the key's token endpoint.

use crate::StoreError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// OAuth2 scope granting Firestore read/write access
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Default Google OAuth2 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for each assertion
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a downloaded service-account JSON key that the loader uses
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account identity, used as the JWT issuer
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Project the key belongs to
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Load a key from a JSON key file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Auth(format!("Cannot read credentials file {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// Parse a key from its JSON text
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::Auth(format!("Invalid service account key: {}", e)))
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// Build the signed JWT assertion for the token exchange
pub(crate) fn signed_assertion(key: &ServiceAccountKey, issued_at: u64) -> Result<String, StoreError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StoreError::Auth(format!("Invalid private key: {}", e)))?;

    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: DATASTORE_SCOPE,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| StoreError::Auth(format!("Failed to sign assertion: {}", e)))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// A cached OAuth2 access token
#[derive(Debug, Clone)]
pub(crate) struct AccessToken {
    pub(crate) value: String,
    expires_at: Instant,
}

impl AccessToken {
    pub(crate) fn new(value: String, lifetime: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + lifetime,
        }
    }

    /// Still usable for at least the refresh margin
    pub(crate) fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Exchange a signed assertion for an access token
pub(crate) async fn exchange(
    client: &reqwest::Client,
    key: &ServiceAccountKey,
) -> Result<AccessToken, StoreError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| StoreError::Auth(format!("System clock error: {}", e)))?
        .as_secs();
    let assertion = signed_assertion(key, now)?;

    let response = client
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Auth(format!("Token exchange failed (HTTP {}): {}", status, body)));
    }

    let token: TokenResponse = response.json().await?;
    tracing::debug!("Obtained Firestore access token (expires in {}s)", token.expires_in);
    Ok(AccessToken::new(token.access_token, Duration::from_secs(token.expires_in)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parsing_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"loader@demo.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(key.project_id, None);
    }

    #[test]
    fn test_key_parsing_rejects_incomplete_key() {
        let result = ServiceAccountKey::from_json(r#"{"client_email":"x"}"#);
        assert!(matches!(result, Err(StoreError::Auth(_))));
    }

    #[test]
    fn test_missing_key_file() {
        let result = ServiceAccountKey::from_file("/nonexistent/key.json");
        assert!(matches!(result, Err(StoreError::Auth(_))));
    }

    #[test]
    fn test_invalid_private_key_is_auth_error() {
        let key = ServiceAccountKey {
            client_email: "loader@demo.iam.gserviceaccount.com".into(),
            private_key: "not a pem".into(),
            token_uri: DEFAULT_TOKEN_URI.into(),
            project_id: None,
        };
        assert!(matches!(signed_assertion(&key, 0), Err(StoreError::Auth(_))));
    }

    #[test]
    fn test_token_freshness() {
        assert!(AccessToken::new("t".into(), Duration::from_secs(3600)).is_fresh());
        assert!(!AccessToken::new("t".into(), Duration::from_secs(30)).is_fresh());
    }
}

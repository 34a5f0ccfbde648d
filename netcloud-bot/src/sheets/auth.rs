//! Google service-account authentication
//!
//! Signs an RS256 assertion with the service-account key and exchanges it at
//! the key's `token_uri` for a bearer token. Tokens are cached until shortly
//! before they expire.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Error, Result};

/// OAuth scopes: read/write sheets, find spreadsheets by name
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account JSON key the bot needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Auth(format!("invalid service-account key: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Hands out bearer tokens for the Sheets and Drive APIs
pub struct TokenProvider {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Fails if the private key is not a valid RSA PEM
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::Auth(format!("unusable private key: {}", e)))?;
        Ok(Self {
            http,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Signed JWT assertion for the token exchange
    pub fn assertion(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| Error::Auth(format!("failed to sign assertion: {}", e)))
    }

    /// Current bearer token, fetching a new one when needed
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() + EXPIRY_MARGIN < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        debug!(client_email = %self.key.client_email, "Requesting service-account token");
        let assertion = self.assertion()?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("token exchange returned {}: {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(token.access_token)
    }
}

//! Service-account OAuth2 tokens for the publish endpoint.
//!
//! # Responsibilities
//! - Sign a JWT bearer assertion with the service-account key (RS256)
//! - Exchange it at the key's token URI for an access token
//! - Cache the token until shortly before it expires
//!
//! # Design Decisions
//! - The signing key is parsed once, at client construction
//! - Concurrent refreshes are allowed; the last one wins the cache slot

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::publish::types::{PublishError, PublishResult, ServiceAccountKey};

/// OAuth scope for publishing.
pub const PUBSUB_SCOPE: &str = "https://www.googleapis.com/auth/pubsub";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Issues and caches access tokens for one service account.
pub struct ServiceAccountTokenSource {
    http: reqwest::Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    cached: ArcSwapOption<AccessToken>,
}

impl ServiceAccountTokenSource {
    /// Parse the private key; fails if it is not an RSA PEM key.
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> PublishResult<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| PublishError::Credentials(format!("private_key: {}", e)))?;

        Ok(Self {
            http,
            key,
            signing_key,
            cached: ArcSwapOption::const_empty(),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// A valid access token, fetching a new one when needed.
    pub async fn token(&self) -> PublishResult<String> {
        if let Some(token) = self.cached.load_full() {
            if token.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        self.cached.store(Some(Arc::new(token)));
        Ok(value)
    }

    /// Drop the cached token so the next call refreshes.
    pub fn invalidate(&self) {
        self.cached.store(None);
    }

    fn assertion(&self) -> PublishResult<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: PUBSUB_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.signing_key).map_err(|e| PublishError::Token(e.to_string()))
    }

    async fn fetch(&self) -> PublishResult<AccessToken> {
        let assertion = self.assertion()?;
        let requested_at = Instant::now();

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Token(format!("token endpoint returned {}: {}", status, body)));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Token(format!("malformed token response: {}", e)))?;

        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = parsed.expires_in,
            "Fetched publish access token"
        );

        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: requested_at + Duration::from_secs(parsed.expires_in),
        })
    }
}

impl std::fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("client_email", &self.key.client_email)
            .field("token_uri", &self.key.token_uri)
            .field("cached", &self.cached.load().is_some())
            .finish()
    }
}

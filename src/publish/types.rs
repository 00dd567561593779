//! Publish-side types and error definitions.

use serde::Deserialize;
use thiserror::Error;

/// Default OAuth2 token endpoint for Google service accounts.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Errors that can occur while publishing a payload.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Service-account bundle is missing fields or holds an unusable key.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Token exchange failed.
    #[error("Token error: {0}")]
    Token(String),

    /// HTTP transport failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("Publish rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Endpoint answer could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// In-process sink has no receiver left.
    #[error("Publish sink closed")]
    Closed,

    /// Publish did not settle within the configured timeout.
    #[error("Publish timed out after {0} seconds")]
    Timeout(u64),
}

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// The subset of a Google service-account key used for publishing.
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

impl ServiceAccountKey {
    /// Read the key out of an opaque credential bundle.
    pub fn from_bundle(bundle: &serde_json::Map<String, serde_json::Value>) -> PublishResult<Self> {
        serde_json::from_value(serde_json::Value::Object(bundle.clone()))
            .map_err(|e| PublishError::Credentials(e.to_string()))
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the capture
//! client. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Hosted APIToolkit endpoint used when no root URL is configured.
pub const DEFAULT_ROOT_URL: &str = "https://app.apitoolkit.io";

/// Google Cloud Pub/Sub REST root.
pub const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";

/// Root configuration for the capture client.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// APIToolkit API key (Bearer token for the metadata endpoint).
    pub api_key: String,

    /// Log redaction, serialization and publish diagnostics.
    pub debug: bool,

    /// Override of the metadata endpoint root (e.g. for self-hosted setups).
    pub root_url: Option<String>,

    /// Header names whose values are redacted (case-insensitive).
    pub redact_headers: Vec<String>,

    /// JSON paths redacted in request bodies.
    pub redact_request_body: Vec<String>,

    /// JSON paths redacted in response bodies.
    pub redact_response_body: Vec<String>,

    /// Largest request/response body buffered for capture, in bytes.
    pub max_body_size: usize,

    /// Metadata fetch timeout in seconds.
    pub metadata_timeout_secs: u64,

    /// Per-message publish timeout in seconds.
    pub publish_timeout_secs: u64,

    /// Override of the Pub/Sub REST root (emulators, private endpoints).
    pub pubsub_endpoint: Option<String>,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            debug: false,
            root_url: None,
            redact_headers: Vec::new(),
            redact_request_body: Vec::new(),
            redact_response_body: Vec::new(),
            max_body_size: 1024 * 1024, // 1MB
            metadata_timeout_secs: 10,
            publish_timeout_secs: 10,
            pubsub_endpoint: None,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Configuration with only the API key set.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_redact_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redact_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_redact_request_body<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redact_request_body = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_redact_response_body<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redact_response_body = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = Some(root_url.into());
        self
    }

    pub fn with_pubsub_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.pubsub_endpoint = Some(endpoint.into());
        self
    }

    /// Metadata endpoint root, falling back to the hosted service.
    ///
    /// An empty override counts as unset.
    pub fn root_url(&self) -> &str {
        match self.root_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/'),
            _ => DEFAULT_ROOT_URL,
        }
    }

    pub fn pubsub_endpoint(&self) -> &str {
        match self.pubsub_endpoint.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/'),
            _ => DEFAULT_PUBSUB_ENDPOINT,
        }
    }
}

impl std::fmt::Debug for CaptureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureConfig")
            .field("api_key", &"<hidden>")
            .field("debug", &self.debug)
            .field("root_url", &self.root_url())
            .field("redact_headers", &self.redact_headers)
            .field("redact_request_body", &self.redact_request_body)
            .field("redact_response_body", &self.redact_response_body)
            .field("max_body_size", &self.max_body_size)
            .field("pubsub_endpoint", &self.pubsub_endpoint())
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

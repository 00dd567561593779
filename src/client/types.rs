//! Client metadata and initialization errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ValidationError;
use crate::publish::PublishError;
use crate::redact::RedactPathError;

/// Project and publish destination resolved from the API key.
#[derive(Clone, Deserialize, Serialize)]
pub struct ClientMetadata {
    pub project_id: String,
    pub pubsub_project_id: String,
    pub topic_id: String,
    /// Opaque credential bundle (a Google service-account key).
    pub pubsub_push_service_account: serde_json::Map<String, serde_json::Value>,
}

impl std::fmt::Debug for ClientMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientMetadata")
            .field("project_id", &self.project_id)
            .field("pubsub_project_id", &self.pubsub_project_id)
            .field("topic_id", &self.topic_id)
            .finish_non_exhaustive()
    }
}

/// Errors that prevent the capture client from starting.
#[derive(Debug, Error)]
pub enum InitError {
    /// Configuration failed semantic validation.
    #[error("Invalid configuration: {}", join(.0))]
    Config(Vec<ValidationError>),

    /// A body redaction path could not be compiled.
    #[error("Invalid redaction rule: {0}")]
    RedactPath(#[from] RedactPathError),

    /// Metadata endpoint could not be reached.
    #[error("Metadata request failed: {0}")]
    MetadataRequest(#[from] reqwest::Error),

    /// Metadata endpoint answered with a non-success status.
    #[error("Metadata endpoint returned status {status}: {body}")]
    MetadataStatus { status: u16, body: String },

    /// Metadata response was not the expected document.
    #[error("Malformed client metadata: {0}")]
    MetadataDecode(#[from] serde_json::Error),

    /// Credential bundle could not be turned into a publisher.
    #[error("Failed to set up publisher: {0}")]
    Publisher(#[from] PublishError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for client construction.
pub type InitResult<T> = Result<T, InitError>;

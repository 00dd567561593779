//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the API key and endpoint URLs
//! - Compile every body redaction path once, before traffic flows
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: CaptureConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::CaptureConfig;
use crate::redact::JsonPath;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api_key must not be empty")]
    MissingApiKey,

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} contains an invalid path: {reason}")]
    InvalidRedactPath { field: &'static str, reason: String },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &CaptureConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    check_url("root_url", config.root_url(), &mut errors);
    check_url("pubsub_endpoint", config.pubsub_endpoint(), &mut errors);

    if config.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.metadata_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "metadata_timeout_secs",
        });
    }
    if config.publish_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "publish_timeout_secs",
        });
    }

    check_paths("redact_request_body", &config.redact_request_body, &mut errors);
    check_paths("redact_response_body", &config.redact_response_body, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

fn check_paths(field: &'static str, paths: &[String], errors: &mut Vec<ValidationError>) {
    for path in paths {
        if let Err(e) = JsonPath::parse(path) {
            errors.push(ValidationError::InvalidRedactPath {
                field,
                reason: e.to_string(),
            });
        }
    }
}

//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::CaptureConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "APITOOLKIT_KEY";
/// Environment variable overriding the metadata root URL.
pub const ENV_ROOT_URL: &str = "APITOOLKIT_ROOT_URL";
/// Environment variable toggling debug diagnostics.
pub const ENV_DEBUG: &str = "APITOOLKIT_DEBUG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied before validation.
pub fn load_config(path: &Path) -> Result<CaptureConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: CaptureConfig = toml::from_str(&content)?;
    let config = apply_overrides(config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build and validate configuration from environment variables alone.
pub fn config_from_env() -> Result<CaptureConfig, ConfigError> {
    let config = apply_overrides(CaptureConfig::default(), |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `APITOOLKIT_*` overrides using `lookup` to read variables.
pub fn apply_overrides<F>(mut config: CaptureConfig, lookup: F) -> CaptureConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        config.api_key = key;
    }
    if let Some(url) = lookup(ENV_ROOT_URL).filter(|v| !v.trim().is_empty()) {
        config.root_url = Some(url);
    }
    if let Some(debug) = lookup(ENV_DEBUG) {
        config.debug = matches!(debug.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
    }
    config
}

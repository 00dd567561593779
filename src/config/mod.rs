//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) / builder calls
//!     → loader.rs (parse, APITOOLKIT_* env overrides)
//!     → validation.rs (semantic checks, redaction path compilation)
//!     → CaptureConfig (validated, immutable)
//!     → owned by Client, shared via Arc with every capture
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the client is built
//! - All fields have defaults; only the API key is required
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{config_from_env, load_config, ConfigError};
pub use schema::{CaptureConfig, LogFormat, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};

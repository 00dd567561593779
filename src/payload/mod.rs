//! Payload subsystem.
//!
//! # Data Flow
//! ```text
//! Transaction (raw request/response snapshot)
//!     → builder.rs (normalize, redact, base64, timestamp)
//!     → record.rs (TransactionRecord, wire layout)
//!     → serde_json bytes (empty on failure)
//!     → publish sink
//! ```
//!
//! # Design Decisions
//! - Building is synchronous and does no I/O
//! - Serialization failures drop the record instead of failing the response
//! - Durations are reported in nanoseconds

pub mod builder;
pub mod record;

pub use builder::{build_payload, build_record, serialize_record, Transaction};
pub use record::{CapturedError, TransactionRecord, SDK_TYPE};

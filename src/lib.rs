//! Request/response capture middleware for axum services.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ capture_middleware ──▶ host handlers
//!                          │    ▲                 │
//!                          │    └─── response ◀───┘
//!                          ▼
//!                  payload (redact, encode)
//!                          │ tokio::spawn
//!                          ▼
//!                  Publisher (Pub/Sub REST) ──▶ APIToolkit
//! ```
//!
//! A [`Client`] is built once at startup from a [`CaptureConfig`]: it resolves
//! the project metadata for the API key and sets up the publisher. The
//! middleware then records every exchange, redacts it and publishes it
//! without delaying the response.

// Capture pipeline
pub mod client;
pub mod http;
pub mod payload;
pub mod publish;
pub mod redact;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use client::{Client, ClientMetadata, InitError};
pub use config::CaptureConfig;
pub use http::{capture_middleware, report_error, ErrorRecorder, MessageId};
pub use payload::{CapturedError, TransactionRecord};
pub use publish::{Publisher, PublishError};

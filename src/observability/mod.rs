//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! capture middleware / client / publisher produce:
//!     → logging.rs (structured log events, debug-gated diagnostics)
//!     → metrics.rs (capture outcomes, payload sizes, publish latency)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every message ID is logged as a structured field for correlation
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

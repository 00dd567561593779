//! HTTP capture subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → middleware/capture.rs (msg id, error recorder, matched route)
//!     → body.rs (buffer request body when bounded)
//!     → host handler (may report errors via context.rs)
//!     → body.rs (buffer response body when bounded)
//!     → request.rs helpers → payload builder → Client::publish
//!     → response returned unchanged
//! ```

pub mod body;
pub mod context;
pub mod middleware;
pub mod request;

pub use context::{report_error, ErrorRecorder, MessageId};
pub use middleware::{capture_middleware, message_id};

//! HTTP middleware components.

pub mod capture;

pub use capture::{capture_middleware, message_id};

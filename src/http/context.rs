//! Request-scoped capture context.
//!
//! The capture middleware inserts a [`MessageId`] and an [`ErrorRecorder`]
//! into the request extensions before calling the handler. Handlers reach
//! them through `Extension<_>`:
//!
//! ```rust,no_run
//! use axum::Extension;
//! use apitoolkit_axum::{ErrorRecorder, MessageId};
//!
//! async fn handler(
//!     Extension(msg_id): Extension<MessageId>,
//!     Extension(errors): Extension<ErrorRecorder>,
//! ) -> String {
//!     if let Err(e) = "x".parse::<u32>() {
//!         errors.report(&e);
//!     }
//!     msg_id.to_string()
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::Request;

use crate::payload::CapturedError;

/// Correlation ID of the capture wrapping the current request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, shared list of errors reported while handling one request.
///
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct ErrorRecorder {
    entries: Arc<Mutex<Vec<CapturedError>>>,
}

impl ErrorRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `err` (and its source chain) against the current request.
    pub fn report<E>(&self, err: &E)
    where
        E: std::error::Error + ?Sized,
    {
        self.report_entry(CapturedError::from_error(err));
    }

    pub fn report_entry(&self, entry: CapturedError) {
        self.lock().push(entry);
    }

    /// Copy of everything reported so far, in report order.
    pub fn entries(&self) -> Vec<CapturedError> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while pushing cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<CapturedError>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Report `err` on the recorder attached to `req`, if any.
///
/// Returns `false` when the request is not wrapped by the capture middleware.
pub fn report_error<B, E>(req: &Request<B>, err: &E) -> bool
where
    E: std::error::Error + ?Sized,
{
    match req.extensions().get::<ErrorRecorder>() {
        Some(recorder) => {
            recorder.report(err);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_clones_share_entries() {
        let recorder = ErrorRecorder::new();
        let handle = recorder.clone();

        handle.report(&std::io::Error::new(std::io::ErrorKind::NotFound, "first"));
        recorder.report(&std::io::Error::new(std::io::ErrorKind::Other, "second"));

        let entries = recorder.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
    }

    #[test]
    fn test_report_error_on_request() {
        let recorder = ErrorRecorder::new();
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "x");

        assert!(!report_error(&req, &err));

        req.extensions_mut().insert(recorder.clone());
        assert!(report_error(&req, &err));
        assert_eq!(recorder.len(), 1);
    }
}

//! Redaction subsystem.
//!
//! # Data Flow
//! ```text
//! CaptureConfig.redact_* (strings)
//!     → path.rs (compile body paths once at client construction)
//!     → Redactor (immutable, shared via Arc)
//!
//! Per capture:
//!     request/response headers → headers.rs (case-insensitive names)
//!     request/response bodies  → body.rs (JSON paths, pass-through otherwise)
//! ```
//!
//! # Design Decisions
//! - Redaction always produces a copy; captured inputs are never mutated
//! - Matched values are replaced with a single fixed marker
//! - Bodies that are not JSON are never an error

pub mod body;
pub mod headers;
pub mod path;

pub use body::redact_body;
pub use headers::{redact_headers, HeaderFields, HeaderRules};
pub use path::{JsonPath, RedactPathError, Segment};

/// Replacement value for every redacted field.
pub const REDACTED_MARKER: &str = "[CLIENT_REDACTED]";

/// Compiled redaction rules for one client.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    headers: HeaderRules,
    request_body: Vec<JsonPath>,
    response_body: Vec<JsonPath>,
    debug: bool,
}

impl Redactor {
    /// Compile the three rule sets.
    pub fn new<S: AsRef<str>>(
        headers: &[S],
        request_body: &[S],
        response_body: &[S],
        debug: bool,
    ) -> Result<Self, RedactPathError> {
        Ok(Self {
            headers: HeaderRules::new(headers),
            request_body: compile(request_body)?,
            response_body: compile(response_body)?,
            debug,
        })
    }

    pub fn headers(&self, headers: &HeaderFields) -> HeaderFields {
        self.headers.apply(headers)
    }

    pub fn request_body(&self, body: &[u8]) -> Vec<u8> {
        redact_body(body, &self.request_body, self.debug)
    }

    pub fn response_body(&self, body: &[u8]) -> Vec<u8> {
        redact_body(body, &self.response_body, self.debug)
    }
}

/// Compile a list of body paths, failing on the first invalid one.
pub fn compile<S: AsRef<str>>(paths: &[S]) -> Result<Vec<JsonPath>, RedactPathError> {
    paths.iter().map(|p| JsonPath::parse(p.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_sets_are_independent() {
        let redactor = Redactor::new(&["authorization"], &["password"], &["token"], false).unwrap();

        let req = redactor.request_body(br#"{"password":"p","token":"t"}"#);
        let res = redactor.response_body(br#"{"password":"p","token":"t"}"#);

        assert_eq!(req, br#"{"password":"[CLIENT_REDACTED]","token":"t"}"#.to_vec());
        assert_eq!(res, br#"{"password":"p","token":"[CLIENT_REDACTED]"}"#.to_vec());
    }

    #[test]
    fn test_invalid_path_rejected() {
        let err = Redactor::new::<&str>(&[], &["a..b"], &[], false).unwrap_err();
        assert!(matches!(err, RedactPathError::Syntax { .. }));
    }
}

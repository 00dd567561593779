//! Body redaction.
//!
//! Bodies are redacted only when they parse as JSON. Anything else (form
//! data, binary, plain text, empty) is passed through byte for byte.

use serde_json::Value;

use super::path::JsonPath;
use super::REDACTED_MARKER;

/// Redact the nodes addressed by `paths` inside a JSON body.
///
/// With no paths, or a body that is not JSON, the input bytes are returned
/// unchanged. When `debug` is set, parse failures are logged.
pub fn redact_body(body: &[u8], paths: &[JsonPath], debug: bool) -> Vec<u8> {
    if body.is_empty() || paths.is_empty() {
        return body.to_vec();
    }

    let mut document: Value = match serde_json::from_slice(body) {
        Ok(doc) => doc,
        Err(e) => {
            if debug {
                tracing::warn!(
                    error = %e,
                    body_len = body.len(),
                    "Body is not JSON, skipping redaction"
                );
            }
            return body.to_vec();
        }
    };

    let marker = Value::String(REDACTED_MARKER.to_string());
    let replaced: usize = paths
        .iter()
        .map(|path| path.replace_in(&mut document, &marker))
        .sum();

    if replaced == 0 {
        return body.to_vec();
    }

    match serde_json::to_vec(&document) {
        Ok(bytes) => bytes,
        Err(e) => {
            if debug {
                tracing::warn!(error = %e, "Failed to re-serialize redacted body");
            }
            body.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // Runs `f` under an info-level subscriber, the crate's default log level.
    fn info_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_debug_flag_surfaces_parse_failure_at_default_level() {
        let logs = info_logs(|| {
            redact_body(b"not json", &paths(&["password"]), true);
        });
        assert!(logs.contains("Body is not JSON"), "logs: {logs}");

        let quiet = info_logs(|| {
            redact_body(b"not json", &paths(&["password"]), false);
        });
        assert!(quiet.is_empty(), "logs: {quiet}");
    }

    fn paths(raw: &[&str]) -> Vec<JsonPath> {
        raw.iter().map(|p| JsonPath::parse(p).unwrap()).collect()
    }

    #[test]
    fn test_redacts_top_level_key_preserving_order() {
        let body = br#"{"password":"abc","name":"x"}"#;
        let out = redact_body(body, &paths(&["password"]), false);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"{"password":"[CLIENT_REDACTED]","name":"x"}"#
        );
    }

    #[test]
    fn test_rooted_nested_path() {
        let body = br#"{"user":{"card":{"number":"4111","exp":"12/30"}},"id":7}"#;
        let out = redact_body(body, &paths(&["$.user.card.number"]), false);
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["user"]["card"]["number"], REDACTED_MARKER);
        assert_eq!(value["user"]["card"]["exp"], "12/30");
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_no_paths_returns_exact_bytes() {
        let body = b"{ \"a\" :  1 }";
        assert_eq!(redact_body(body, &[], true), body.to_vec());
    }

    #[test]
    fn test_non_json_passthrough() {
        let body = b"name=x&password=abc";
        assert_eq!(redact_body(body, &paths(&["password"]), true), body.to_vec());

        let binary = [0xffu8, 0x00, 0x13, 0x37];
        assert_eq!(redact_body(&binary, &paths(&["a"]), false), binary.to_vec());
    }

    #[test]
    fn test_empty_body() {
        assert!(redact_body(b"", &paths(&["password"]), true).is_empty());
        assert!(redact_body(b"", &[], false).is_empty());
    }

    #[test]
    fn test_missing_path_keeps_original_bytes() {
        let body = br#"{"b": 1,  "a": 2}"#;
        assert_eq!(redact_body(body, &paths(&["c.d"]), false), body.to_vec());
    }
}

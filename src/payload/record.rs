//! Wire types published for every captured exchange.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::redact::HeaderFields;

/// Integration tag carried by every record.
pub const SDK_TYPE: &str = "RustAxum";

/// One captured HTTP exchange, in the layout the monitoring service ingests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub request_headers: HeaderFields,
    pub response_headers: HeaderFields,
    pub status_code: u16,
    pub method: String,
    pub errors: Vec<CapturedError>,
    pub host: String,
    pub raw_url: String,
    /// Handler wall time in nanoseconds.
    pub duration: u64,
    pub url_path: String,
    pub query_params: BTreeMap<String, String>,
    pub path_params: BTreeMap<String, String>,
    pub project_id: String,
    pub proto_major: u8,
    pub proto_minor: u8,
    pub msg_id: String,
    pub timestamp: String,
    pub referer: String,
    pub sdk_type: String,
    /// Redacted request body, base64.
    pub request_body: String,
    /// Redacted response body, base64.
    pub response_body: String,
}

/// An error reported by application code while handling a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedError {
    pub when: String,
    pub error_type: String,
    pub root_error_type: String,
    pub message: String,
    pub root_error_message: String,
    pub stack_trace: String,
}

impl CapturedError {
    /// Describe `err` and its source chain.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let error_type = static_type_label(err);

        let mut chain = vec![err.to_string()];
        let mut root: Option<&(dyn StdError + 'static)> = None;
        let mut source = err.source();
        while let Some(next) = source {
            chain.push(next.to_string());
            root = Some(next);
            source = next.source();
        }

        let root_error_type = root.map(dyn_type_label).unwrap_or_else(|| error_type.clone());

        let backtrace = std::backtrace::Backtrace::capture();
        let stack_trace = match backtrace.status() {
            std::backtrace::BacktraceStatus::Captured => backtrace.to_string(),
            _ => chain.join("\ncaused by: "),
        };

        Self {
            when: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            error_type,
            root_error_type,
            message: err.to_string(),
            root_error_message: chain.last().cloned().unwrap_or_default(),
            stack_trace,
        }
    }
}

/// Type label for an error whose type is known at the call site.
///
/// Falls back to [`dyn_type_label`] when called through a trait object.
fn static_type_label<E: StdError + ?Sized>(err: &E) -> String {
    let name = std::any::type_name::<E>();
    if name.starts_with("dyn ") {
        debug_label(&format!("{:?}", err))
    } else {
        name.to_string()
    }
}

/// Type label for a source reached through `Error::source`.
fn dyn_type_label(err: &(dyn StdError + 'static)) -> String {
    macro_rules! known {
        ($($ty:ty),* $(,)?) => {
            $(
                if err.is::<$ty>() {
                    return std::any::type_name::<$ty>().to_string();
                }
            )*
        };
    }
    known!(
        std::io::Error,
        std::num::ParseIntError,
        std::num::ParseFloatError,
        std::str::Utf8Error,
        std::string::FromUtf8Error,
        std::fmt::Error,
        serde_json::Error,
        reqwest::Error,
        axum::Error,
    );
    debug_label(&format!("{:?}", err))
}

// Leading identifier of a Debug rendering; derived Debug starts with the type name.
fn debug_label(debug: &str) -> String {
    let label: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if label.is_empty() {
        "Error".to_string()
    } else {
        label
    }
}

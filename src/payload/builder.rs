//! Transaction record assembly.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri, Version};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;

use crate::http::request::{
    collect_headers, header_str, host, proto_version, query_params, raw_url, route_pattern,
};
use crate::payload::record::{CapturedError, TransactionRecord, SDK_TYPE};
use crate::redact::Redactor;

/// Everything observed about one completed exchange.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub msg_id: String,
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    /// Route pattern as registered with the router, if one matched.
    pub route: Option<String>,
    pub path_params: Vec<(String, String)>,
    pub request_headers: HeaderMap,
    pub request_body: Bytes,
    pub status: StatusCode,
    pub response_headers: HeaderMap,
    pub response_body: Bytes,
    pub duration: Duration,
    pub errors: Vec<CapturedError>,
}

/// Assemble the redacted record for `tx`.
///
/// The timestamp is taken here, at capture time.
pub fn build_record(tx: &Transaction, redactor: &Redactor, project_id: &str) -> TransactionRecord {
    let (proto_major, proto_minor) = proto_version(tx.version);

    let url_path = match tx.route.as_deref() {
        Some(pattern) => route_pattern(pattern),
        None => tx.uri.path().to_string(),
    };

    let path_params: BTreeMap<String, String> = tx.path_params.iter().cloned().collect();

    TransactionRecord {
        request_headers: redactor.headers(&collect_headers(&tx.request_headers)),
        response_headers: redactor.headers(&collect_headers(&tx.response_headers)),
        status_code: tx.status.as_u16(),
        method: tx.method.to_string(),
        errors: tx.errors.clone(),
        host: host(&tx.uri, &tx.request_headers),
        raw_url: raw_url(&tx.uri),
        duration: u64::try_from(tx.duration.as_nanos()).unwrap_or(u64::MAX),
        url_path,
        query_params: query_params(&tx.uri),
        path_params,
        project_id: project_id.to_string(),
        proto_major,
        proto_minor,
        msg_id: tx.msg_id.clone(),
        timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        referer: header_str(&tx.request_headers, header::REFERER),
        sdk_type: SDK_TYPE.to_string(),
        request_body: BASE64.encode(redactor.request_body(&tx.request_body)),
        response_body: BASE64.encode(redactor.response_body(&tx.response_body)),
    }
}

/// Serialize a record; an empty vector means "no payload".
pub fn serialize_record(record: &TransactionRecord, debug: bool) -> Vec<u8> {
    match serde_json::to_vec(record) {
        Ok(bytes) => bytes,
        Err(e) => {
            if debug {
                tracing::error!(msg_id = %record.msg_id, error = %e, "Failed to serialize payload");
            }
            Vec::new()
        }
    }
}

/// Build and serialize the payload for `tx`.
pub fn build_payload(tx: &Transaction, redactor: &Redactor, project_id: &str, debug: bool) -> Vec<u8> {
    serialize_record(&build_record(tx, redactor, project_id), debug)
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `apitoolkit_captures_total` (counter): captures by outcome (published, dropped, failed)
//! - `apitoolkit_payload_bytes` (histogram): serialized payload size
//! - `apitoolkit_publish_duration_seconds` (histogram): publish round-trip latency
//! - `apitoolkit_publish_in_flight` (gauge): background publishes not yet settled
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed by the host
//! - Outcome labels are fixed strings to keep cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Metric names.
pub mod names {
    pub const CAPTURES_TOTAL: &str = "apitoolkit_captures_total";
    pub const PAYLOAD_BYTES: &str = "apitoolkit_payload_bytes";
    pub const PUBLISH_DURATION_SECONDS: &str = "apitoolkit_publish_duration_seconds";
    pub const PUBLISH_IN_FLIGHT: &str = "apitoolkit_publish_in_flight";
}

/// Final state of one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Sink accepted the message.
    Published,
    /// No payload was produced (serialization failure, aborted request).
    Dropped,
    /// Sink rejected the message or timed out.
    Failed,
}

impl CaptureOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureOutcome::Published => "published",
            CaptureOutcome::Dropped => "dropped",
            CaptureOutcome::Failed => "failed",
        }
    }
}

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_capture(outcome: CaptureOutcome) {
    counter!(names::CAPTURES_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

pub fn record_payload_size(bytes: usize) {
    histogram!(names::PAYLOAD_BYTES).record(bytes as f64);
}

pub fn record_publish(start: Instant, outcome: CaptureOutcome) {
    histogram!(names::PUBLISH_DURATION_SECONDS, "outcome" => outcome.as_str())
        .record(start.elapsed().as_secs_f64());
}

pub fn set_publish_in_flight(count: usize) {
    gauge!(names::PUBLISH_IN_FLIGHT).set(count as f64);
}

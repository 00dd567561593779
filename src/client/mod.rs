//! Capture client.
//!
//! # Data Flow
//! ```text
//! Startup (once):
//!     CaptureConfig
//!     → validation (fail fast)
//!     → metadata.rs (GET {root}/api/client_metadata, Bearer api key)
//!     → ServiceAccountKey → PubSubPublisher
//!     → Client (immutable, cheap to clone, shared by every request)
//!
//! Per request (from the capture middleware):
//!     Transaction → Client::build_payload → Client::publish (spawned)
//! ```
//!
//! # Design Decisions
//! - Construction either yields a fully working client or an InitError;
//!   there is no half-initialized capture pipeline
//! - Publishing never runs on the response path
//! - In-flight publishes are counted so hosts can drain them at shutdown

pub mod metadata;
pub mod types;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use tokio::sync::Notify;

use crate::config::{validate_config, CaptureConfig};
use crate::observability::metrics::{self, CaptureOutcome};
use crate::payload::{build_payload, Transaction};
use crate::publish::{PubSubPublisher, PublishError, Publisher, ServiceAccountKey};
use crate::redact::Redactor;

pub use metadata::fetch_client_metadata;
pub use types::{ClientMetadata, InitError, InitResult};

/// Shared handle to the capture pipeline.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: CaptureConfig,
    metadata: ClientMetadata,
    redactor: Redactor,
    publisher: Arc<dyn Publisher>,
    in_flight: AtomicUsize,
    drained: Notify,
}

impl Client {
    /// Validate `config`, resolve metadata and set up the Pub/Sub publisher.
    pub async fn new(config: CaptureConfig) -> InitResult<Self> {
        validate_config(&config).map_err(InitError::Config)?;

        let metadata_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.metadata_timeout_secs))
            .build()?;
        let metadata = fetch_client_metadata(&metadata_http, config.root_url(), &config.api_key).await?;

        let key = ServiceAccountKey::from_bundle(&metadata.pubsub_push_service_account)?;
        let publish_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.publish_timeout_secs))
            .build()?;
        let publisher = PubSubPublisher::new(
            publish_http,
            config.pubsub_endpoint(),
            &metadata.pubsub_project_id,
            &metadata.topic_id,
            key,
        )?;

        if config.debug {
            tracing::info!(
                project_id = %metadata.project_id,
                topic = %publisher.topic(),
                "Client initialized successfully"
            );
        }

        Self::from_parts(config, metadata, Arc::new(publisher))
    }

    /// Assemble a client from already-resolved parts and any publisher.
    pub fn from_parts(
        config: CaptureConfig,
        metadata: ClientMetadata,
        publisher: Arc<dyn Publisher>,
    ) -> InitResult<Self> {
        let redactor = Redactor::new(
            &config.redact_headers,
            &config.redact_request_body,
            &config.redact_response_body,
            config.debug,
        )?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                metadata,
                redactor,
                publisher,
                in_flight: AtomicUsize::new(0),
                drained: Notify::new(),
            }),
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.inner.config
    }

    pub fn metadata(&self) -> &ClientMetadata {
        &self.inner.metadata
    }

    pub fn project_id(&self) -> &str {
        &self.inner.metadata.project_id
    }

    pub fn redactor(&self) -> &Redactor {
        &self.inner.redactor
    }

    /// Number of publishes dispatched but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Serialized, redacted payload for `tx`; empty if serialization failed.
    pub fn build_payload(&self, tx: &Transaction) -> Vec<u8> {
        build_payload(tx, &self.inner.redactor, self.project_id(), self.inner.config.debug)
    }

    /// Hand `payload` to the publisher in the background.
    ///
    /// Returns immediately. Empty payloads are dropped.
    pub fn publish(&self, payload: impl Into<Bytes>, msg_id: &str) {
        let payload = payload.into();
        let debug = self.inner.config.debug;

        if payload.is_empty() {
            metrics::record_capture(CaptureOutcome::Dropped);
            if debug {
                tracing::warn!(msg_id = %msg_id, "Empty payload, nothing published");
            }
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            metrics::record_capture(CaptureOutcome::Dropped);
            tracing::warn!(msg_id = %msg_id, "No async runtime available, capture dropped");
            return;
        };

        metrics::record_payload_size(payload.len());
        let guard = InFlight::enter(self.inner.clone());

        let msg_id = msg_id.to_string();
        runtime.spawn(async move {
            let inner = &guard.inner;
            let start = Instant::now();
            let timeout_secs = inner.config.publish_timeout_secs;
            let result = match tokio::time::timeout(
                Duration::from_secs(timeout_secs),
                inner.publisher.publish(payload),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(PublishError::Timeout(timeout_secs)),
            };

            match result {
                Ok(server_id) => {
                    metrics::record_capture(CaptureOutcome::Published);
                    metrics::record_publish(start, CaptureOutcome::Published);
                    if debug {
                        tracing::info!(msg_id = %msg_id, message_id = %server_id, "Published capture");
                    }
                }
                Err(e) => {
                    metrics::record_capture(CaptureOutcome::Failed);
                    metrics::record_publish(start, CaptureOutcome::Failed);
                    if debug {
                        tracing::error!(msg_id = %msg_id, error = %e, "Failed to publish capture");
                    }
                }
            }
            drop(guard);
        });
    }

    /// Wait for in-flight publishes, up to `timeout`.
    ///
    /// Returns `true` if everything settled in time.
    pub async fn flush(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.inner.drained.notified();
                if self.inner.in_flight.load(Ordering::SeqCst) == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

/// One dispatched publish. Settles on drop, including when the task panics
/// or is cancelled.
struct InFlight {
    inner: Arc<ClientInner>,
}

impl InFlight {
    fn enter(inner: Arc<ClientInner>) -> Self {
        let count = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_publish_in_flight(count);
        Self { inner }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let remaining = self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_publish_in_flight(remaining);
        if remaining == 0 {
            self.inner.drained.notify_waiters();
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("project_id", &self.project_id())
            .field("debug", &self.inner.config.debug)
            .field("publisher", &self.inner.publisher)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

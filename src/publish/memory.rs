//! In-process publisher backed by a Tokio channel.
//!
//! Useful for tests and for hosts that forward captures through their own
//! transport.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::body::Bytes;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use crate::publish::types::{PublishError, PublishResult};
use crate::publish::Publisher;

/// Sends every payload into an unbounded channel.
#[derive(Debug)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<Bytes>,
    next_id: AtomicU64,
}

impl ChannelPublisher {
    /// Create the publisher and the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                next_id: AtomicU64::new(1),
            },
            rx,
        )
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, payload: Bytes) -> BoxFuture<'_, PublishResult<String>> {
        let result = self
            .tx
            .send(payload)
            .map(|()| self.next_id.fetch_add(1, Ordering::Relaxed).to_string())
            .map_err(|_| PublishError::Closed);
        Box::pin(async move { result })
    }
}

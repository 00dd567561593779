//! Publish sink subsystem.
//!
//! # Data Flow
//! ```text
//! ClientMetadata.pubsub_push_service_account
//!     → types.rs (ServiceAccountKey)
//!     → auth.rs (RS256 assertion → OAuth2 access token, cached)
//!     → pubsub.rs (POST projects/{p}/topics/{t}:publish)
//!
//! Per capture (background task, never on the response path):
//!     payload bytes → Publisher::publish → message id | PublishError
//! ```
//!
//! # Design Decisions
//! - One publisher per process, shared as `Arc<dyn Publisher>`
//! - Implementations must be safe for concurrent calls without outside locking
//! - No retries here; a failed publish is logged and counted, then dropped

pub mod auth;
pub mod memory;
pub mod pubsub;
pub mod types;

use axum::body::Bytes;
use futures_util::future::BoxFuture;

pub use auth::ServiceAccountTokenSource;
pub use memory::ChannelPublisher;
pub use pubsub::PubSubPublisher;
pub use types::{PublishError, PublishResult, ServiceAccountKey};

/// Asynchronous, at-least-once message sink.
pub trait Publisher: Send + Sync + std::fmt::Debug {
    /// Publish one payload, resolving to the sink-assigned message id.
    fn publish(&self, payload: Bytes) -> BoxFuture<'_, PublishResult<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_publisher_delivers_in_order() {
        let (publisher, mut rx) = ChannelPublisher::new();

        let first = publisher.publish(Bytes::from_static(b"one")).await.unwrap();
        let second = publisher.publish(Bytes::from_static(b"two")).await.unwrap();
        assert_ne!(first, second);

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"one"));
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn test_channel_publisher_closed() {
        let (publisher, rx) = ChannelPublisher::new();
        drop(rx);
        let err = publisher.publish(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, PublishError::Closed));
    }
}

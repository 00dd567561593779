//! Body buffering for capture.
//!
//! Only bodies whose size is known up front and fits the configured limit are
//! buffered. Everything else (chunked uploads, streamed responses, SSE) is
//! forwarded untouched and captured as empty.

use axum::body::{Body, Bytes, HttpBody};

/// Result of trying to capture a body.
pub struct Buffered {
    /// Captured bytes; empty when the body was not buffered.
    pub captured: Bytes,
    /// Body to forward in place of the original.
    pub body: Body,
}

/// Buffer `body` when its size hint is bounded by `limit`.
pub async fn buffer_body(body: Body, limit: usize) -> Result<Buffered, axum::Error> {
    match body.size_hint().upper() {
        Some(upper) if upper <= limit as u64 => {
            let bytes = axum::body::to_bytes(body, limit).await?;
            Ok(Buffered {
                captured: bytes.clone(),
                body: Body::from(bytes),
            })
        }
        _ => Ok(Buffered {
            captured: Bytes::new(),
            body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn test_sized_body_is_buffered_and_replayed() {
        let out = buffer_body(Body::from("hello"), 1024).await.unwrap();
        assert_eq!(out.captured, Bytes::from_static(b"hello"));

        let replay = axum::body::to_bytes(out.body, 1024).await.unwrap();
        assert_eq!(replay, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_forwarded() {
        let out = buffer_body(Body::from(vec![b'a'; 64]), 16).await.unwrap();
        assert!(out.captured.is_empty());

        let replay = axum::body::to_bytes(out.body, 1024).await.unwrap();
        assert_eq!(replay.len(), 64);
    }

    #[tokio::test]
    async fn test_streamed_body_is_forwarded() {
        let chunks = stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"a")),
            Ok(Bytes::from_static(b"b")),
        ]);
        let out = buffer_body(Body::from_stream(chunks), 1024).await.unwrap();
        assert!(out.captured.is_empty());

        let replay = axum::body::to_bytes(out.body, 1024).await.unwrap();
        assert_eq!(replay, Bytes::from_static(b"ab"));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let out = buffer_body(Body::empty(), 1024).await.unwrap();
        assert!(out.captured.is_empty());
    }
}

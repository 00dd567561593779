//! Capture middleware.
//! Records every exchange passing through the router and hands it to the client.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, MatchedPath, RawPathParams, Request, State},
    middleware::Next,
    response::Response,
};
use futures_util::stream;
use tracing::warn;
use uuid::Uuid;

use crate::client::Client;
use crate::http::body::{buffer_body, Buffered};
use crate::http::context::{ErrorRecorder, MessageId};
use crate::payload::Transaction;

/// Axum middleware capturing request/response metadata.
///
/// Mount with `Router::layer` so the matched route and path parameters are
/// visible here:
///
/// ```ignore
/// let app = Router::new()
///     .route("/users/{id}", get(handler))
///     .layer(axum::middleware::from_fn_with_state(client, capture_middleware));
/// ```
pub async fn capture_middleware(
    State(client): State<Client>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let msg_id = Uuid::new_v4().to_string();
    let limit = client.config().max_body_size;
    let debug = client.config().debug;

    let (mut parts, body) = req.into_parts();

    let route = parts
        .extensions
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());
    let path_params = match RawPathParams::from_request_parts(&mut parts, &()).await {
        Ok(params) => params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        Err(_) => Vec::new(),
    };

    let recorder = ErrorRecorder::new();
    parts.extensions.insert(MessageId(msg_id.clone()));
    parts.extensions.insert(recorder.clone());

    let request_body = match buffer_body(body, limit).await {
        Ok(buffered) => buffered,
        Err(e) => {
            warn!(msg_id = %msg_id, error = %e, "Failed to read request body");
            failed_read(e)
        }
    };

    let method = parts.method.clone();
    let uri = parts.uri.clone();
    let version = parts.version;
    let request_headers = parts.headers.clone();

    let response = next
        .run(Request::from_parts(parts, request_body.body))
        .await;

    let (response_parts, body) = response.into_parts();
    let response_body = match buffer_body(body, limit).await {
        Ok(buffered) => buffered,
        Err(e) => {
            warn!(msg_id = %msg_id, error = %e, "Failed to read response body");
            failed_read(e)
        }
    };

    let tx = Transaction {
        msg_id: msg_id.clone(),
        method,
        uri,
        version,
        route,
        path_params,
        request_headers,
        request_body: request_body.captured,
        status: response_parts.status,
        response_headers: response_parts.headers.clone(),
        response_body: response_body.captured,
        duration: start.elapsed(),
        errors: recorder.entries(),
    };

    let payload = client.build_payload(&tx);
    if debug {
        tracing::info!(
            msg_id = %msg_id,
            status = tx.status.as_u16(),
            bytes = payload.len(),
            "Captured exchange"
        );
    }
    client.publish(payload, &msg_id);

    Response::from_parts(response_parts, response_body.body)
}

// The consumer sees the same read error the stream produced.
fn failed_read(err: axum::Error) -> Buffered {
    Buffered {
        captured: Bytes::new(),
        body: Body::from_stream(stream::once(async move { Err::<Bytes, _>(err) })),
    }
}

/// Convenience for `Body`-typed requests in handlers that only need the id.
pub fn message_id(req: &Request<Body>) -> Option<&MessageId> {
    req.extensions().get::<MessageId>()
}

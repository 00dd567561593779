//! Shared utilities for integration testing.
//!
//! `MockBackend` plays all three remote parties on one ephemeral port: the
//! APIToolkit metadata endpoint, the OAuth token endpoint and the Pub/Sub
//! publish endpoint.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use apitoolkit_axum::client::ClientMetadata;
use apitoolkit_axum::publish::ChannelPublisher;
use apitoolkit_axum::{CaptureConfig, Client};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const API_KEY: &str = "test-api-key";
pub const ACCESS_TOKEN: &str = "test-access-token";
pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account.pem");

/// Client backed by an in-process channel instead of Pub/Sub.
pub fn channel_client(config: CaptureConfig) -> (Client, mpsc::UnboundedReceiver<axum::body::Bytes>) {
    let (publisher, rx) = ChannelPublisher::new();
    let metadata = ClientMetadata {
        project_id: "00000000-0000-0000-0000-000000000000".into(),
        pubsub_project_id: "gcp-project".into(),
        topic_id: "apitoolkit-go-client".into(),
        pubsub_push_service_account: serde_json::Map::new(),
    };
    let client = Client::from_parts(config, metadata, Arc::new(publisher)).unwrap();
    (client, rx)
}

/// One captured record, decoded from the channel.
pub async fn next_record(rx: &mut mpsc::UnboundedReceiver<axum::body::Bytes>) -> Value {
    let payload = rx.recv().await.expect("publisher channel closed");
    serde_json::from_slice(&payload).unwrap()
}

/// Decode a base64 body field of a record.
pub fn decode_body(record: &Value, field: &str) -> String {
    let encoded = record[field].as_str().unwrap();
    String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap()
}

#[derive(Default)]
pub struct MockState {
    pub addr: Mutex<Option<SocketAddr>>,
    pub token_calls: AtomicUsize,
    pub publish_auth: Mutex<Vec<String>>,
    pub published: Mutex<Vec<Value>>,
    pub publish_paths: Mutex<Vec<String>>,
}

/// Running mock of the remote services.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Config pointing both the metadata and the publish endpoint at this mock.
    pub fn config(&self) -> CaptureConfig {
        CaptureConfig::new(API_KEY)
            .with_root_url(self.url())
            .with_pubsub_endpoint(self.url())
    }

    pub fn published(&self) -> Vec<Value> {
        self.state.published.lock().unwrap().clone()
    }
}

/// Start the mock on an ephemeral port.
pub async fn start_mock_backend() -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(MockState::default());
    *state.addr.lock().unwrap() = Some(addr);

    let app = Router::new()
        .route("/api/client_metadata", get(client_metadata))
        .route("/token", post(token))
        .route("/v1/projects/{project}/topics/{*rest}", post(publish))
        .with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, state }
}

async fn client_metadata(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    let expected = format!("Bearer {}", API_KEY);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }

    let addr = state.addr.lock().unwrap().expect("mock address set");
    Json(json!({
        "project_id": "00000000-0000-0000-0000-000000000000",
        "pubsub_project_id": "gcp-project",
        "topic_id": "apitoolkit-go-client",
        "pubsub_push_service_account": {
            "type": "service_account",
            "client_email": "publisher@gcp-project.iam.gserviceaccount.com",
            "private_key_id": "key-1",
            "private_key": TEST_PRIVATE_KEY,
            "token_uri": format!("http://{}/token", addr)
        }
    }))
    .into_response()
}

async fn token(State(state): State<Arc<MockState>>, body: String) -> impl IntoResponse {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    if !body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
        || !body.contains("assertion=")
    {
        return (StatusCode::BAD_REQUEST, "bad grant").into_response();
    }
    Json(json!({
        "access_token": ACCESS_TOKEN,
        "expires_in": 3600,
        "token_type": "Bearer"
    }))
    .into_response()
}

async fn publish(
    State(state): State<Arc<MockState>>,
    Path((project, rest)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.publish_auth.lock().unwrap().push(auth);
    state
        .publish_paths
        .lock()
        .unwrap()
        .push(format!("{}/{}", project, rest));

    let mut ids = Vec::new();
    for message in body["messages"].as_array().cloned().unwrap_or_default() {
        let data = message["data"].as_str().unwrap_or_default();
        let decoded = BASE64.decode(data).unwrap_or_default();
        let record: Value = serde_json::from_slice(&decoded).unwrap_or(Value::Null);
        let mut published = state.published.lock().unwrap();
        published.push(record);
        ids.push(published.len().to_string());
    }

    Json(json!({ "messageIds": ids }))
}

//! Google Cloud Pub/Sub publisher over the REST API.

use axum::body::Bytes;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use crate::publish::auth::ServiceAccountTokenSource;
use crate::publish::types::{PublishError, PublishResult, ServiceAccountKey};
use crate::publish::Publisher;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Publishes payloads to one Pub/Sub topic.
#[derive(Debug)]
pub struct PubSubPublisher {
    http: reqwest::Client,
    publish_url: String,
    topic: String,
    tokens: ServiceAccountTokenSource,
}

impl PubSubPublisher {
    /// Create a publisher for `projects/{project}/topics/{topic}` at `endpoint`.
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        project: &str,
        topic: &str,
        key: ServiceAccountKey,
    ) -> PublishResult<Self> {
        if project.is_empty() || topic.is_empty() {
            return Err(PublishError::Credentials(
                "pubsub project and topic must not be empty".to_string(),
            ));
        }

        let topic_path = format!("projects/{}/topics/{}", project, topic);
        let tokens = ServiceAccountTokenSource::new(http.clone(), key)?;

        Ok(Self {
            http,
            publish_url: format!("{}/v1/{}:publish", endpoint.trim_end_matches('/'), topic_path),
            topic: topic_path,
            tokens,
        })
    }

    /// Fully qualified topic name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    async fn send(&self, payload: Bytes) -> PublishResult<String> {
        let token = self.tokens.token().await?;
        let body = json!({
            "messages": [{ "data": BASE64.encode(&payload) }]
        });

        let response = self
            .http
            .post(&self.publish_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked or rotated server-side; refresh on the next publish.
            self.tokens.invalidate();
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PublishResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Decode(e.to_string()))?;

        parsed
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| PublishError::Decode("response carried no message id".to_string()))
    }
}

impl Publisher for PubSubPublisher {
    fn publish(&self, payload: Bytes) -> BoxFuture<'_, PublishResult<String>> {
        Box::pin(self.send(payload))
    }
}

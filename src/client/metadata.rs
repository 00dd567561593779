//! Client metadata fetch.

use crate::client::types::{ClientMetadata, InitError, InitResult};

/// Path of the metadata endpoint below the root URL.
pub const METADATA_PATH: &str = "/api/client_metadata";

/// Resolve project and publish destination for `api_key`.
///
/// Any non-2xx answer is an initialization failure.
pub async fn fetch_client_metadata(
    http: &reqwest::Client,
    root_url: &str,
    api_key: &str,
) -> InitResult<ClientMetadata> {
    let url = format!("{}{}", root_url.trim_end_matches('/'), METADATA_PATH);

    let response = http.get(&url).bearer_auth(api_key).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(url = %url, status = status.as_u16(), "Client metadata request rejected");
        return Err(InitError::MetadataStatus {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    let metadata: ClientMetadata = serde_json::from_str(&text)?;
    Ok(metadata)
}

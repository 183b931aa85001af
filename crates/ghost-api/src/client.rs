//! HTTP client for the REST collaborator

use async_trait::async_trait;
use ghost_common::ApiConfig;
use ghost_core::{Handle, PortResult, SnapshotSource};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::models::{AuthRequest, OnlineSnapshot, UserProfile};

/// REST collaborator client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL including the `/api` prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> ApiResult<String> {
        if !path.starts_with('/') {
            return Err(ApiError::InvalidUrl(format!("path must start with '/': {path}")));
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    /// Authenticate and obtain the profile carrying the local handle
    pub async fn authenticate(&self, request: &AuthRequest) -> ApiResult<UserProfile> {
        let url = self.url("/auth/telegram")?;
        tracing::debug!(url = %url, "Authenticating");

        let response = self.client.post(&url).json(request).send().await?;
        let profile: UserProfile = Self::decode(response).await?;

        tracing::info!(identity = %profile.anonymous_id, "Authenticated");
        Ok(profile)
    }

    /// Fetch the handles currently online
    pub async fn online(&self) -> ApiResult<OnlineSnapshot> {
        let url = self.url("/online")?;
        let response = self.client.get(&url).send().await?;
        let snapshot: OnlineSnapshot = Self::decode(response).await?;

        tracing::debug!(count = snapshot.online.len(), "Fetched online snapshot");
        Ok(snapshot)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Extract `detail` from an error body, falling back to the raw text
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl SnapshotSource for ApiClient {
    async fn online_snapshot(&self) -> PortResult<Vec<Handle>> {
        let snapshot = self.online().await?;
        Ok(snapshot.handles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_url_building() {
        let client = ApiClient::new(&config("http://localhost:8001/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8001/api");
        assert_eq!(client.url("/online").unwrap(), "http://localhost:8001/api/online");
        assert!(matches!(client.url("online"), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail": "User not found"}"#), "User not found");
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_snapshot_error() {
        // Port 9 (discard) is closed on test machines; the connect fails fast
        let client = ApiClient::new(&config("http://127.0.0.1:9/api")).unwrap();
        let err = client.online_snapshot().await.unwrap_err();
        assert_eq!(err.code(), "SNAPSHOT_UNAVAILABLE");
    }
}

// Feed reader HTTP client.
// Handles the session cookie, base URL joining, and raw request/response plumbing.

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::error::{Result, RillError};

use super::types::RawResponse;

/// Request/response seam between the cache/router and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for a backend path such as `/api/feeds`.
    async fn get(&self, path: &str) -> Result<RawResponse>;

    /// Issue a POST with an optional JSON body.
    async fn post(&self, path: &str, body: Option<serde_json::Value>) -> Result<RawResponse>;
}

/// reqwest-backed transport with a cookie store holding the login session.
pub struct FeedClient {
    client: Client,
    base_url: String,
}

impl FeedClient {
    /// Create a client for the backend at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Result<Self> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RillError::Config(format!(
                "server URL must start with http:// or https://, got {base_url:?}"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("rill-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(RillError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Drain a response into status + body text.
    async fn read(response: Response) -> Result<RawResponse> {
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for FeedClient {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        let response = self.client.get(self.url(path)).send().await?;
        debug!(path, status = %response.status(), "GET");
        Self::read(response).await
    }

    async fn post(&self, path: &str, body: Option<serde_json::Value>) -> Result<RawResponse> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send().await?;
        debug!(path, status = %response.status(), "POST");
        Self::read(response).await
    }
}

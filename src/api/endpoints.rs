// Feed reader API endpoint functions.
// Provides typed methods for the backend's feed, item, read-marking, and login routes.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;

use crate::error::Result;

use super::client::Transport;
use super::types::{Item, RawResponse, Reply};

pub const FEEDS_PATH: &str = "/api/feeds";
pub const LOGIN_PATH: &str = "/login";

/// Request body for marking a whole feed as read.
#[derive(Debug, Serialize)]
struct ReadRequest {
    before: i64,
}

/// Request body for exchanging a login token for a session.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    token: &'a str,
}

pub fn feed_path(feed_uid: &str) -> String {
    format!("{}/{}", FEEDS_PATH, feed_uid)
}

pub fn item_path(feed_uid: &str, item_uid: &str) -> String {
    format!("{}/{}/items/{}", FEEDS_PATH, feed_uid, item_uid)
}

pub fn feed_read_path(feed_uid: &str) -> String {
    format!("{}/{}/read", FEEDS_PATH, feed_uid)
}

pub fn item_read_path(feed_uid: &str, item_uid: &str) -> String {
    format!("{}/{}/items/{}/read", FEEDS_PATH, feed_uid, item_uid)
}

/// Typed backend calls over a shared transport.
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Raw GET, for callers that classify or cache the response themselves.
    pub async fn get_raw(&self, path: &str) -> Result<RawResponse> {
        self.transport.get(path).await
    }

    /// Get a single item.
    pub async fn get_item(&self, feed_uid: &str, item_uid: &str) -> Result<Reply<Item>> {
        let raw = self.transport.get(&item_path(feed_uid, item_uid)).await?;
        Reply::from_raw(raw)
    }

    /// Mark every item of a feed published before `before` as read.
    pub async fn mark_feed_read(&self, feed_uid: &str, before: i64) -> Result<StatusCode> {
        let body = serde_json::to_value(ReadRequest { before })?;
        let raw = self
            .transport
            .post(&feed_read_path(feed_uid), Some(body))
            .await?;
        Ok(raw.status)
    }

    /// Mark one item as read.
    pub async fn mark_item_read(&self, feed_uid: &str, item_uid: &str) -> Result<StatusCode> {
        let raw = self
            .transport
            .post(&item_read_path(feed_uid, item_uid), None)
            .await?;
        Ok(raw.status)
    }

    /// Exchange an opaque login token for a session cookie.
    pub async fn login(&self, token: &str) -> Result<StatusCode> {
        let body = serde_json::to_value(LoginRequest { token })?;
        let raw = self.transport.post(LOGIN_PATH, Some(body)).await?;
        Ok(raw.status)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::ScriptedTransport;

    #[test]
    fn test_paths() {
        assert_eq!(feed_path("all"), "/api/feeds/all");
        assert_eq!(item_path("f1", "i2"), "/api/feeds/f1/items/i2");
        assert_eq!(feed_read_path("42"), "/api/feeds/42/read");
        assert_eq!(item_read_path("f1", "i2"), "/api/feeds/f1/items/i2/read");
    }

    #[tokio::test]
    async fn test_mark_feed_read_sends_cutoff() {
        let transport = ScriptedTransport::new();
        transport.on_post("/api/feeds/42/read", 200);
        let api = Api::new(transport.clone());

        let status = api.mark_feed_read("42", 1_700_000_000).await.unwrap();

        assert_eq!(status, StatusCode::OK);
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Some(json!({"before": 1_700_000_000})));
    }

    #[tokio::test]
    async fn test_login_posts_token() {
        let transport = ScriptedTransport::new();
        transport.on_post(LOGIN_PATH, 401);
        let api = Api::new(transport.clone());

        let status = api.login("abc123").await.unwrap();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(transport.calls()[0].body, Some(json!({"token": "abc123"})));
    }
}

// Feed reader API types.
// Structs for backend payloads plus the raw/classified response wrappers.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Result, RillError};

/// Pseudo feed identifier aggregating the items of every feed.
pub const ALL_FEEDS: &str = "all";

/// A feed summary, optionally carrying its items.
///
/// List responses omit `items`; every field falls back to its default when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feed {
    pub uid: String,
    pub name: String,
    pub url: String,
    pub items: Vec<Item>,
    /// When the backend last fetched the feed (epoch seconds).
    pub last_updated: i64,
    /// Timestamp of the newest item (epoch seconds), 0 when unknown.
    pub last_item: i64,
    pub last_error: String,
    pub item_count: u64,
    pub read_count: u64,
}

impl Feed {
    pub fn unread_count(&self) -> u64 {
        self.item_count.saturating_sub(self.read_count)
    }

    pub fn is_aggregate(&self) -> bool {
        self.uid == ALL_FEEDS
    }
}

/// A single feed item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub uid: String,
    pub feed_uid: String,
    pub feed_name: String,
    pub title: String,
    pub authors: String,
    /// Publication time (epoch seconds).
    pub timestamp: i64,
    pub content: String,
    pub url: String,
    pub read: bool,
}

/// Error body returned by the backend for non-200 responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub code: String,
    pub name: String,
    pub message: String,
}

/// Status and body of a backend response, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Message field of an error body; empty when the body is not a backend error.
    pub fn error_message(&self) -> String {
        serde_json::from_str::<ErrorBody>(&self.body)
            .map(|body| body.message)
            .unwrap_or_default()
    }
}

/// A backend response: the decoded payload on 200, the status and message otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success(T),
    Failure { status: StatusCode, message: String },
}

impl<T: DeserializeOwned> Reply<T> {
    /// Decode a raw response. Only the 200 body must parse as `T`.
    pub fn from_raw(raw: RawResponse) -> Result<Self> {
        if raw.status == StatusCode::OK {
            return Ok(Reply::Success(raw.json()?));
        }
        Ok(Reply::Failure {
            message: raw.error_message(),
            status: raw.status,
        })
    }
}

impl<T> Reply<T> {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Success(_) => StatusCode::OK,
            Reply::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Success(value) => Reply::Success(f(value)),
            Reply::Failure { status, message } => Reply::Failure { status, message },
        }
    }

    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<Reply<U>> {
        Ok(match self {
            Reply::Success(value) => Reply::Success(f(value)?),
            Reply::Failure { status, message } => Reply::Failure { status, message },
        })
    }

    /// Convert the reply into the payload or the error that a view should show.
    ///
    /// `missing` names the resource for 404 handling; routes without a
    /// meaningful not-found state pass `None` and get a generic status error.
    pub fn classify(self, missing: Option<&'static str>) -> Result<T> {
        match self {
            Reply::Success(value) => Ok(value),
            Reply::Failure { status, message } => Err(match (status, missing) {
                (StatusCode::UNAUTHORIZED, _) => RillError::Unauthorized,
                (StatusCode::NOT_FOUND, Some(what)) => RillError::NotFound(what),
                (StatusCode::INTERNAL_SERVER_ERROR, _) => RillError::Server(message),
                (other, _) => RillError::UnexpectedStatus(other.as_u16()),
            }),
        }
    }
}

// Cache entries and the payloads they hold.
// Handles TTL checks and item access for read-state propagation.

use chrono::{DateTime, TimeDelta, Utc};

use crate::api::{Feed, Item};
use crate::error::{Result, RillError};

/// A cached backend resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `/api/feeds`: feed summaries without items.
    FeedList(Vec<Feed>),
    /// `/api/feeds/{uid}`: one feed (or the `all` aggregate) with its items.
    Feed(Feed),
}

impl Payload {
    /// Every item reachable from this payload.
    pub fn items_mut(&mut self) -> Vec<&mut Item> {
        match self {
            Payload::Feed(feed) => feed.items.iter_mut().collect(),
            Payload::FeedList(feeds) => feeds.iter_mut().flat_map(|f| f.items.iter_mut()).collect(),
        }
    }

    pub fn as_feed(&self) -> Option<&Feed> {
        match self {
            Payload::Feed(feed) => Some(feed),
            Payload::FeedList(_) => None,
        }
    }

    pub fn into_feed(self) -> Result<Feed> {
        match self {
            Payload::Feed(feed) => Ok(feed),
            Payload::FeedList(_) => Err(RillError::Other(
                "cached payload is a feed list, expected a feed".to_string(),
            )),
        }
    }

    pub fn into_feed_list(self) -> Result<Vec<Feed>> {
        match self {
            Payload::FeedList(feeds) => Ok(feeds),
            Payload::Feed(_) => Err(RillError::Other(
                "cached payload is a feed, expected a feed list".to_string(),
            )),
        }
    }
}

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Payload,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// Write generation; a fetch started before this value may not overwrite the entry.
    pub generation: u64,
}

impl CacheEntry {
    pub fn new(key: String, payload: Payload, created_at: DateTime<Utc>, generation: u64) -> Self {
        Self {
            key,
            payload,
            created_at,
            generation,
        }
    }

    /// An entry is expired once its age reaches the TTL.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.created_at) >= ttl
    }
}

// Feed health overview.
// Classifies each feed by fetch errors and staleness for the status view.

use crate::api::Feed;

/// Feeds without a new item in this long are stale.
const STALE_AFTER_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// The last fetch failed.
    Red,
    /// Empty, never produced an item, or stale.
    Yellow,
    Green,
}

impl Health {
    pub fn of(feed: &Feed, now: i64) -> Self {
        if !feed.last_error.trim().is_empty() {
            Health::Red
        } else if feed.last_item == 0
            || feed.item_count == 0
            || now - feed.last_item > STALE_AFTER_SECS
        {
            Health::Yellow
        } else {
            Health::Green
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Health::Red => "●",
            Health::Yellow => "◐",
            Health::Green => "○",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Health::Red => "error",
            Health::Yellow => "stale",
            Health::Green => "ok",
        }
    }
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedHealth {
    pub feed: Feed,
    pub health: Health,
}

/// Health rows for every real feed; the `all` aggregate is skipped.
pub fn summarize(feeds: Vec<Feed>, now: i64) -> Vec<FeedHealth> {
    feeds
        .into_iter()
        .filter(|feed| !feed.is_aggregate())
        .map(|feed| FeedHealth {
            health: Health::of(&feed, now),
            feed,
        })
        .collect()
}

// In-memory feed cache fronting the backend.
// Handles TTL lookups, write-through fetches, and optimistic read-state propagation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::TimeDelta;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::api::{ALL_FEEDS, Api, Feed, Item, Reply, endpoints};
use crate::clock::Clock;
use crate::error::Result;

use super::entry::{CacheEntry, Payload};
use super::lock::mutex_lock;

/// Cache key of the feed list.
pub const FEED_LIST_KEY: &str = "feeds";

/// A cacheable backend resource: its cache key and request path travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    FeedList,
    Feed(String),
}

impl Resource {
    pub fn key(&self) -> &str {
        match self {
            Resource::FeedList => FEED_LIST_KEY,
            Resource::Feed(uid) => uid,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Resource::FeedList => endpoints::FEEDS_PATH.to_string(),
            Resource::Feed(uid) => endpoints::feed_path(uid),
        }
    }

    fn decode(&self, raw: crate::api::RawResponse) -> Result<Reply<Payload>> {
        Ok(match self {
            Resource::FeedList => Reply::<Vec<Feed>>::from_raw(raw)?.map(Payload::FeedList),
            Resource::Feed(_) => Reply::<Feed>::from_raw(raw)?.map(Payload::Feed),
        })
    }
}

/// Granularity of a read-marking operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadScope {
    /// Everything; same as `Feed("all")`.
    List,
    Feed(String),
    Item { feed: String, item: String },
}

impl ReadScope {
    /// Feed the backend mutation is addressed to.
    pub fn feed_uid(&self) -> &str {
        match self {
            ReadScope::List => ALL_FEEDS,
            ReadScope::Feed(uid) => uid,
            ReadScope::Item { feed, .. } => feed,
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ReadScope::List => true,
            ReadScope::Feed(uid) => uid == ALL_FEEDS || item.feed_uid == *uid,
            ReadScope::Item { item: uid, .. } => item.uid == *uid,
        }
    }
}

/// Process-wide store of fetched feeds, keyed by resource.
pub struct FeedCache {
    api: Api,
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    generation: AtomicU64,
}

impl FeedCache {
    pub fn new(api: Api, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
            generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Look up a live entry. Expired entries are removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<Payload> {
        let now = self.clock.now();
        let mut entries = mutex_lock(&self.entries, "get");
        let expired = entries.get(key)?.is_expired(now, self.ttl);
        if expired {
            entries.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }
        entries.get(key).map(|entry| entry.payload.clone())
    }

    /// Overwrite an entry unconditionally.
    pub fn put(&self, key: &str, payload: Payload) {
        let generation = self.next_generation();
        let entry = CacheEntry::new(key.to_string(), payload, self.clock.now(), generation);
        mutex_lock(&self.entries, "put").insert(key.to_string(), entry);
    }

    /// Write the result of a fetch that took `ticket` before going to the network.
    /// Rejected when the entry changed after the ticket was issued.
    fn put_if_current(&self, key: &str, payload: Payload, ticket: u64) -> bool {
        let mut entries = mutex_lock(&self.entries, "put_if_current");
        if let Some(current) = entries.get(key) {
            if current.generation > ticket {
                debug!(
                    key,
                    ticket,
                    current = current.generation,
                    "discarding stale fetch result"
                );
                return false;
            }
        }
        let entry = CacheEntry::new(key.to_string(), payload, self.clock.now(), ticket);
        entries.insert(key.to_string(), entry);
        true
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serve from cache when allowed and live, otherwise fetch and write through on 200.
    pub async fn fetch_with_cache(
        &self,
        resource: &Resource,
        allow_cache: bool,
    ) -> Result<Reply<Payload>> {
        let key = resource.key();
        if allow_cache {
            if let Some(payload) = self.get(key) {
                debug!(key, "cache hit");
                return Ok(Reply::Success(payload));
            }
        }

        let ticket = self.next_generation();
        let raw = self.api.get_raw(&resource.path()).await?;
        let reply = resource.decode(raw)?;
        match &reply {
            Reply::Success(payload) => {
                self.put_if_current(key, payload.clone(), ticket);
            }
            Reply::Failure { status, .. } => debug!(key, %status, "not caching failed fetch"),
        }
        Ok(reply)
    }

    /// Fetch the feed list. The list is never served from cache.
    pub async fn fetch_feeds(&self) -> Result<Reply<Vec<Feed>>> {
        self.fetch_with_cache(&Resource::FeedList, false)
            .await?
            .try_map(Payload::into_feed_list)
    }

    pub async fn fetch_feed(&self, uid: &str, use_cache: bool) -> Result<Reply<Feed>> {
        self.fetch_with_cache(&Resource::Feed(uid.to_string()), use_cache)
            .await?
            .try_map(Payload::into_feed)
    }

    /// Mark items as read on the backend, then mirror the change into every cached copy.
    ///
    /// Returns `false` without touching the cache unless the backend answers 200.
    pub async fn mark_as_read(&self, scope: ReadScope) -> bool {
        let result = match &scope {
            ReadScope::Item { feed, item } => self.api.mark_item_read(feed, item).await,
            ReadScope::List | ReadScope::Feed(_) => {
                let uid = scope.feed_uid();
                let before = self.cutoff_for(uid);
                self.api.mark_feed_read(uid, before).await
            }
        };

        match result {
            Ok(StatusCode::OK) => {}
            Ok(status) => {
                warn!(?scope, %status, "backend rejected mark as read");
                return false;
            }
            Err(err) => {
                warn!(?scope, error = %err, "mark as read failed");
                return false;
            }
        }

        let flipped = self.propagate_read(&scope);
        debug!(?scope, flipped, "marked as read");
        true
    }

    /// Items older than the feed's last refresh are the ones the user has seen.
    fn cutoff_for(&self, feed_uid: &str) -> i64 {
        self.get(feed_uid)
            .and_then(|payload| payload.as_feed().map(|feed| feed.last_updated))
            .filter(|ts| *ts > 0)
            .unwrap_or_else(|| self.clock.timestamp())
    }

    /// Flip matching items in every live entry; bump each owning feed's read count
    /// once per item whose copy in the owner's own entry was unread. Returns the
    /// number of distinct items flipped.
    fn propagate_read(&self, scope: &ReadScope) -> usize {
        let now = self.clock.now();
        let mut entries = mutex_lock(&self.entries, "propagate_read");
        // Flips inside the owning feed's entry, and flips seen only in other entries
        let mut owned: HashSet<(String, String)> = HashSet::new();
        let mut elsewhere: HashSet<(String, String)> = HashSet::new();

        for (key, entry) in entries.iter_mut() {
            if entry.is_expired(now, self.ttl) {
                continue;
            }
            let mut touched = false;
            for item in entry.payload.items_mut() {
                if !item.read && scope.matches(item) {
                    item.read = true;
                    touched = true;
                    let id = (item.feed_uid.clone(), item.uid.clone());
                    if item.feed_uid == *key {
                        owned.insert(id);
                    } else {
                        elsewhere.insert(id);
                    }
                }
            }
            if touched {
                entry.generation = self.next_generation();
            }
        }

        for (feed_uid, uid) in owned.iter().chain(elsewhere.difference(&owned)) {
            let Some(entry) = entries.get_mut(feed_uid) else {
                continue;
            };
            if entry.is_expired(now, self.ttl) {
                continue;
            }
            if let Payload::Feed(feed) = &mut entry.payload {
                // The owner already held this item as read, so it was already counted
                if !owned.contains(&(feed_uid.clone(), uid.clone()))
                    && feed.items.iter().any(|item| item.uid == *uid)
                {
                    continue;
                }
                feed.read_count += 1;
                entry.generation = self.next_generation();
            }
        }

        owned.union(&elsewhere).count()
    }
}

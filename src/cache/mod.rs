// Cache module for fetched feed data.
// Keeps backend responses in memory with TTL expiry and read-state propagation.

mod entry;
mod lock;
mod store;

pub use entry::{CacheEntry, Payload};
pub use store::{FEED_LIST_KEY, FeedCache, ReadScope, Resource};

/// Default TTL for cached feeds: 1 hour.
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;

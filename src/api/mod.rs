// Feed reader API module.
// Provides the transport, typed endpoints, and payload types for the backend.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{FeedClient, Transport};
pub use endpoints::Api;
pub use types::*;

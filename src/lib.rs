// rill: terminal client for a self-hosted feed reader.
// Fetches feeds and items, caches them with a TTL, and tracks read state.

pub mod api;
pub mod app;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod paths;
pub mod state;
pub mod telemetry;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{Result, RillError};

// Runtime configuration.
// Loads settings from RILL_* environment variables with defaults for a local backend.

use std::env;
use std::path::PathBuf;

use chrono::TimeDelta;

use crate::cache::DEFAULT_TTL_SECS;
use crate::paths;

/// Client configuration.
///
/// Unset or unparsable variables fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL
    pub server: String,
    /// Cache entry lifetime in seconds
    pub cache_ttl: u64,
    /// Location shown at startup, e.g. `/feeds` or `#token:...`
    pub start: String,
    /// Drop renders from refreshes overtaken by a newer one
    pub drop_superseded: bool,
    /// Reload without cache on a keypress once the view is older than the TTL
    pub auto_refresh: bool,
    /// Log file override
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load from the process environment.
    ///
    /// # Environment Variables
    /// - `RILL_SERVER` - backend URL (default: `http://localhost:8080`)
    /// - `RILL_CACHE_TTL` - cache TTL in seconds (default: 3600)
    /// - `RILL_START` - initial location (default: `/feeds`)
    /// - `RILL_DROP_SUPERSEDED` - drop stale renders (default: false)
    /// - `RILL_AUTO_REFRESH` - reload stale views on keypress (default: true)
    /// - `RILL_LOG_FILE` - log file path (default: `rill.log` in the cache dir)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let flag = |key: &str, default: bool| text(key).and_then(|v| parse_bool(&v)).unwrap_or(default);

        Self {
            server: text("RILL_SERVER").unwrap_or(defaults.server),
            cache_ttl: text("RILL_CACHE_TTL")
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.cache_ttl),
            start: text("RILL_START").unwrap_or(defaults.start),
            drop_superseded: flag("RILL_DROP_SUPERSEDED", defaults.drop_superseded),
            auto_refresh: flag("RILL_AUTO_REFRESH", defaults.auto_refresh),
            log_file: text("RILL_LOG_FILE").map(PathBuf::from),
        }
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(i64::try_from(self.cache_ttl).unwrap_or(i64::MAX / 1_000))
    }

    /// Where logs go: the override, else the platform cache dir.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(paths::log_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "http://localhost:8080".to_string(),
            cache_ttl: DEFAULT_TTL_SECS,
            start: "/feeds".to_string(),
            drop_superseded: false,
            auto_refresh: true,
            log_file: None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server, "http://localhost:8080");
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.start, "/feeds");
        assert!(!config.drop_superseded);
        assert!(config.auto_refresh);
        assert_eq!(config.cache_ttl(), TimeDelta::hours(1));
    }

    #[test]
    fn test_config_empty_lookup_is_default() {
        assert_eq!(config_with(&[]), Config::default());
    }

    #[test]
    fn test_config_overrides() {
        let config = config_with(&[
            ("RILL_SERVER", "https://reader.example.com"),
            ("RILL_CACHE_TTL", "60"),
            ("RILL_START", "#token:abc"),
            ("RILL_DROP_SUPERSEDED", "yes"),
            ("RILL_AUTO_REFRESH", "off"),
            ("RILL_LOG_FILE", "/tmp/rill-test.log"),
        ]);

        assert_eq!(config.server, "https://reader.example.com");
        assert_eq!(config.cache_ttl(), TimeDelta::seconds(60));
        assert_eq!(config.start, "#token:abc");
        assert!(config.drop_superseded);
        assert!(!config.auto_refresh);
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/rill-test.log")));
    }

    #[test]
    fn test_config_invalid_values_fall_back() {
        let config = config_with(&[
            ("RILL_CACHE_TTL", "soon"),
            ("RILL_DROP_SUPERSEDED", "maybe"),
            ("RILL_SERVER", "   "),
        ]);
        assert_eq!(config.cache_ttl, 3600);
        assert!(!config.drop_superseded);
        assert_eq!(config.server, "http://localhost:8080");

        assert_eq!(config_with(&[("RILL_CACHE_TTL", "0")]).cache_ttl, 3600);
    }
}

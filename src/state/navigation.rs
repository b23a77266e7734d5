// Navigation state management.
// Parses locations into routes and keeps the history stack for back navigation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::ReadScope;

/// Where a successful login lands.
pub const HOME_PATH: &str = "/feeds/all";

/// Fragment prefix carrying an opaque login token.
pub const TOKEN_PREFIX: &str = "token:";

/// A location: a path plus an optional `#fragment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub fragment: Option<String>,
}

impl Location {
    /// Split `"/feeds#token:abc"` into path and fragment. An empty fragment counts as none.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (path, fragment) = match raw.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (raw, None),
        };
        Self {
            path: path.to_string(),
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fragment: None,
        }
    }

    pub fn state(&self) -> NavigationState {
        NavigationState::from_location(self)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fragment {
            Some(fragment) => write!(f, "{}#{}", self.path, fragment),
            None => write!(f, "{}", self.path),
        }
    }
}

/// The navigational state derived from a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub is_login: bool,
    pub token: Option<String>,
    pub segments: Vec<String>,
}

impl NavigationState {
    /// A non-empty fragment wins over the path.
    pub fn from_location(location: &Location) -> Self {
        let source = location.fragment.as_deref().unwrap_or(&location.path);

        // The login marker is only recognised in the fragment
        let token = location
            .fragment
            .as_deref()
            .and_then(|fragment| fragment.strip_prefix(TOKEN_PREFIX));
        if let Some(token) = token {
            return Self {
                is_login: true,
                token: Some(token.to_string()),
                segments: Vec::new(),
            };
        }

        let segments = source
            .strip_prefix('/')
            .unwrap_or(source)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            is_login: false,
            token: None,
            segments,
        }
    }

    pub fn route(&self) -> Route {
        if self.is_login {
            return Route::LoginPending {
                token: self.token.clone().unwrap_or_default(),
            };
        }

        let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        match segments.as_slice() {
            ["feeds"] => Route::FeedList,
            #[cfg(feature = "status-dashboard")]
            ["feeds", "status"] => Route::StatusDashboard,
            ["feeds", feed] => Route::FeedDetail {
                feed: feed.to_string(),
            },
            ["feeds", feed, "items", item] => Route::ItemDetail {
                feed: feed.to_string(),
                item: item.to_string(),
            },
            _ => Route::Unroutable,
        }
    }

    /// What "mark all as read" covers from here, if anything.
    pub fn read_scope(&self) -> Option<ReadScope> {
        if self.is_login {
            return None;
        }
        match self.segments.as_slice() {
            [feeds] if feeds == "feeds" => Some(ReadScope::List),
            [feeds, feed] if feeds == "feeds" => Some(ReadScope::Feed(feed.clone())),
            _ => None,
        }
    }
}

/// The view a navigational state resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    LoginPending { token: String },
    FeedList,
    FeedDetail { feed: String },
    #[cfg(feature = "status-dashboard")]
    StatusDashboard,
    ItemDetail { feed: String, item: String },
    Unroutable,
}

impl Route {
    pub fn title(&self) -> String {
        match self {
            Route::LoginPending { .. } => "Login".to_string(),
            Route::FeedList => "Feeds".to_string(),
            Route::FeedDetail { feed } => format!("Feed {}", feed),
            #[cfg(feature = "status-dashboard")]
            Route::StatusDashboard => "Status".to_string(),
            Route::ItemDetail { item, .. } => format!("Item {}", item),
            Route::Unroutable => "Rill".to_string(),
        }
    }
}

/// Visited locations (bottom = first, top = current).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    stack: Vec<Location>,
}

impl History {
    pub fn new(start: Location) -> Self {
        Self { stack: vec![start] }
    }

    /// The location being shown. The stack always holds at least one entry.
    pub fn current(&self) -> &Location {
        &self.stack[self.stack.len() - 1]
    }

    /// Follow a link.
    pub fn push(&mut self, location: Location) {
        self.stack.push(location);
    }

    /// Swap the current entry without growing the stack.
    pub fn replace(&mut self, location: Location) {
        let last = self.stack.len() - 1;
        self.stack[last] = location;
    }

    /// Go back. Returns false if at the first entry.
    pub fn back(&mut self) -> bool {
        if self.can_go_back() {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Location::path("/feeds"))
    }
}

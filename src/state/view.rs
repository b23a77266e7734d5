// View content and the rendering seam.
// The router produces these values; the terminal front end draws them.

use chrono::{DateTime, Utc};

use crate::api::{Feed, Item};

#[cfg(feature = "status-dashboard")]
use super::dashboard::FeedHealth;

/// Content that replaces whatever is on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    FeedList {
        feeds: Vec<Feed>,
        /// Show an entry point to the status dashboard.
        status_link: bool,
    },
    Feed(Feed),
    Item(Item),
    #[cfg(feature = "status-dashboard")]
    Dashboard(Vec<FeedHealth>),
    Error(String),
}

/// A navigable target inside a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub location: String,
}

impl Link {
    fn new(label: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            location: location.into(),
        }
    }
}

impl View {
    /// Selectable rows, in display order.
    pub fn links(&self) -> Vec<Link> {
        match self {
            View::FeedList { feeds, status_link } => {
                let mut links: Vec<Link> = feeds
                    .iter()
                    .map(|feed| Link::new(&feed.name, format!("/feeds/{}", feed.uid)))
                    .collect();
                if *status_link {
                    links.push(Link::new("Status", "/feeds/status"));
                }
                links
            }
            View::Feed(feed) => feed
                .items
                .iter()
                .map(|item| {
                    let owner = if item.feed_uid.is_empty() {
                        &feed.uid
                    } else {
                        &item.feed_uid
                    };
                    Link::new(&item.title, format!("/feeds/{}/items/{}", owner, item.uid))
                })
                .collect(),
            #[cfg(feature = "status-dashboard")]
            View::Dashboard(rows) => rows
                .iter()
                .map(|row| Link::new(&row.feed.name, format!("/feeds/{}", row.feed.uid)))
                .collect(),
            View::Loading | View::Item(_) | View::Error(_) => Vec::new(),
        }
    }
}

/// Breadcrumb trail shown above the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Breadcrumbs {
    /// `Feeds`
    Root,
    /// `Feeds > {name}`
    Feed { uid: String, name: String },
}

impl Breadcrumbs {
    pub fn trail(&self) -> Vec<Link> {
        let root = Link::new("Feeds", "/feeds");
        match self {
            Breadcrumbs::Root => vec![root],
            Breadcrumbs::Feed { uid, name } => {
                vec![root, Link::new(name, format!("/feeds/{}", uid))]
            }
        }
    }
}

/// Visibility of the navigation controls around the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub breadcrumbs: Option<Breadcrumbs>,
    /// "Mark all as read" is offered.
    pub read_button: bool,
    /// "Open" is offered, pointing at this URL.
    pub open_button: Option<String>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_breadcrumbs(mut self, breadcrumbs: Breadcrumbs) -> Self {
        self.breadcrumbs = Some(breadcrumbs);
        self
    }

    pub fn with_read_button(mut self) -> Self {
        self.read_button = true;
        self
    }

    pub fn with_open_button(mut self, url: impl Into<String>) -> Self {
        self.open_button = Some(url.into());
        self
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
}

/// A transient message shown in the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warn,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Output side of the router.
pub trait Renderer: Send + Sync {
    /// Show a loading indicator in place of the content.
    fn set_loading(&self) {
        self.set_content(View::Loading);
    }

    /// Replace the content wholesale.
    fn set_content(&self, view: View);

    /// Show the given controls, or hide them all with `None`.
    fn reset_controls(&self, controls: Option<Controls>);

    fn notify(&self, notice: Notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{feed, feed_with_items, item};

    #[test]
    fn test_feed_list_links() {
        let view = View::FeedList {
            feeds: vec![feed("all", "All"), feed("f1", "Blog")],
            status_link: true,
        };
        let links = view.links();

        assert_eq!(links.len(), 3);
        assert_eq!(links[1], Link::new("Blog", "/feeds/f1"));
        assert_eq!(links[2].location, "/feeds/status");
    }

    #[test]
    fn test_aggregate_items_link_to_their_own_feed() {
        let mut orphan = item("", "i2");
        orphan.title = "Orphan".to_string();
        let view = View::Feed(feed_with_items("all", 0, vec![item("f1", "i1"), orphan]));
        let links = view.links();

        assert_eq!(links[0].location, "/feeds/f1/items/i1");
        assert_eq!(links[1].location, "/feeds/all/items/i2");
    }

    #[test]
    fn test_breadcrumb_trail() {
        let trail = Breadcrumbs::Feed {
            uid: "f1".to_string(),
            name: "Blog".to_string(),
        }
        .trail();

        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].label, "Feeds");
        assert_eq!(trail[1].location, "/feeds/f1");
        assert_eq!(Breadcrumbs::Root.trail().len(), 1);
    }

    #[test]
    fn test_controls_builder() {
        let controls = Controls::new()
            .with_breadcrumbs(Breadcrumbs::Root)
            .with_read_button();
        assert!(controls.read_button);
        assert_eq!(controls.open_button, None);
    }
}

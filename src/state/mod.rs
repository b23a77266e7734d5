// State management module.
// Handles navigation, routing, and the view values handed to the renderer.

#[cfg(feature = "status-dashboard")]
pub mod dashboard;
pub mod navigation;
pub mod router;
pub mod view;

#[cfg(feature = "status-dashboard")]
pub use dashboard::{FeedHealth, Health};
pub use navigation::{HOME_PATH, History, Location, NavigationState, Route, TOKEN_PREFIX};
pub use router::{RefreshOutcome, Router};
pub use view::{Breadcrumbs, Controls, Link, Notice, NoticeLevel, Renderer, View};

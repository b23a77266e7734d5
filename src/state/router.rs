// Location-driven view router.
// Resolves the current location to a view, fetches through the cache or directly,
// classifies the response, and hands the result to the renderer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::StatusCode;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::Api;
use crate::cache::{FeedCache, ReadScope};
use crate::clock::Clock;
use crate::error::RillError;

use super::navigation::{HOME_PATH, History, Location, Route};
use super::view::{Breadcrumbs, Controls, Notice, Renderer, View};

/// What a refresh did.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub route: Route,
    /// The route's content (not an error) reached the renderer.
    pub rendered: bool,
    /// Background mark-as-read started by an item view.
    pub background: Option<JoinHandle<bool>>,
}

impl RefreshOutcome {
    fn new(route: Route, rendered: bool) -> Self {
        Self {
            route,
            rendered,
            background: None,
        }
    }
}

pub struct Router {
    api: Api,
    cache: Arc<FeedCache>,
    renderer: Arc<dyn Renderer>,
    #[cfg_attr(not(feature = "status-dashboard"), allow(dead_code))]
    clock: Arc<dyn Clock>,
    history: Mutex<History>,
    /// Bumped by every refresh; renders from older refreshes may be dropped.
    epoch: AtomicU64,
    drop_superseded: bool,
}

impl Router {
    pub fn new(
        api: Api,
        cache: Arc<FeedCache>,
        renderer: Arc<dyn Renderer>,
        clock: Arc<dyn Clock>,
        start: Location,
    ) -> Self {
        Self {
            api,
            cache,
            renderer,
            clock,
            history: Mutex::new(History::new(start)),
            epoch: AtomicU64::new(0),
            drop_superseded: false,
        }
    }

    /// Discard renders from refreshes that a newer refresh has overtaken.
    pub fn with_drop_superseded(mut self, drop_superseded: bool) -> Self {
        self.drop_superseded = drop_superseded;
        self
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> Location {
        self.history().current().clone()
    }

    pub fn can_go_back(&self) -> bool {
        self.history().can_go_back()
    }

    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Follow a link: push it and render it, trusting the cache.
    pub async fn navigate(&self, location: Location) -> RefreshOutcome {
        info!(%location, "navigate");
        self.history().push(location);
        self.refresh(true).await
    }

    /// Return to the previous location, trusting the cache. `None` at the first entry.
    pub async fn back(&self) -> Option<RefreshOutcome> {
        if !self.history().back() {
            return None;
        }
        Some(self.refresh(true).await)
    }

    /// Render the current location again without the cache.
    pub async fn reload(&self) -> RefreshOutcome {
        self.refresh(false).await
    }

    fn begin(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, epoch: u64) -> bool {
        !self.drop_superseded || self.epoch.load(Ordering::SeqCst) == epoch
    }

    pub async fn refresh(&self, use_cache: bool) -> RefreshOutcome {
        let epoch = self.begin();
        let mut use_cache = use_cache;

        loop {
            let location = self.current();
            let route = location.state().route();
            debug!(%location, ?route, use_cache, epoch, "refresh");

            let rendered = match &route {
                Route::LoginPending { token } => {
                    if self.login(epoch, token).await {
                        use_cache = false;
                        continue;
                    }
                    false
                }
                Route::FeedList => self.show_feeds(epoch).await,
                Route::FeedDetail { feed } => self.show_feed(epoch, feed, use_cache).await,
                #[cfg(feature = "status-dashboard")]
                Route::StatusDashboard => self.show_status(epoch).await,
                Route::ItemDetail { feed, item } => {
                    let (rendered, background) = self.show_item(epoch, feed, item).await;
                    return RefreshOutcome {
                        route,
                        rendered,
                        background,
                    };
                }
                Route::Unroutable => self.render_error(epoch, RillError::Unauthorized.to_string()),
            };
            return RefreshOutcome::new(route, rendered);
        }
    }

    /// Exchange the token for a session. On success the login location is replaced by home.
    async fn login(&self, epoch: u64, token: &str) -> bool {
        match self.api.login(token).await {
            Ok(StatusCode::OK) => {
                info!("login succeeded");
                self.history().replace(Location::path(HOME_PATH));
                true
            }
            Ok(status) => {
                warn!(%status, "login rejected");
                self.render_error(epoch, RillError::Unauthorized.to_string())
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.render_error(epoch, format!("Unexpected error logging in: {err}"))
            }
        }
    }

    async fn show_feeds(&self, epoch: u64) -> bool {
        self.reset_controls(epoch, Some(Self::list_controls()));
        self.loading(epoch);

        let feeds = match self.cache.fetch_feeds().await {
            Ok(reply) => reply.classify(None),
            Err(err) => {
                return self.render_error(epoch, format!("Unexpected error fetching feed list: {err}"));
            }
        };
        match feeds {
            Ok(feeds) => self.render(
                epoch,
                View::FeedList {
                    feeds,
                    status_link: cfg!(feature = "status-dashboard"),
                },
                Self::list_controls(),
            ),
            Err(err) => self.render_error(epoch, err.to_string()),
        }
    }

    async fn show_feed(&self, epoch: u64, uid: &str, use_cache: bool) -> bool {
        self.reset_controls(epoch, Some(Self::list_controls()));
        self.loading(epoch);

        let feed = match self.cache.fetch_feed(uid, use_cache).await {
            Ok(reply) => reply.classify(Some("Feed")),
            Err(err) => return self.render_error(epoch, format!("Unexpected error fetching feed: {err}")),
        };
        match feed {
            Ok(feed) => {
                let controls = Controls::new()
                    .with_breadcrumbs(Breadcrumbs::Feed {
                        uid: feed.uid.clone(),
                        name: feed.name.clone(),
                    })
                    .with_read_button();
                self.render(epoch, View::Feed(feed), controls)
            }
            Err(err) => self.render_error(epoch, err.to_string()),
        }
    }

    #[cfg(feature = "status-dashboard")]
    async fn show_status(&self, epoch: u64) -> bool {
        use super::dashboard;

        self.loading(epoch);
        let feeds = match self.cache.fetch_feeds().await {
            Ok(reply) => reply.classify(None),
            Err(err) => {
                return self.render_error(epoch, format!("Unexpected error fetching feed list: {err}"));
            }
        };
        match feeds {
            Ok(feeds) => {
                let rows = dashboard::summarize(feeds, self.clock.timestamp());
                self.render(
                    epoch,
                    View::Dashboard(rows),
                    Controls::new().with_breadcrumbs(Breadcrumbs::Root),
                )
            }
            Err(err) => self.render_error(epoch, err.to_string()),
        }
    }

    /// Items are always fetched fresh. An unread item is marked in the background.
    async fn show_item(&self, epoch: u64, feed: &str, uid: &str) -> (bool, Option<JoinHandle<bool>>) {
        self.loading(epoch);

        let item = match self.api.get_item(feed, uid).await {
            Ok(reply) => reply.classify(Some("Item")),
            Err(err) => {
                let rendered = self.render_error(epoch, format!("Unexpected error fetching item: {err}"));
                return (rendered, None);
            }
        };
        let item = match item {
            Ok(item) => item,
            Err(err) => return (self.render_error(epoch, err.to_string()), None),
        };

        let mut controls = Controls::new().with_breadcrumbs(Breadcrumbs::Feed {
            uid: item.feed_uid.clone(),
            name: item.feed_name.clone(),
        });
        if !item.url.is_empty() {
            controls = controls.with_open_button(&item.url);
        }

        let unread = !item.read;
        let scope = ReadScope::Item {
            feed: if item.feed_uid.is_empty() {
                feed.to_string()
            } else {
                item.feed_uid.clone()
            },
            item: item.uid.clone(),
        };

        let rendered = self.render(epoch, View::Item(item), controls);
        let background = (rendered && unread).then(|| self.spawn_mark(scope));
        (rendered, background)
    }

    /// Fire-and-forget item mark; a failure only produces a notice.
    fn spawn_mark(&self, scope: ReadScope) -> JoinHandle<bool> {
        let cache = Arc::clone(&self.cache);
        let renderer = Arc::clone(&self.renderer);
        tokio::spawn(async move {
            let marked = cache.mark_as_read(scope.clone()).await;
            if !marked {
                if let ReadScope::Item { item, .. } = &scope {
                    renderer.notify(Notice::warn(format!("Could not mark item {item} as read.")));
                }
            }
            marked
        })
    }

    /// Mark the current list or feed as read, then show it again from the cache.
    ///
    /// Returns `None` when the current location has nothing to mark.
    pub async fn mark_all_as_read(&self) -> Option<bool> {
        self.renderer.set_loading();

        let scope = self.current().state().read_scope();
        let marked = match scope {
            Some(scope) => {
                info!(?scope, "mark all as read");
                let marked = self.cache.mark_as_read(scope).await;
                if !marked {
                    self.renderer.notify(Notice::warn("Could not mark as read."));
                }
                Some(marked)
            }
            None => {
                debug!("nothing to mark as read here");
                None
            }
        };

        self.refresh(true).await;
        marked
    }

    fn list_controls() -> Controls {
        Controls::new()
            .with_breadcrumbs(Breadcrumbs::Root)
            .with_read_button()
    }

    fn loading(&self, epoch: u64) {
        if self.is_current(epoch) {
            self.renderer.set_loading();
        }
    }

    fn reset_controls(&self, epoch: u64, controls: Option<Controls>) {
        if self.is_current(epoch) {
            self.renderer.reset_controls(controls);
        }
    }

    /// Deliver content unless a newer refresh has taken over.
    fn render(&self, epoch: u64, view: View, controls: Controls) -> bool {
        if !self.is_current(epoch) {
            debug!(epoch, "dropping superseded render");
            return false;
        }
        self.renderer.reset_controls(Some(controls));
        self.renderer.set_content(view);
        true
    }

    /// Show an error in place of the content. Always `false`: no content was shown.
    fn render_error(&self, epoch: u64, message: String) -> bool {
        if !self.is_current(epoch) {
            debug!(epoch, %message, "dropping superseded error");
            return false;
        }
        debug!(%message, "rendering error");
        self.renderer.set_content(View::Error(message));
        self.renderer
            .reset_controls(Some(Controls::new().with_breadcrumbs(Breadcrumbs::Root)));
        false
    }
}

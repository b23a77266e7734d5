// App state and main event loop.
// Owns the screen the router renders into and maps keys to navigation.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{prelude::*, widgets::ListState};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::state::{Controls, Link, Location, Notice, Renderer, Router, View};
use crate::ui;

/// Notices kept for the status bar.
const MAX_NOTICES: usize = 50;

/// What the router last rendered.
#[derive(Debug, Clone)]
pub struct ScreenState {
    pub view: View,
    pub controls: Option<Controls>,
    pub notices: Vec<Notice>,
    /// When content other than the loading indicator was last shown.
    pub rendered_at: DateTime<Utc>,
    /// Bumped on every content change.
    pub generation: u64,
}

/// The terminal-side renderer. Router tasks write, the draw loop reads.
pub struct Screen {
    state: Mutex<ScreenState>,
    clock: Arc<dyn Clock>,
}

impl Screen {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(ScreenState {
                view: View::Loading,
                controls: None,
                notices: Vec::new(),
                rendered_at: clock.now(),
                generation: 0,
            }),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> ScreenState {
        self.lock().clone()
    }
}

impl Renderer for Screen {
    fn set_content(&self, view: View) {
        let now = self.clock.now();
        let mut state = self.lock();
        if view != View::Loading {
            state.rendered_at = now;
        }
        state.view = view;
        state.generation += 1;
    }

    fn reset_controls(&self, controls: Option<Controls>) {
        self.lock().controls = controls;
    }

    fn notify(&self, notice: Notice) {
        let mut state = self.lock();
        state.notices.push(notice);
        if state.notices.len() > MAX_NOTICES {
            let excess = state.notices.len() - MAX_NOTICES;
            state.notices.drain(..excess);
        }
    }
}

/// Main application state.
pub struct App {
    router: Arc<Router>,
    screen: Arc<Screen>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    auto_refresh: bool,
    /// Selection within the current view's links.
    pub list_state: ListState,
    seen_generation: u64,
    /// Vertical scroll of the item view.
    pub scroll: u16,
    pub show_help: bool,
    /// Text typed into the location prompt, while it is open.
    pub location_input: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        router: Arc<Router>,
        screen: Arc<Screen>,
        clock: Arc<dyn Clock>,
        ttl: TimeDelta,
        auto_refresh: bool,
    ) -> Self {
        Self {
            router,
            screen,
            clock,
            ttl,
            auto_refresh,
            list_state: ListState::default(),
            seen_generation: 0,
            scroll: 0,
            show_help: false,
            location_input: None,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> ScreenState {
        self.screen.snapshot()
    }

    pub fn location(&self) -> Location {
        self.router.current()
    }

    pub fn now(&self) -> i64 {
        self.clock.timestamp()
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            let screen = self.screen();
            self.sync_selection(&screen);
            terminal.draw(|frame| ui::draw(frame, self, &screen))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// New content resets the selection to the first link and the scroll to the top.
    fn sync_selection(&mut self, screen: &ScreenState) {
        if screen.generation == self.seen_generation {
            return;
        }
        self.seen_generation = screen.generation;
        let first = if screen.view.links().is_empty() {
            None
        } else {
            Some(0)
        };
        self.list_state.select(first);
        self.scroll = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.location_input.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        if self.show_help {
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        if self.reload_if_stale() {
            return;
        }

        let screen = self.screen();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => self.back(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(&screen),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(&screen),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                if let Some(link) = self.selected_link(&screen) {
                    self.navigate(Location::parse(&link.location));
                }
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('m') => {
                if screen.controls.as_ref().is_some_and(|c| c.read_button) {
                    self.mark_all_as_read();
                }
            }
            KeyCode::Char('o') => {
                if let Some(url) = screen.controls.and_then(|c| c.open_button) {
                    self.screen.notify(Notice::info(format!("Open: {url}")));
                }
            }
            KeyCode::Char('g') => self.location_input = Some(self.location().to_string()),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(input) = self.location_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.location_input = None,
            KeyCode::Enter => {
                let target = input.trim().to_string();
                self.location_input = None;
                if !target.is_empty() {
                    self.navigate(Location::parse(&target));
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    fn selected_link(&self, screen: &ScreenState) -> Option<Link> {
        let index = self.list_state.selected()?;
        screen.view.links().into_iter().nth(index)
    }

    fn select_next(&mut self, screen: &ScreenState) {
        let len = screen.view.links().len();
        if len == 0 {
            if matches!(screen.view, View::Item(_)) {
                self.scroll = self.scroll.saturating_add(1);
            }
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i, // Stay at end
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    fn select_prev(&mut self, screen: &ScreenState) {
        if screen.view.links().is_empty() {
            self.scroll = self.scroll.saturating_sub(1);
            return;
        }
        let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(prev));
    }

    /// A keypress after the view has outlived the TTL reloads it without the cache.
    fn reload_if_stale(&mut self) -> bool {
        if !self.auto_refresh {
            return false;
        }
        let screen = self.screen();
        if screen.view == View::Loading {
            return false;
        }
        let age = self.clock.now().signed_duration_since(screen.rendered_at);
        if age < self.ttl {
            return false;
        }
        info!(age_secs = age.num_seconds(), "view is stale, reloading");
        self.reload();
        true
    }

    fn navigate(&self, location: Location) {
        debug!(%location, "follow link");
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            router.navigate(location).await;
        });
    }

    fn back(&self) {
        if !self.router.can_go_back() {
            return;
        }
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            router.back().await;
        });
    }

    fn reload(&self) {
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            router.reload().await;
        });
    }

    fn mark_all_as_read(&self) {
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            router.mark_all_as_read().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::api::Api;
    use crate::cache::FeedCache;
    use crate::clock::ManualClock;
    use crate::state::{Breadcrumbs, NoticeLevel};
    use crate::test_support::{ScriptedTransport, feed, feed_with_items, item};

    const TTL: i64 = 3600;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (App, Arc<Screen>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_timestamp(1_700_000_000));
        let transport = ScriptedTransport::new();
        let api = Api::new(transport);
        let cache = Arc::new(FeedCache::new(api.clone(), TimeDelta::seconds(TTL), clock.clone()));
        let screen = Arc::new(Screen::new(clock.clone()));
        let router = Arc::new(Router::new(
            api,
            cache,
            screen.clone(),
            clock.clone(),
            Location::path("/feeds"),
        ));
        let app = App::new(router, screen.clone(), clock.clone(), TimeDelta::seconds(TTL), true);
        (app, screen, clock)
    }

    fn show_feeds(screen: &Screen, count: usize) {
        let feeds = (0..count).map(|i| feed(&format!("f{i}"), "Feed")).collect();
        screen.set_content(View::FeedList {
            feeds,
            status_link: false,
        });
        screen.reset_controls(Some(Controls::new().with_breadcrumbs(Breadcrumbs::Root)));
    }

    #[test]
    fn test_screen_records_renders() {
        let clock = Arc::new(ManualClock::at_timestamp(100));
        let screen = Screen::new(clock.clone());

        clock.advance(TimeDelta::seconds(5));
        screen.set_loading();
        assert_eq!(screen.snapshot().rendered_at.timestamp(), 100);

        screen.set_content(View::Error("Please login.".to_string()));
        let state = screen.snapshot();
        assert_eq!(state.generation, 2);
        assert_eq!(state.rendered_at.timestamp(), 105);

        screen.reset_controls(None);
        assert_eq!(screen.snapshot().controls, None);
    }

    #[test]
    fn test_notices_are_capped() {
        let screen = Screen::new(Arc::new(ManualClock::at_timestamp(0)));
        for i in 0..MAX_NOTICES + 5 {
            screen.notify(Notice::warn(format!("n{i}")));
        }
        let notices = screen.snapshot().notices;
        assert_eq!(notices.len(), MAX_NOTICES);
        assert_eq!(notices[0].message, "n5");
        assert_eq!(notices[0].level, NoticeLevel::Warn);
    }

    #[test]
    fn test_selection_resets_and_clamps() {
        let (mut app, screen, _) = app();
        show_feeds(&screen, 3);
        let state = screen.snapshot();
        app.sync_selection(&state);
        assert_eq!(app.list_state.selected(), Some(0));

        for _ in 0..5 {
            app.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(app.list_state.selected(), Some(2));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.list_state.selected(), Some(1));

        // New content starts at the top again
        show_feeds(&screen, 1);
        let state = screen.snapshot();
        app.sync_selection(&state);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_item_view_scrolls() {
        let (mut app, screen, _) = app();
        screen.set_content(View::Item(item("f1", "i1")));
        let state = screen.snapshot();
        app.sync_selection(&state);
        assert_eq!(app.list_state.selected(), None);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.scroll, 11);
        app.handle_key(key(KeyCode::PageUp));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_location_prompt_editing() {
        let (mut app, screen, _) = app();
        show_feeds(&screen, 1);

        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.location_input.as_deref(), Some("/feeds"));

        for _ in 0.."/feeds".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        for c in "#token:abc".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.location_input.as_deref(), Some("#token:abc"));
        // 'q' is text while the prompt is open
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.location_input, None);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (mut app, screen, _) = app();
        show_feeds(&screen, 2);
        let state = screen.snapshot();
        app.sync_selection(&state);

        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.list_state.selected(), Some(0));

        app.handle_key(key(KeyCode::Esc));
        assert!(!app.show_help);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_open_posts_notice() {
        let (mut app, screen, _) = app();
        screen.set_content(View::Item(item("f1", "i1")));
        screen.reset_controls(Some(Controls::new().with_open_button("https://blog.test/post")));

        app.handle_key(key(KeyCode::Char('o')));

        let notices = screen.snapshot().notices;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Open: https://blog.test/post");
    }

    #[tokio::test]
    async fn test_stale_view_reloads_on_keypress() {
        let (mut app, screen, clock) = app();
        screen.set_content(View::Feed(feed_with_items("f1", 0, Vec::new())));
        let state = screen.snapshot();
        app.sync_selection(&state);

        assert!(!app.reload_if_stale());
        clock.advance(TimeDelta::seconds(TTL));
        assert!(app.reload_if_stale());

        // The triggering key is consumed by the reload
        app.handle_key(key(KeyCode::Char('?')));
        assert!(!app.show_help);
    }
}

// Entry point for the rill TUI.
// Wires config, logging, the backend client, cache, and router, then runs the terminal loop.

use std::sync::Arc;

use tracing::{error, info};

use rill::api::{Api, FeedClient};
use rill::app::{App, Screen};
use rill::cache::FeedCache;
use rill::clock::{Clock, SystemClock};
use rill::state::{Location, Router};
use rill::{Config, Result, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    telemetry::init(config.log_path().as_deref())?;
    info!(
        server = %config.server,
        cache_ttl = config.cache_ttl,
        start = %config.start,
        "starting rill"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let api = Api::new(Arc::new(FeedClient::new(&config.server)?));
    let cache = Arc::new(FeedCache::new(api.clone(), config.cache_ttl(), clock.clone()));
    let screen = Arc::new(Screen::new(clock.clone()));
    let router = Arc::new(
        Router::new(
            api,
            cache,
            screen.clone(),
            clock.clone(),
            Location::parse(&config.start),
        )
        .with_drop_superseded(config.drop_superseded),
    );

    // The first render never trusts the cache
    let initial = Arc::clone(&router);
    tokio::spawn(async move {
        initial.refresh(false).await;
    });

    let mut app = App::new(router, screen, clock, config.cache_ttl(), config.auto_refresh);
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    if let Err(err) = &result {
        error!(error = %err, "terminal loop failed");
    }
    info!("exiting");
    Ok(result?)
}

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bus_tracker::arrivals::LiveArrivalMerger;
use bus_tracker::cache::LineCache;
use bus_tracker::clock::SystemClock;
use bus_tracker::config::AppConfig;
use bus_tracker::presence::Presence;
use bus_tracker::schedule::ScheduleRepository;
use bus_tracker::store::{FileLineStore, LineStore};
use bus_tracker::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bus_tracker=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let remote = Arc::new(config.remote()?);
    let store = Arc::new(FileLineStore::open(&config.cache_path));
    let clock = Arc::new(SystemClock);
    let presence = Presence::default();

    let lines = LineCache::new(
        remote.clone(),
        store,
        clock.clone(),
        config.line_cache.clone(),
    );
    let merger = LiveArrivalMerger::new(remote.clone(), presence.clone(), config.live.clone());
    let schedule = ScheduleRepository::new(remote, clock, merger, &config.schedule);

    // Refresh lines daily in the background, on top of the expiry check
    // every subscriber makes.
    let lines_refresh = lines.clone();
    let refresh_interval = config.line_cache.refresh_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match lines_refresh.refresh_now().await {
                Ok(()) => {
                    let count = lines_refresh.store().lines().len();
                    info!(count, "Background line refresh done");
                }
                Err(e) => warn!(error = %e, "Background line refresh failed"),
            }
        }
    });

    let state = AppState::new(lines, schedule, presence);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Bus tracker listening");
    info!("  GET  /health");
    info!("  GET  /lines");
    info!("  GET  /stops/:stop_id/arrivals");
    info!("  GET  /stops/:stop_id/arrivals/live  (server-sent events)");
    info!("  PUT  /presence");

    axum::serve(listener, app).await?;
    Ok(())
}

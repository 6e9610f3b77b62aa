use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use warroom_common::{Config, WarRoomError};
use warroom_ingest::{Harvester, HttpFeedFetcher, IngestStatus};
use warroom_store::{init_schema, open_pool};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warroom=info".parse()?))
        .init();

    info!("War Room harvester starting...");

    let config = Config::from_env();
    info!(
        scope = config.scope.as_str(),
        db = config.database_path.as_str(),
        poll_seconds = config.poll_seconds,
        max_pages = config.max_pages,
        "configuration loaded"
    );

    let pool = open_pool(&config.database_path).await?;
    init_schema(&pool).await?;

    let status = Arc::new(IngestStatus::new(config.ingest_enabled));
    let fetcher = Box::new(HttpFeedFetcher::new(&config)?);
    let harvester = Harvester::new(
        fetcher,
        pool,
        status.clone(),
        config.scope.clone(),
        config.max_pages,
        Duration::from_secs(config.cycle_timeout_seconds),
    );

    if !config.ingest_enabled {
        info!("ingest disabled by configuration, idling");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.poll_seconds));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match harvester.run_cycle().await {
                    Ok(_) => {}
                    Err(WarRoomError::CycleConflict(scope)) => {
                        info!(scope = scope.as_str(), "previous cycle still running, skipping tick");
                    }
                    Err(err) => {
                        warn!(error = %err, "cycle failed, retrying next tick");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

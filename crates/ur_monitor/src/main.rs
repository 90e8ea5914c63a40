//! Entry point for the UR property monitor.
//! Each invocation performs a single scan and exits; scheduling is left to
//! the caller (cron, EventBridge, systemd timers).

use std::sync::Arc;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use notification_services::SesEmailService;
use room_scan::{MonitorConfig, RoomMonitor, RunOutcome, SearchQuery, UrClient};
use search_area::SearchArea;
use snapshot_cache::S3SnapshotStore;

fn log_filter(debug: bool) -> &'static str {
    if debug {
        "info,room_scan=debug,search_area=debug"
    } else {
        "info"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = MonitorConfig::from_env();

    // Initialize logger, verbose when the debug toggle is on
    let debug = config.as_ref().map(|c| c.debug).unwrap_or(false);
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(log_filter(debug)));

    log::info!("🚀 Starting UR property monitor...");

    let config = config
        .inspect_err(|e| log::error!("❌ {}", e))
        .context("invalid configuration")?;

    let area = SearchArea::tokyo().context("invalid search area")?;
    log::info!("🗺️ Search area has {} vertices", area.vertices().len());

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.aws_region {
        loader = loader.region(Region::new(region.clone()));
    }
    let aws_config = loader.load().await;

    let snapshot_store = S3SnapshotStore::new(&aws_config, &config.cache_bucket, &config.cache_key);
    let email_service = SesEmailService::new(&aws_config);
    let listing_source = UrClient::with_url(&config.api_url, SearchQuery::default())
        .context("failed to create UR client")?;

    let monitor = RoomMonitor::new(
        area,
        Arc::new(listing_source),
        Arc::new(snapshot_store),
        Arc::new(email_service),
        config,
    );

    match monitor.run_once().await {
        Ok(RunOutcome::NoNewRooms { listings_in_area }) => {
            log::info!(
                "✅ Scan complete, nothing new among {} listings in the area",
                listings_in_area
            );
            Ok(())
        }
        Ok(RunOutcome::Notified {
            new_rooms,
            message_id,
            checked_at,
        }) => {
            log::info!(
                "✅ Notified about {} new rooms (message {}, checked at {})",
                new_rooms,
                message_id,
                checked_at
            );
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Scan failed: {}", e);
            Err(e).context("scan failed")
        }
    }
}

//! Price Alert Bot - Entry Point
//!
//! 1. Loads configuration (YAML + environment)
//! 2. Builds the watchlist, market data fetcher and Telegram client
//! 3. Spawns the scheduler, the command loop and the health server
//! 4. Drains everything on Ctrl+C

use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use price_alert_bot::adapters::{RateLimitedFetcher, TelegramClient, YahooFetcher};
use price_alert_bot::commands::{command_task, CommandHandler};
use price_alert_bot::config::{self, constants::DEFAULT_CONFIG_PATH};
use price_alert_bot::core::{scheduler_task, AlertEngine, WatchlistStore};
use price_alert_bot::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();

    // Initialize logging (LOG_FORMAT=json|pretty, RUST_LOG)
    config::init_logging();

    info!("📈 Price Alert Bot starting...");

    let config_path = PathBuf::from(std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()));
    let config = match config::load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "[CONFIG] Configuration failed");
            std::process::exit(1);
        }
    };

    info!(
        config_path = %config_path.display(),
        bot_token = %config::sanitize(&config.telegram.bot_token),
        tick_interval_secs = config.scheduler.tick_interval_secs,
        fetch_delay_ms = config.scheduler.fetch_delay_ms,
        market_data = %config.market_data.base_url,
        server_enabled = config.server.enabled,
        port = config.server.port,
        "[CONFIG] Loaded"
    );

    // Collaborators
    let store = WatchlistStore::new().into_shared();
    let yahoo = match YahooFetcher::new(&config.market_data) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!(error = %e, "[CONFIG] Market data client setup failed");
            std::process::exit(1);
        }
    };
    let fetcher = RateLimitedFetcher::new(yahoo, config.scheduler.fetch_delay());
    let telegram = Arc::new(TelegramClient::new(&config.telegram));

    match telegram.get_me().await {
        Ok(me) => info!(bot_id = me.id, username = ?me.username, "[CMD] Telegram identity confirmed"),
        Err(e) => warn!(error = %e, "[CMD] getMe failed, continuing"),
    }

    let engine = Arc::new(AlertEngine::new(
        store.clone(),
        fetcher,
        telegram.clone(),
        config.engine_timeouts(),
    ));

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let scheduler_handle = tokio::spawn(scheduler_task(
        engine,
        config.scheduler.tick_interval(),
        shutdown_tx.subscribe(),
    ));

    let tracker = TaskTracker::new();
    let handler = Arc::new(CommandHandler::new(store.clone()));
    let command_handle = tokio::spawn(command_task(
        telegram,
        handler,
        config.telegram.poll_timeout_secs,
        tracker.clone(),
        shutdown_tx.subscribe(),
    ));

    let server_handle = if config.server.enabled {
        let port = config.server.port;
        Some(tokio::spawn(async move {
            if let Err(e) = server::start_server(port).await {
                error!(error = %e, "Health server failed");
            }
        }))
    } else {
        None
    };

    info!("⏳ Running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => info!("[SHUTDOWN] Graceful shutdown initiated"),
        Err(e) => error!(error = %e, "[SHUTDOWN] Failed to listen for Ctrl+C, shutting down"),
    }
    let _ = shutdown_tx.send(());

    // Scheduler finishes its in-flight tick before returning
    if let Err(e) = scheduler_handle.await {
        error!(error = %e, "[SHUTDOWN] Scheduler task failed");
    }
    if let Err(e) = command_handle.await {
        error!(error = %e, "[SHUTDOWN] Command task failed");
    }

    // Drain in-flight command replies
    tracker.close();
    tracker.wait().await;

    if let Some(handle) = server_handle {
        handle.abort();
    }

    info!(
        subscribers = store.subscriber_count().await,
        alerts = store.alert_count().await,
        "[SHUTDOWN] Clean exit"
    );
    Ok(())
}

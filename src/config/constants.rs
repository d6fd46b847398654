//! Application constants and configuration defaults
//!
//! This module centralizes the default values used when neither the YAML file
//! nor the environment provides a setting.

use std::str::FromStr;

// =============================================================================
// Scheduler
// =============================================================================

/// Interval between evaluation ticks (2 minutes)
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 120;

/// Minimum spacing between consecutive market data fetches
pub const DEFAULT_FETCH_DELAY_MS: u64 = 2_000;

// =============================================================================
// Market data (Yahoo Finance chart API)
// =============================================================================

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Chart range: latest trading session
pub const DEFAULT_CHART_RANGE: &str = "1d";

/// Chart granularity
pub const DEFAULT_CHART_INTERVAL: &str = "1m";

/// Per-request timeout for fetches and sends
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// Telegram
// =============================================================================

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Long-poll duration for `getUpdates`
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Pause before retrying after a failed `getUpdates`
pub const DEFAULT_POLL_RETRY_DELAY_SECS: u64 = 5;

// =============================================================================
// Liveness server
// =============================================================================

pub const DEFAULT_PORT: u16 = 8080;

/// Config file looked up when `CONFIG_PATH` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Read an environment variable and parse it, falling back to `default`
/// when it is unset or unparsable.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

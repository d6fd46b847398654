//! Configuration types
//!
//! This module defines all configuration structs loaded from YAML. Every
//! section has defaults so an empty (or missing) file is valid apart from the
//! bot token, which normally comes from the `BOT_TOKEN` environment variable.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants::*;
use crate::core::EngineTimeouts;
use crate::error::AppError;

// ============================================================================
// Configuration Structs
// ============================================================================

/// Telegram Bot API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather (prefer the `BOT_TOKEN` env var)
    pub bot_token: String,
    pub api_base_url: String,
    /// `getUpdates` long-poll duration
    pub poll_timeout_secs: u64,
    /// Timeout for `sendMessage` and other short calls
    pub request_timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Tick scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval_secs: u64,
    /// Minimum spacing between consecutive fetches within a tick
    pub fetch_delay_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            fetch_delay_ms: DEFAULT_FETCH_DELAY_MS,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

/// Market data provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub range: String,
    pub interval: String,
    pub request_timeout_ms: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            range: DEFAULT_CHART_RANGE.to_string(),
            interval: DEFAULT_CHART_INTERVAL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

/// Liveness HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_PORT,
        }
    }
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub scheduler: SchedulerConfig,
    pub market_data: MarketDataConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Overlay environment variables on top of file values
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `BOT_TOKEN` | `telegram.bot_token` |
    /// | `TELEGRAM_API_URL` | `telegram.api_base_url` |
    /// | `TICK_INTERVAL_SECS` | `scheduler.tick_interval_secs` |
    /// | `FETCH_DELAY_MS` | `scheduler.fetch_delay_ms` |
    /// | `REQUEST_TIMEOUT_MS` | `market_data.request_timeout_ms` and `telegram.request_timeout_ms` |
    /// | `YAHOO_BASE_URL` | `market_data.base_url` |
    /// | `PORT` | `server.port` |
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if !token.trim().is_empty() {
                self.telegram.bot_token = token.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var("TELEGRAM_API_URL") {
            self.telegram.api_base_url = url;
        }
        if let Ok(url) = std::env::var("YAHOO_BASE_URL") {
            self.market_data.base_url = url;
        }

        self.scheduler.tick_interval_secs = env_or("TICK_INTERVAL_SECS", self.scheduler.tick_interval_secs);
        self.scheduler.fetch_delay_ms = env_or("FETCH_DELAY_MS", self.scheduler.fetch_delay_ms);

        self.market_data.request_timeout_ms = env_or("REQUEST_TIMEOUT_MS", self.market_data.request_timeout_ms);
        self.telegram.request_timeout_ms = env_or("REQUEST_TIMEOUT_MS", self.telegram.request_timeout_ms);

        self.server.port = env_or("PORT", self.server.port);
    }

    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: a bot token is required to talk to Telegram
        if self.telegram.bot_token.trim().is_empty() {
            return Err(AppError::Config(
                "Missing bot token (set BOT_TOKEN or telegram.bot_token)".to_string(),
            ));
        }

        if self.scheduler.tick_interval_secs == 0 {
            return Err(AppError::Config(
                "scheduler.tick_interval_secs must be > 0".to_string(),
            ));
        }

        if self.market_data.request_timeout_ms == 0 || self.telegram.request_timeout_ms == 0 {
            return Err(AppError::Config("request timeouts must be > 0".to_string()));
        }

        if self.server.enabled && self.server.port == 0 {
            return Err(AppError::Config("server.port must be > 0".to_string()));
        }

        for (name, url) in [
            ("telegram.api_base_url", &self.telegram.api_base_url),
            ("market_data.base_url", &self.market_data.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "{} must be an http(s) URL (got '{}')",
                    name, url
                )));
            }
        }

        Ok(())
    }

    /// Per-call timeouts for the engine
    ///
    /// The fetch budget covers the rate-limit wait that precedes each call.
    pub fn engine_timeouts(&self) -> EngineTimeouts {
        EngineTimeouts {
            fetch: Duration::from_millis(self.market_data.request_timeout_ms) + self.scheduler.fetch_delay(),
            send: Duration::from_millis(self.telegram.request_timeout_ms),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

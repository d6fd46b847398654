//! Configuration module for bot settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `TelegramConfig`, `SchedulerConfig`, ...)
//! - YAML + environment loading (`load_config`)
//! - Logging configuration (`init_logging`)
//! - Defaults (`constants`)

pub mod constants;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{AppConfig, MarketDataConfig, SchedulerConfig, ServerConfig, TelegramConfig};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};

// Re-export logging functions
pub use logging::{init_logging, sanitize};

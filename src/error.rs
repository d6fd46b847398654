//! Application-wide error types using thiserror
//!
//! Layer-specific errors (market data, messaging, watchlist) convert into
//! `AppError` so callers outside the engine get one consistent type.

use crate::adapters::errors::{MarketDataError, MessagingError};
use crate::core::watchlist::WatchlistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Watchlist error: {0}")]
    Watchlist(#[from] WatchlistError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

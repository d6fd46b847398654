//! Adapters for the external collaborators of the alert engine
//!
//! This module provides the market data and messaging abstractions the
//! engine consumes, plus their concrete HTTP implementations
//! (Yahoo Finance for prices, Telegram for chat).

pub mod errors;
pub mod rate_limit;
pub mod telegram;
pub mod traits;
pub mod yahoo;

// Re-export commonly used types for convenience
pub use errors::{MarketDataError, MarketDataResult, MessagingError, MessagingResult};
pub use rate_limit::RateLimitedFetcher;
pub use telegram::TelegramClient;
pub use traits::{MarketDataFetcher, Messenger, UpdateSource};
pub use yahoo::YahooFetcher;

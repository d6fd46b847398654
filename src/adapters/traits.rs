//! Collaborator traits consumed by the alert engine and the command loop
//!
//! The engine never talks to a concrete provider. It depends on
//! `MarketDataFetcher` for prices and `Messenger` for outbound text, so
//! tests and alternative transports can be swapped in freely.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::errors::{MarketDataResult, MessagingResult};
use crate::adapters::telegram::types::Update;
use crate::core::alert::{SubscriberId, Symbol};

/// Source of last-close prices
///
/// # Contract
/// * `Ok(Some(price))` - usable price for this tick
/// * `Ok(None)` - provider has no data (unknown or delisted symbol)
/// * `Err(...)` - transient failure
///
/// The engine treats `Ok(None)` and `Err(_)` the same way: the symbol is
/// skipped for this tick and its alerts are kept.
#[async_trait]
pub trait MarketDataFetcher: Send + Sync {
    /// Most recent closing price for the latest trading session
    async fn fetch_last_close(&self, symbol: &Symbol) -> MarketDataResult<Option<f64>>;

    /// Short provider identifier used in logs (e.g. "yahoo")
    fn provider_name(&self) -> &'static str;
}

/// Outbound text delivery to a subscriber
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to `subscriber`. `Ok` means the transport confirmed it.
    async fn send_message(&self, subscriber: SubscriberId, text: &str) -> MessagingResult<()>;
}

/// Inbound chat updates (long polling)
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates with `update_id >= offset`, waiting up to `timeout_secs`
    async fn poll_updates(&self, offset: i64, timeout_secs: u64) -> MessagingResult<Vec<Update>>;
}

#[async_trait]
impl<T: MarketDataFetcher + ?Sized> MarketDataFetcher for Arc<T> {
    async fn fetch_last_close(&self, symbol: &Symbol) -> MarketDataResult<Option<f64>> {
        (**self).fetch_last_close(symbol).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send_message(&self, subscriber: SubscriberId, text: &str) -> MessagingResult<()> {
        (**self).send_message(subscriber, text).await
    }
}

#[async_trait]
impl<T: UpdateSource + ?Sized> UpdateSource for Arc<T> {
    async fn poll_updates(&self, offset: i64, timeout_secs: u64) -> MessagingResult<Vec<Update>> {
        (**self).poll_updates(offset, timeout_secs).await
    }
}

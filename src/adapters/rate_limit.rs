//! Inter-call spacing for market data fetches
//!
//! Upstream providers throttle aggressive clients, so consecutive fetches are
//! spaced by at least `min_interval`. The spacing lives here, in the adapter
//! layer, and the evaluator stays pure.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::adapters::errors::MarketDataResult;
use crate::adapters::traits::MarketDataFetcher;
use crate::core::alert::Symbol;

/// Wraps a fetcher and enforces a minimum delay between calls
pub struct RateLimitedFetcher<F> {
    inner: F,
    min_interval: Duration,
    /// Start time of the previous call; the lock also serializes callers
    last_call: Mutex<Option<Instant>>,
}

impl<F: MarketDataFetcher> RateLimitedFetcher<F> {
    pub fn new(inner: F, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: MarketDataFetcher> MarketDataFetcher for RateLimitedFetcher<F> {
    async fn fetch_last_close(&self, symbol: &Symbol) -> MarketDataResult<Option<f64>> {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!(symbol = %symbol, wait_ms = wait.as_millis() as u64, "[FETCH] Rate limit delay");
                tokio::time::sleep(wait).await;
            }
        }

        *last_call = Some(Instant::now());
        self.inner.fetch_last_close(symbol).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MarketDataFetcher for CountingFetcher {
        async fn fetch_last_close(&self, _symbol: &Symbol) -> MarketDataResult<Option<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(1.0))
        }

        fn provider_name(&self) -> &'static str {
            "counting"
        }
    }

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_not_delayed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = RateLimitedFetcher::new(
            CountingFetcher { calls: calls.clone() },
            Duration::from_secs(2),
        );

        let start = Instant::now();
        fetcher.fetch_last_close(&sym("TCS")).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = RateLimitedFetcher::new(
            CountingFetcher { calls: calls.clone() },
            Duration::from_secs(2),
        );

        let start = Instant::now();
        for s in ["A", "B", "C"] {
            fetcher.fetch_last_close(&sym(s)).await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_secs(4));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_once_interval_has_passed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = RateLimitedFetcher::new(
            CountingFetcher { calls: calls.clone() },
            Duration::from_secs(2),
        );

        fetcher.fetch_last_close(&sym("A")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let start = Instant::now();
        fetcher.fetch_last_close(&sym("B")).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));
        assert_eq!(fetcher.provider_name(), "counting");
    }
}

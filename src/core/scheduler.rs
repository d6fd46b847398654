//! Tick orchestration and periodic scheduling
//!
//! `AlertEngine::run_tick` performs one evaluation cycle:
//! 1. Snapshot the watchlist (lock released immediately)
//! 2. Fetch each distinct symbol once, sequentially
//! 3. Evaluate alerts against the fresh prices
//! 4. Dispatch notifications for triggered alerts
//! 5. Remove alerts whose delivery was confirmed
//!
//! `scheduler_task` drives ticks on a fixed interval. Ticks never overlap:
//! a tick runs to completion before the loop looks at the timer again,
//! missed firings are skipped instead of queued, and an atomic guard
//! rejects any concurrent `run_tick` call.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::dispatcher::NotificationDispatcher;
use super::evaluator::{distinct_symbols, evaluate, PriceSnapshot};
use super::watchlist::SharedWatchlist;
use crate::adapters::errors::MarketDataError;
use crate::adapters::traits::{MarketDataFetcher, Messenger};
use crate::core::alert::Symbol;

/// Scheduler state machine: `Idle -> Running -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Summary of one completed tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    pub alerts: usize,
    pub symbols_fetched: usize,
    pub prices_resolved: usize,
    pub triggered: usize,
    pub delivered: usize,
    pub removed: usize,
    pub failed_sends: usize,
    pub unresolved: usize,
    pub duration_ms: u64,
}

/// Result of asking the engine to tick
#[derive(Debug, Clone)]
pub enum TickOutcome {
    Completed(TickReport),
    /// Another tick was already running; this firing was dropped
    Skipped,
}

/// Resets the running flag on drop, including during a panic unwind
struct TickGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> TickGuard<'a> {
    fn try_acquire(running: &'a AtomicBool) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { running })
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Timeouts applied to each collaborator call within a tick
#[derive(Debug, Clone, Copy)]
pub struct EngineTimeouts {
    /// Per-fetch limit; includes any rate-limit wait inside the fetcher
    pub fetch: Duration,
    /// Per-message limit
    pub send: Duration,
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self {
            fetch: Duration::from_secs(12),
            send: Duration::from_secs(10),
        }
    }
}

/// Alert-matching engine: one tick at a time over the shared watchlist
pub struct AlertEngine<F, M> {
    store: SharedWatchlist,
    fetcher: F,
    dispatcher: NotificationDispatcher<M>,
    fetch_timeout: Duration,
    running: AtomicBool,
}

impl<F, M> AlertEngine<F, M>
where
    F: MarketDataFetcher,
    M: Messenger,
{
    pub fn new(store: SharedWatchlist, fetcher: F, messenger: M, timeouts: EngineTimeouts) -> Self {
        Self {
            store,
            fetcher,
            dispatcher: NotificationDispatcher::new(messenger, timeouts.send),
            fetch_timeout: timeouts.fetch,
            running: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &SharedWatchlist {
        &self.store
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::Acquire) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Run one tick unless one is already in progress
    pub async fn run_tick(&self) -> TickOutcome {
        let Some(_guard) = TickGuard::try_acquire(&self.running) else {
            debug!("[TICK] Previous tick still running, skipping");
            return TickOutcome::Skipped;
        };

        TickOutcome::Completed(self.tick().await)
    }

    async fn tick(&self) -> TickReport {
        let started_at = Utc::now();
        let clock = Instant::now();

        let snapshot = self.store.snapshot_all().await;
        let symbols = distinct_symbols(&snapshot);

        let prices = if symbols.is_empty() {
            PriceSnapshot::new()
        } else {
            self.fetch_prices(&symbols).await
        };

        let evaluation = evaluate(&snapshot, &prices);
        let triggered = evaluation.triggered.len();

        for pending in &evaluation.unresolved {
            debug!(
                subscriber = %pending.subscriber,
                symbol = %pending.alert.symbol,
                "[TICK] No price this tick, alert kept"
            );
        }

        let report = self.dispatcher.dispatch(evaluation.triggered).await;

        // Separate pass over confirmed deliveries; the snapshot is never mutated
        let mut removed = 0;
        for delivered in &report.delivered {
            if self.store.remove_triggered(delivered.subscriber, &delivered.alert).await {
                removed += 1;
            } else {
                debug!(
                    subscriber = %delivered.subscriber,
                    symbol = %delivered.alert.symbol,
                    "[TICK] Alert already removed or replaced during tick"
                );
            }
        }

        let tick_report = TickReport {
            started_at,
            alerts: snapshot.alert_count(),
            symbols_fetched: symbols.len(),
            prices_resolved: prices.len(),
            triggered,
            delivered: report.delivered.len(),
            removed,
            failed_sends: report.failed.len(),
            unresolved: evaluation.unresolved.len(),
            duration_ms: clock.elapsed().as_millis() as u64,
        };

        info!(
            alerts = tick_report.alerts,
            symbols = tick_report.symbols_fetched,
            resolved = tick_report.prices_resolved,
            triggered = tick_report.triggered,
            delivered = tick_report.delivered,
            failed_sends = tick_report.failed_sends,
            unresolved = tick_report.unresolved,
            duration_ms = tick_report.duration_ms,
            "[TICK] Completed"
        );

        tick_report
    }

    /// Fetch each symbol exactly once; failures leave the symbol absent
    async fn fetch_prices(&self, symbols: &BTreeSet<Symbol>) -> PriceSnapshot {
        let mut prices = PriceSnapshot::new();
        let provider = self.fetcher.provider_name();

        for symbol in symbols {
            let result = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch_last_close(symbol)).await {
                Ok(result) => result,
                Err(_) => Err(MarketDataError::Timeout(self.fetch_timeout.as_millis() as u64)),
            };

            match result {
                Ok(Some(price)) if price.is_finite() && price >= 0.0 => {
                    debug!(provider, symbol = %symbol, price, "[FETCH] Price received");
                    prices.insert(symbol.clone(), price);
                }
                Ok(Some(price)) => {
                    warn!(provider, symbol = %symbol, price, "[FETCH] Unusable price, skipping symbol");
                }
                Ok(None) => {
                    warn!(provider, symbol = %symbol, "[FETCH] No data, skipping symbol");
                }
                Err(e) => {
                    warn!(provider, symbol = %symbol, error = %e, "[FETCH] Fetch failed, skipping symbol");
                }
            }
        }

        prices
    }
}

/// Periodic tick driver
///
/// The first tick fires one full `tick_interval` after start. On shutdown the
/// timer stops; a tick already in flight is allowed to finish first. Each
/// tick runs in its own task so that a panic inside it is caught here and
/// does not take the scheduler down.
pub async fn scheduler_task<F, M>(
    engine: Arc<AlertEngine<F, M>>,
    tick_interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) where
    F: MarketDataFetcher + 'static,
    M: Messenger + 'static,
{
    let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_secs = tick_interval.as_secs(), "Scheduler started");
    let mut tick_count: u64 = 0;

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                info!(ticks = tick_count, "[SHUTDOWN] Scheduler stopping");
                break;
            }
            _ = ticker.tick() => {
                tick_count += 1;
                let tick_engine = engine.clone();
                let handle = tokio::spawn(async move { tick_engine.run_tick().await });

                match handle.await {
                    Ok(TickOutcome::Completed(_)) => {}
                    Ok(TickOutcome::Skipped) => {
                        debug!(tick = tick_count, "[TICK] Skipped, engine busy");
                    }
                    Err(e) => {
                        error!(tick = tick_count, error = %e, "[TICK] Scheduler fault, tick aborted");
                    }
                }
            }
        }
    }

    info!("Scheduler stopped");
}

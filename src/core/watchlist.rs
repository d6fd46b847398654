//! Watchlist store
//!
//! Owns every alert, keyed by subscriber then symbol. All mutations and
//! snapshots go through a single async mutex that is only held for the
//! copy/mutate itself, never across network I/O.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::alert::{Alert, Operator, SubscriberId, Symbol};

/// Type alias for the store shared between the scheduler and command handlers
pub type SharedWatchlist = Arc<WatchlistStore>;

/// Errors raised when creating or storing alerts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WatchlistError {
    #[error("Invalid threshold: {0} (must be a finite, non-negative number)")]
    InvalidThreshold(f64),

    #[error("Invalid symbol: '{0}'")]
    InvalidSymbol(String),

    #[error("Invalid operator: '{0}' (expected >= or <=)")]
    InvalidOperator(String),
}

/// Result of an `add` call
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// No alert existed for this symbol
    Inserted(Alert),
    /// An alert existed and was replaced (latest-wins)
    Replaced { previous: Alert, current: Alert },
}

impl AddOutcome {
    pub fn alert(&self) -> &Alert {
        match self {
            AddOutcome::Inserted(alert) => alert,
            AddOutcome::Replaced { current, .. } => current,
        }
    }
}

/// Immutable copy of the whole watchlist, taken once per tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistSnapshot {
    entries: BTreeMap<SubscriberId, Vec<Alert>>,
}

impl WatchlistSnapshot {
    /// Iterate `(subscriber, alert)` pairs in subscriber then insertion order
    pub fn iter(&self) -> impl Iterator<Item = (SubscriberId, &Alert)> + '_ {
        self.entries
            .iter()
            .flat_map(|(subscriber, alerts)| alerts.iter().map(move |a| (*subscriber, a)))
    }

    pub fn alerts_for(&self, subscriber: SubscriberId) -> &[Alert] {
        self.entries
            .get(&subscriber)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn alert_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.alert_count() == 0
    }
}

/// Per-subscriber alert store with latest-wins semantics per symbol
#[derive(Debug, Default)]
pub struct WatchlistStore {
    inner: Mutex<BTreeMap<SubscriberId, Vec<Alert>>>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedWatchlist {
        Arc::new(self)
    }

    /// Make a subscriber known without adding an alert
    pub async fn register(&self, subscriber: SubscriberId) {
        self.inner.lock().await.entry(subscriber).or_default();
    }

    /// Insert or replace the alert for `(subscriber, symbol)`
    ///
    /// A replacement keeps the list position of the alert it replaces.
    pub async fn add(
        &self,
        subscriber: SubscriberId,
        symbol: Symbol,
        operator: Operator,
        threshold: f64,
    ) -> Result<AddOutcome, WatchlistError> {
        let alert = Alert::new(symbol, operator, threshold)?;

        let mut guard = self.inner.lock().await;
        let alerts = guard.entry(subscriber).or_default();

        let outcome = match alerts.iter_mut().find(|a| a.symbol == alert.symbol) {
            Some(slot) => {
                let previous = std::mem::replace(slot, alert.clone());
                AddOutcome::Replaced { previous, current: alert }
            }
            None => {
                alerts.push(alert.clone());
                AddOutcome::Inserted(alert)
            }
        };

        debug!(subscriber = %subscriber, alert = %outcome.alert(), "Watchlist updated");
        Ok(outcome)
    }

    /// Snapshot of one subscriber's alerts in insertion order
    pub async fn list(&self, subscriber: SubscriberId) -> Vec<Alert> {
        self.inner
            .lock()
            .await
            .get(&subscriber)
            .cloned()
            .unwrap_or_default()
    }

    /// Idempotent delete by symbol
    pub async fn remove_if_present(&self, subscriber: SubscriberId, symbol: &Symbol) -> Option<Alert> {
        let mut guard = self.inner.lock().await;
        let alerts = guard.get_mut(&subscriber)?;
        let pos = alerts.iter().position(|a| &a.symbol == symbol)?;
        Some(alerts.remove(pos))
    }

    /// Delete a triggered alert only if it is still the same add-instance
    ///
    /// Returns false when the alert was already removed or has been replaced
    /// since the snapshot was taken.
    pub async fn remove_triggered(&self, subscriber: SubscriberId, alert: &Alert) -> bool {
        let mut guard = self.inner.lock().await;
        let Some(alerts) = guard.get_mut(&subscriber) else {
            return false;
        };
        match alerts.iter().position(|a| a.same_instance(alert)) {
            Some(pos) => {
                alerts.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Copy the whole structure out before releasing the lock
    pub async fn snapshot_all(&self) -> WatchlistSnapshot {
        let guard = self.inner.lock().await;
        WatchlistSnapshot {
            entries: guard.clone(),
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn alert_count(&self) -> usize {
        self.inner.lock().await.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S1: SubscriberId = SubscriberId(1);
    const S2: SubscriberId = SubscriberId(2);

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_list_unknown_subscriber_is_empty() {
        let store = WatchlistStore::new();
        assert!(store.list(S1).await.is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_threshold_without_mutation() {
        let store = WatchlistStore::new();
        let result = store.add(S1, sym("TCS"), Operator::Gte, -5.0).await;
        assert_eq!(result.unwrap_err(), WatchlistError::InvalidThreshold(-5.0));
        assert!(store.add(S1, sym("TCS"), Operator::Gte, f64::NAN).await.is_err());
        assert_eq!(store.alert_count().await, 0);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = WatchlistStore::new();
        store.add(S1, sym("TCS"), Operator::Gte, 4200.0).await.unwrap();
        store.add(S1, sym("INFY"), Operator::Lte, 1500.0).await.unwrap();
        store.add(S1, sym("ACC"), Operator::Gte, 10.0).await.unwrap();

        let symbols: Vec<String> = store
            .list(S1)
            .await
            .iter()
            .map(|a| a.symbol.to_string())
            .collect();
        assert_eq!(symbols, vec!["TCS", "INFY", "ACC"]);
    }

    #[tokio::test]
    async fn test_add_same_symbol_replaces() {
        let store = WatchlistStore::new();
        store.add(S1, sym("TCS"), Operator::Gte, 4200.0).await.unwrap();
        store.add(S1, sym("INFY"), Operator::Gte, 1600.0).await.unwrap();
        let outcome = store.add(S1, sym("tcs"), Operator::Lte, 3900.0).await.unwrap();

        match outcome {
            AddOutcome::Replaced { previous, current } => {
                assert_eq!(previous.threshold, 4200.0);
                assert_eq!(current.operator, Operator::Lte);
            }
            other => panic!("Expected replacement, got {:?}", other),
        }

        let alerts = store.list(S1).await;
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].symbol, sym("TCS"));
        assert_eq!(alerts[0].operator, Operator::Lte);
        assert_eq!(alerts[0].threshold, 3900.0);
    }

    #[tokio::test]
    async fn test_same_symbol_is_scoped_per_subscriber() {
        let store = WatchlistStore::new();
        store.add(S1, sym("INFY"), Operator::Lte, 1500.0).await.unwrap();
        store.add(S2, sym("INFY"), Operator::Gte, 1600.0).await.unwrap();
        assert_eq!(store.alert_count().await, 2);
        assert_eq!(store.subscriber_count().await, 2);
    }

    #[tokio::test]
    async fn test_remove_if_present_is_idempotent() {
        let store = WatchlistStore::new();
        store.add(S1, sym("TCS"), Operator::Gte, 4200.0).await.unwrap();

        assert!(store.remove_if_present(S1, &sym("TCS")).await.is_some());
        assert!(store.remove_if_present(S1, &sym("TCS")).await.is_none());
        assert!(store.remove_if_present(S2, &sym("TCS")).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_triggered_ignores_replaced_alert() {
        let store = WatchlistStore::new();
        let first = store
            .add(S1, sym("TCS"), Operator::Gte, 4200.0)
            .await
            .unwrap()
            .alert()
            .clone();
        store.add(S1, sym("TCS"), Operator::Gte, 5000.0).await.unwrap();

        assert!(!store.remove_triggered(S1, &first).await);
        assert_eq!(store.list(S1).await[0].threshold, 5000.0);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_store() {
        let store = WatchlistStore::new();
        store.add(S1, sym("TCS"), Operator::Gte, 4200.0).await.unwrap();

        let snapshot = store.snapshot_all().await;
        store.remove_if_present(S1, &sym("TCS")).await;

        assert_eq!(snapshot.alert_count(), 1);
        assert_eq!(snapshot.alerts_for(S1)[0].symbol, sym("TCS"));
        assert!(store.snapshot_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_makes_subscriber_known() {
        let store = WatchlistStore::new();
        store.register(S1).await;
        store.register(S1).await;
        assert_eq!(store.subscriber_count().await, 1);
        assert_eq!(store.alert_count().await, 0);
    }
}

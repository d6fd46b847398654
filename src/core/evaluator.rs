//! Alert evaluation
//!
//! Pure matching logic: given an immutable watchlist snapshot and the prices
//! fetched for this tick, decide which alerts fire and which could not be
//! evaluated. No I/O, no locks.

use std::collections::{BTreeSet, HashMap};

use super::alert::{Alert, SubscriberId, Symbol};
use super::watchlist::WatchlistSnapshot;

/// Last-close prices fetched during a single tick
///
/// Built fresh every tick and dropped at its end. Symbols without a usable
/// price are simply absent.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    prices: HashMap<Symbol, f64>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol, price: f64) {
        self.prices.insert(symbol, price);
    }

    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(Symbol, f64)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (Symbol, f64)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

/// An alert whose condition held at the fetched price
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMatch {
    pub subscriber: SubscriberId,
    pub alert: Alert,
    pub price: f64,
}

/// An alert whose symbol had no price this tick
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedAlert {
    pub subscriber: SubscriberId,
    pub alert: Alert,
}

/// Outcome of evaluating one snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub triggered: Vec<AlertMatch>,
    pub unresolved: Vec<UnresolvedAlert>,
    /// Alerts with a price that did not meet their condition
    pub pending: usize,
}

/// Union of symbols across all subscribers, each once, sorted
pub fn distinct_symbols(snapshot: &WatchlistSnapshot) -> BTreeSet<Symbol> {
    snapshot.iter().map(|(_, alert)| alert.symbol.clone()).collect()
}

/// Match every alert in `snapshot` against `prices`
///
/// A missing price never counts as "condition not met": those alerts are
/// reported as unresolved and stay eligible for the next tick.
pub fn evaluate(snapshot: &WatchlistSnapshot, prices: &PriceSnapshot) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for (subscriber, alert) in snapshot.iter() {
        match prices.get(&alert.symbol) {
            Some(price) if alert.is_triggered_by(price) => {
                evaluation.triggered.push(AlertMatch {
                    subscriber,
                    alert: alert.clone(),
                    price,
                });
            }
            Some(_) => evaluation.pending += 1,
            None => evaluation.unresolved.push(UnresolvedAlert {
                subscriber,
                alert: alert.clone(),
            }),
        }
    }

    evaluation
}

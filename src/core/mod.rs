//! Core module - alert model, watchlist store, evaluation, dispatch, scheduling
//!
//! # Module Architecture
//!
//! This module uses **explicit re-exports** instead of glob exports (`pub use module::*`)
//! to keep the public API visible in one place.
//!
//! ## Usage
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{AlertEngine, WatchlistStore, SubscriberId};
//! ```

pub mod alert;
pub mod dispatcher;
pub mod evaluator;
pub mod scheduler;
pub mod watchlist;

// Explicit re-exports for alert module
pub use alert::{Alert, Operator, SubscriberId, Symbol};

// Explicit re-exports for watchlist module
pub use watchlist::{AddOutcome, SharedWatchlist, WatchlistError, WatchlistSnapshot, WatchlistStore};

// Explicit re-exports for evaluator module
pub use evaluator::{distinct_symbols, evaluate, AlertMatch, Evaluation, PriceSnapshot, UnresolvedAlert};

// Explicit re-exports for dispatcher module
pub use dispatcher::{format_trigger_message, DispatchReport, NotificationDispatcher};

// Explicit re-exports for scheduler module
pub use scheduler::{scheduler_task, AlertEngine, EngineTimeouts, SchedulerState, TickOutcome, TickReport};

//! Price Alert Bot
//!
//! Watches market prices for chat subscribers and notifies them once a
//! threshold is crossed:
//! - Watchlist store, evaluation, dispatch and the periodic scheduler (`core`)
//! - Market data and Telegram transports (`adapters`)
//! - Chat command surface (`commands`)
//! - Liveness endpoint (`server`)

pub mod adapters;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod server;

pub use error::AppError;

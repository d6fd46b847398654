//! Telegram Bot API transport
//!
//! - `client` - HTTP client (`sendMessage`, `getUpdates`, `getMe`)
//! - `types` - wire types for the subset of the API in use

pub mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{BotUser, Chat, Message, Update};

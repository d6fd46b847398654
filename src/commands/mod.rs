//! Chat command surface
//!
//! - `parser` - text to `Command`
//! - `handler` - `Command` applied to the watchlist, reply rendering
//! - `poller` - long-polling loop feeding the handler

pub mod handler;
pub mod parser;
pub mod poller;

pub use handler::{render_alert_list, CommandHandler, EMPTY_LIST};
pub use parser::{parse_command, Command, CommandError, USAGE};
pub use poller::command_task;

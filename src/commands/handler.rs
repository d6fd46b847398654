//! Command execution against the watchlist
//!
//! Every handled command produces exactly one reply text. Invalid input never
//! mutates the store.

use tracing::{debug, info};

use super::parser::{parse_command, Command, CommandError, USAGE};
use crate::core::alert::{Alert, SubscriberId};
use crate::core::watchlist::{AddOutcome, SharedWatchlist};

pub const WELCOME: &str = "📈 Welcome to Price Alert Bot!\n\
I'll notify you when a symbol reaches your target price.";

/// Reply for `/list` when the subscriber has no alerts
pub const EMPTY_LIST: &str = "🕸️ No active alerts yet.";

pub const LIST_HEADER: &str = "🔔 Active Alerts:";

/// Render a subscriber's alerts in insertion order
pub fn render_alert_list(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return EMPTY_LIST.to_string();
    }
    let mut out = String::from(LIST_HEADER);
    for alert in alerts {
        out.push_str("\n• ");
        out.push_str(&alert.to_string());
    }
    out
}

fn usage_error(reason: &str) -> String {
    format!("⚠️ {}\n\n{}", reason, USAGE)
}

pub struct CommandHandler {
    store: SharedWatchlist,
}

impl CommandHandler {
    pub fn new(store: SharedWatchlist) -> Self {
        Self { store }
    }

    /// Reply to one incoming message, or `None` for non-command text
    pub async fn handle(&self, subscriber: SubscriberId, text: &str) -> Option<String> {
        let command = match parse_command(text)? {
            Ok(command) => command,
            Err(CommandError::Parse(reason)) => {
                debug!(chat_id = %subscriber, reason = %reason, "[CMD] Rejected command");
                return Some(usage_error(&reason));
            }
        };
        Some(self.execute(subscriber, command).await)
    }

    async fn execute(&self, subscriber: SubscriberId, command: Command) -> String {
        match command {
            Command::Start => {
                self.store.register(subscriber).await;
                info!(chat_id = %subscriber, "[CMD] Subscriber registered");
                format!("{}\n\n{}", WELCOME, USAGE)
            }
            Command::Help => USAGE.to_string(),
            Command::Add {
                symbol,
                operator,
                threshold,
            } => match self.store.add(subscriber, symbol, operator, threshold).await {
                Ok(AddOutcome::Inserted(alert)) => {
                    info!(chat_id = %subscriber, alert = %alert, "[CMD] Alert added");
                    format!("✅ Added alert: {}", alert)
                }
                Ok(AddOutcome::Replaced { previous, current }) => {
                    info!(chat_id = %subscriber, previous = %previous, alert = %current, "[CMD] Alert replaced");
                    format!("🔁 Updated alert: {}", current)
                }
                Err(e) => usage_error(&e.to_string()),
            },
            Command::List => render_alert_list(&self.store.list(subscriber).await),
            Command::Remove { symbol } => match self.store.remove_if_present(subscriber, &symbol).await {
                Some(alert) => {
                    info!(chat_id = %subscriber, alert = %alert, "[CMD] Alert removed");
                    format!("🗑️ Removed alert: {}", alert)
                }
                None => format!("No alert for {}", symbol),
            },
            Command::Unknown(name) => usage_error(&format!("Unknown command: /{}", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alert::Symbol;
    use crate::core::watchlist::WatchlistStore;

    const ALICE: SubscriberId = SubscriberId(1);

    fn handler() -> CommandHandler {
        CommandHandler::new(WatchlistStore::new().into_shared())
    }

    #[tokio::test]
    async fn test_list_empty_returns_canonical_message() {
        let h = handler();
        assert_eq!(h.handle(ALICE, "/list").await.unwrap(), "🕸️ No active alerts yet.");
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let h = handler();
        assert_eq!(
            h.handle(ALICE, "/add TCS >= 4200").await.unwrap(),
            "✅ Added alert: TCS >= 4200"
        );
        h.handle(ALICE, "/add infy <= 1500.5").await.unwrap();

        assert_eq!(
            h.handle(ALICE, "/list").await.unwrap(),
            "🔔 Active Alerts:\n• TCS >= 4200\n• INFY <= 1500.5"
        );
    }

    #[tokio::test]
    async fn test_add_same_symbol_replaces() {
        let h = handler();
        h.handle(ALICE, "/add TCS >= 4200").await.unwrap();
        assert_eq!(
            h.handle(ALICE, "/add TCS <= 3900").await.unwrap(),
            "🔁 Updated alert: TCS <= 3900"
        );
        assert_eq!(
            h.handle(ALICE, "/list").await.unwrap(),
            "🔔 Active Alerts:\n• TCS <= 3900"
        );
    }

    #[tokio::test]
    async fn test_invalid_add_does_not_mutate() {
        let h = handler();
        for text in [
            "/add TCS",
            "/add TCS >= -5",
            "/add TCS >= NaN",
            "/add TCS >= x",
            "/add TCS.NS#BOGUS >= 1",
            "/add FOO/../TCS.NS 4200",
        ] {
            let reply = h.handle(ALICE, text).await.unwrap();
            assert!(reply.contains("Commands:"), "Got: {}", reply);
        }
        assert_eq!(h.store.alert_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove() {
        let h = handler();
        h.handle(ALICE, "/add TCS >= 4200").await.unwrap();

        let reply = h.handle(ALICE, "/remove tcs").await.unwrap();
        assert!(reply.contains("Removed alert: TCS >= 4200"), "Got: {}", reply);

        let reply = h.handle(ALICE, "/remove tcs").await.unwrap();
        assert_eq!(reply, "No alert for TCS");
        assert!(h.store.list(ALICE).await.is_empty());
    }

    #[tokio::test]
    async fn test_start_registers_subscriber() {
        let h = handler();
        let reply = h.handle(ALICE, "/start").await.unwrap();
        assert!(reply.starts_with("📈 Welcome"));
        assert_eq!(h.store.subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn test_subscribers_are_isolated() {
        let h = handler();
        h.handle(ALICE, "/add TCS >= 4200").await.unwrap();
        assert_eq!(h.handle(SubscriberId(2), "/list").await.unwrap(), EMPTY_LIST);
        assert!(h
            .store
            .remove_if_present(SubscriberId(2), &Symbol::parse("TCS").unwrap())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_plain_text_and_unknown() {
        let h = handler();
        assert!(h.handle(ALICE, "what's up").await.is_none());
        let reply = h.handle(ALICE, "/sell TCS").await.unwrap();
        assert!(reply.contains("Unknown command: /sell"), "Got: {}", reply);
    }
}

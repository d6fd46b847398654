//! Notification dispatch
//!
//! Delivers one message per triggered alert. Every send is isolated: a
//! failure or timeout for one subscriber is recorded and the batch moves on.
//! Only delivered entries are handed back for removal from the watchlist.

use std::time::Duration;

use tracing::{info, warn};

use super::evaluator::AlertMatch;
use crate::adapters::errors::MessagingError;
use crate::adapters::traits::Messenger;

/// Outcome of one dispatch batch
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Confirmed by the transport, safe to remove
    pub delivered: Vec<AlertMatch>,
    /// Kept for retry on the next tick
    pub failed: Vec<(AlertMatch, MessagingError)>,
}

/// Text sent to a subscriber when an alert fires
pub fn format_trigger_message(entry: &AlertMatch) -> String {
    format!(
        "🚨 {} reached {:.2} (target {} {})",
        entry.alert.symbol, entry.price, entry.alert.operator, entry.alert.threshold
    )
}

/// Sends trigger messages through a `Messenger`
pub struct NotificationDispatcher<M> {
    messenger: M,
    send_timeout: Duration,
}

impl<M: Messenger> NotificationDispatcher<M> {
    pub fn new(messenger: M, send_timeout: Duration) -> Self {
        Self {
            messenger,
            send_timeout,
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Send one message per entry, isolating failures
    pub async fn dispatch(&self, triggered: Vec<AlertMatch>) -> DispatchReport {
        let mut report = DispatchReport::default();

        for entry in triggered {
            let text = format_trigger_message(&entry);

            match self.send_with_timeout(&entry, &text).await {
                Ok(()) => {
                    info!(
                        subscriber = %entry.subscriber,
                        symbol = %entry.alert.symbol,
                        price = entry.price,
                        "[NOTIFY] Alert delivered"
                    );
                    report.delivered.push(entry);
                }
                Err(e) => {
                    warn!(
                        subscriber = %entry.subscriber,
                        symbol = %entry.alert.symbol,
                        error = %e,
                        "[NOTIFY] Delivery failed, alert kept for retry"
                    );
                    report.failed.push((entry, e));
                }
            }
        }

        report
    }

    async fn send_with_timeout(&self, entry: &AlertMatch, text: &str) -> Result<(), MessagingError> {
        match tokio::time::timeout(self.send_timeout, self.messenger.send_message(entry.subscriber, text)).await {
            Ok(result) => result,
            Err(_) => Err(MessagingError::Timeout(self.send_timeout.as_millis() as u64)),
        }
    }
}

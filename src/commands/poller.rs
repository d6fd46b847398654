//! Long-polling command loop
//!
//! Pulls updates, advances the offset past every update seen and spawns one
//! handler task per text message on a shared `TaskTracker`, so shutdown can
//! drain in-flight replies.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::handler::CommandHandler;
use crate::adapters::traits::{Messenger, UpdateSource};
use crate::config::constants::DEFAULT_POLL_RETRY_DELAY_SECS;
use crate::core::alert::SubscriberId;

/// Command polling task
///
/// Runs until a shutdown signal is received. Poll errors are logged and
/// retried after a fixed delay.
pub async fn command_task<C>(
    client: Arc<C>,
    handler: Arc<CommandHandler>,
    poll_timeout_secs: u64,
    tracker: TaskTracker,
    mut shutdown_rx: broadcast::Receiver<()>,
) where
    C: UpdateSource + Messenger + 'static,
{
    let retry_delay = Duration::from_secs(DEFAULT_POLL_RETRY_DELAY_SECS);
    let mut offset: i64 = 0;

    info!(poll_timeout_secs, "Command loop started");

    loop {
        let polled = tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                info!("[SHUTDOWN] Command loop stopping");
                break;
            }
            polled = client.poll_updates(offset, poll_timeout_secs) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, retry_in_secs = retry_delay.as_secs(), "[CMD] Polling failed");
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        info!("[SHUTDOWN] Command loop stopping");
                        break;
                    }
                    _ = tokio::time::sleep(retry_delay) => continue,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };
            let subscriber = SubscriberId(message.chat.id);

            let client = client.clone();
            let handler = handler.clone();
            tracker.spawn(async move {
                let Some(reply) = handler.handle(subscriber, &text).await else {
                    return;
                };
                match client.send_message(subscriber, &reply).await {
                    Ok(()) => debug!(chat_id = %subscriber, "[CMD] Reply sent"),
                    Err(e) => warn!(chat_id = %subscriber, error = %e, "[CMD] Reply failed"),
                }
            });
        }
    }

    info!("Command loop stopped");
}

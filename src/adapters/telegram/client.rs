//! Telegram Bot API client
//!
//! Implements `Messenger` over `sendMessage` and exposes `get_updates` for the
//! long-polling command loop. The bot token is part of every URL, so it is
//! never logged and the `Debug` impl redacts it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::types::{ApiResponse, BotUser, GetUpdatesRequest, SendMessageRequest, Update};
use crate::adapters::errors::{MessagingError, MessagingResult};
use crate::adapters::traits::{Messenger, UpdateSource};
use crate::config::TelegramConfig;
use crate::core::alert::SubscriberId;

/// Extra slack on top of the long-poll timeout before the HTTP call gives up
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

pub struct TelegramClient {
    http_client: reqwest::Client,
    api_base_url: String,
    token: String,
    request_timeout: Duration,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base_url", &self.api_base_url)
            .field("token", &"REDACTED")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.bot_token.clone(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.token, method)
    }

    /// POST a Bot API method and unwrap the `{ok, result}` envelope
    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> MessagingResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            // reqwest embeds the URL (and with it the token) in its errors
            .map_err(|e| MessagingError::Http(e.without_url()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MessagingError::InvalidResponse(format!("Failed to read response: {}", e.without_url())))?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            MessagingError::InvalidResponse(format!("{} returned {} with invalid JSON: {}", method, status, e))
        })?;

        if !envelope.ok {
            return Err(MessagingError::Rejected(format!(
                "{} failed ({}): {}",
                method,
                envelope.error_code.unwrap_or(status.as_u16() as i64),
                envelope.description.unwrap_or_default()
            )));
        }

        envelope
            .result
            .ok_or_else(|| MessagingError::InvalidResponse(format!("{} returned ok without result", method)))
    }

    /// Identity of the bot behind the token (startup sanity check)
    pub async fn get_me(&self) -> MessagingResult<BotUser> {
        self.call("getMe", &serde_json::json!({}), self.request_timeout)
            .await
    }

    /// Long-poll for updates with `update_id >= offset`
    pub async fn get_updates(&self, offset: i64, poll_timeout_secs: u64) -> MessagingResult<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: poll_timeout_secs,
            allowed_updates: vec!["message"],
        };
        let timeout = Duration::from_secs(poll_timeout_secs) + LONG_POLL_GRACE;
        self.call("getUpdates", &request, timeout).await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, subscriber: SubscriberId, text: &str) -> MessagingResult<()> {
        let request = SendMessageRequest {
            chat_id: subscriber.0,
            text,
        };
        let _sent: serde_json::Value = self
            .call("sendMessage", &request, self.request_timeout)
            .await?;
        debug!(chat_id = %subscriber, "[NOTIFY] Message delivered");
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll_updates(&self, offset: i64, timeout_secs: u64) -> MessagingResult<Vec<Update>> {
        self.get_updates(offset, timeout_secs).await
    }
}

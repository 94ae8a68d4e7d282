//! Telegram Bot API messaging gateway adapter.
//!
//! Implements the [`Messenger`] port over the `sendMessage` method. The
//! gateway is treated as unreliable: non-`ok` answers and transport faults
//! (including the 10 s timeout) surface as per-recipient delivery errors
//! the broadcaster counts without aborting the batch.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{DeliveryError, Messenger};
use crate::domain::user::ExternalId;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Messenger adapter backed by the Telegram Bot HTTP API.
#[derive(Clone)]
pub struct TelegramMessenger {
    client: reqwest::Client,
    send_message_url: String,
}

impl TelegramMessenger {
    /// Build an adapter for the given bot token.
    pub fn new(bot_token: &str) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| DeliveryError::transport(error.to_string()))?;
        Ok(Self {
            client,
            send_message_url: format!("https://api.telegram.org/bot{bot_token}/sendMessage"),
        })
    }

    /// Build an adapter against a custom gateway base URL (used in tests).
    #[cfg(test)]
    fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            send_message_url: format!("{base_url}/sendMessage"),
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn deliver(&self, recipient: &ExternalId, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.send_message_url)
            .json(&json!({
                "chat_id": recipient.as_ref(),
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await
            .map_err(|error| DeliveryError::transport(error.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|error| DeliveryError::transport(error.to_string()))?;
        if body.get("ok").and_then(serde_json::Value::as_bool) == Some(true) {
            debug!(recipient = %recipient, "message delivered");
            Ok(())
        } else {
            let description = body
                .get("description")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("gateway answered without ok=true");
            Err(DeliveryError::rejected(description))
        }
    }
}

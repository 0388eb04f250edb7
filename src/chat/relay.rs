use super::messages::{ChatMessage, ChatReply, WebhookReply, WebhookRequest, DEFAULT_CHANNEL};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info, warn};

/// Relays chat text to the workflow webhook.
///
/// Webhook failures (network errors, timeouts, non-2xx) degrade to a canned
/// reply; only a 2xx body that cannot be decoded is reported as an error.
pub struct ChatRelay {
    http: reqwest::Client,
    webhook_url: String,
}

impl ChatRelay {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build webhook HTTP client")?;

        Ok(Self {
            http,
            webhook_url: webhook_url.into(),
        })
    }

    pub async fn relay(&self, message: ChatMessage) -> Result<ChatReply> {
        info!(
            "Chat message from {} at {}: {}",
            message.user_id, message.timestamp, message.text
        );

        if self.webhook_url.is_empty() {
            warn!("Webhook URL not configured; answering with fallback");
            return Ok(ChatReply::fallback(&message.text));
        }

        let request = WebhookRequest {
            text: message.text.clone(),
            user_id: message.user_id.clone(),
            channel: message
                .channel
                .clone()
                .unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            timestamp: message.timestamp.clone(),
            session_id: message.session_id.clone().unwrap_or_else(|| {
                format!("chat_session_{}", chrono::Utc::now().timestamp_millis())
            }),
        };

        let response = match self.http.post(&self.webhook_url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Error sending chat message to webhook: {}", e);
                return Ok(ChatReply::fallback(&message.text));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Webhook error: {} {}", status, body);
            return Ok(ChatReply::fallback(&message.text));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                error!("Error reading webhook reply: {}", e);
                return Ok(ChatReply::fallback(&message.text));
            }
        };

        let reply: WebhookReply =
            serde_json::from_slice(&body).context("Failed to decode webhook reply")?;

        info!("Webhook reply: {:?}", reply);
        Ok(reply.into())
    }
}

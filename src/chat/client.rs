use super::messages::{ChatMessage, ChatReply, DEFAULT_CHANNEL};
use crate::debug::DebugEvent;
use crate::session::BackendError;
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

const NO_REPLY_TEXT: &str = "Sorry, I could not process your message.";

/// Client side of the chat pane: posts text to the backend's `/chat-message`
pub struct ChatClient {
    http: reqwest::Client,
    backend_url: String,
    /// Keeps one webhook conversation per client
    session_id: String,
}

impl ChatClient {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            session_id: format!("chat_session_{}", Uuid::new_v4()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send `text` and return the assistant's reply text
    pub async fn send(&self, text: &str) -> Result<String, BackendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::InvalidRequest(
                "message text is empty".to_string(),
            ));
        }

        let now = Utc::now();
        let message = ChatMessage {
            text: text.to_string(),
            user_id: format!("chat_user_{}", now.timestamp_millis()),
            channel: Some(DEFAULT_CHANNEL.to_string()),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            session_id: Some(self.session_id.clone()),
        };

        DebugEvent::new(
            "CHAT_MESSAGE",
            "User",
            "Frontend",
            json!({ "message": message.text, "timestamp": message.timestamp }),
        )
        .emit();

        let url = format!("{}/chat-message", self.backend_url);
        let response = self.http.post(&url).json(&message).send().await.map_err(|e| {
            error!("Error sending chat message: {}", e);
            BackendError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Chat endpoint responded with {}", status);
            return Err(BackendError::Status {
                endpoint: "/chat-message",
                status,
            });
        }

        let reply: ChatReply = response.json().await.map_err(BackendError::Transport)?;

        DebugEvent::new(
            "CHAT_RESPONSE",
            "Backend",
            "Frontend",
            json!({ "text": reply.text, "status": reply.status }),
        )
        .emit();

        if reply.text.is_empty() {
            Ok(NO_REPLY_TEXT.to_string())
        } else {
            Ok(reply.text)
        }
    }
}

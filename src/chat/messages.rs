use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL: &str = "chat_channel";

/// Chat text sent by the client to `/chat-message`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Payload forwarded to the workflow webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub text: String,
    pub user_id: String,
    pub channel: String,
    pub timestamp: String,
    pub session_id: String,
}

/// Webhook reply; every field is optional on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookReply {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Reply returned to the chat client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub status: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl ChatReply {
    /// Canned reply used when the webhook cannot be reached
    pub fn fallback(text: &str) -> Self {
        Self {
            text: format!(
                "I understand you said: \"{}\". I'm your AI assistant and I'm here to help you!",
                text
            ),
            status: "success".to_string(),
            audio_url: None,
        }
    }

    pub fn internal_error() -> Self {
        Self {
            text: "Sorry, I encountered an error while processing your message.".to_string(),
            status: "error".to_string(),
            audio_url: None,
        }
    }
}

impl From<WebhookReply> for ChatReply {
    fn from(reply: WebhookReply) -> Self {
        Self {
            text: reply
                .text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "I received your message.".to_string()),
            status: reply
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "success".to_string()),
            audio_url: reply.audio_url.filter(|u| !u.is_empty()),
        }
    }
}

//! Chat relay
//!
//! - `ChatRelay` (backend): forwards chat text to the workflow webhook and
//!   falls back to a canned reply when the webhook is unavailable
//! - `ChatClient` (client): posts chat text to the backend

mod client;
mod messages;
mod relay;

pub use client::ChatClient;
pub use messages::{ChatMessage, ChatReply, WebhookReply, WebhookRequest, DEFAULT_CHANNEL};
pub use relay::ChatRelay;

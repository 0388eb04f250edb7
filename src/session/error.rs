use super::backend::BackendError;
use super::state::SessionState;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Config(String),

    #[error("Session already active ({0})")]
    Busy(SessionState),

    #[error("No bring-up in progress ({0})")]
    NotConnecting(SessionState),

    #[error("Failed to fetch token from backend: {0}")]
    Token(BackendError),

    #[error("Failed to join channel: {0:#}")]
    Join(anyhow::Error),

    #[error("Could not start microphone: {0:#}")]
    Microphone(anyhow::Error),

    #[error("Failed to publish audio: {0:#}")]
    Publish(anyhow::Error),

    #[error("Failed to start AI agent: {0}")]
    AgentStart(BackendError),

    #[error("AI Agent did not join within {}s", .0.as_secs())]
    AgentTimeout(Duration),

    #[error("Could not connect to agent: {0:#}")]
    Subscribe(anyhow::Error),
}

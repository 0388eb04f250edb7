use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnecting,
    Error,
}

impl SessionState {
    /// Bring-up may only begin from a resting state
    pub fn can_start(self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Error)
    }

    /// Whether the start/stop control should accept input
    pub fn controls_enabled(self) -> bool {
        !matches!(self, SessionState::Connecting | SessionState::Disconnecting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "IDLE",
            SessionState::Connecting => "CONNECTING",
            SessionState::Connected => "CONNECTED",
            SessionState::Disconnecting => "DISCONNECTING",
            SessionState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Snapshot published to observers on every change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub text: String,
    pub muted: bool,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            text: STATUS_DISCONNECTED.to_string(),
            muted: true,
        }
    }
}

pub const STATUS_INITIALIZING: &str = "Status: Initializing...";
pub const STATUS_GETTING_TOKEN: &str = "Status: Getting token...";
pub const STATUS_JOINING: &str = "Status: Joining channel...";
pub const STATUS_STARTING_MIC: &str = "Status: Starting microphone...";
pub const STATUS_STARTING_AGENT: &str = "Status: Starting AI agent...";
pub const STATUS_WAITING_AGENT: &str = "Status: Waiting for AI Agent to join...";
pub const STATUS_CONNECTED: &str = "Status: AI Agent connected";
pub const STATUS_DISCONNECTING: &str = "Status: Disconnecting...";
pub const STATUS_DISCONNECTED: &str = "Status: Disconnected";

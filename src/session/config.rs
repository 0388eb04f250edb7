use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sample value shipped in templates; counts as unconfigured
pub const BACKEND_URL_PLACEHOLDER: &str = "https://your-backend-server.com";

/// Configuration for a client-side voice session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the bridge backend (token, agent and chat endpoints)
    pub backend_url: String,

    /// Media platform application identity used to join channels
    pub app_id: String,

    /// How long to wait for the agent to publish audio after it was started
    /// Default: 30 seconds
    pub agent_join_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(backend_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    pub fn agent_join_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_join_timeout_secs)
    }

    /// Check static settings before any network call is made
    pub fn validate(&self) -> Result<(), String> {
        if self.app_id.trim().is_empty() {
            return Err("App ID is not configured. Set the media platform app id.".to_string());
        }
        if self.backend_url.trim().is_empty() || self.backend_url == BACKEND_URL_PLACEHOLDER {
            return Err("Backend URL is not configured. Set the bridge backend URL.".to_string());
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            app_id: String::new(),
            agent_join_timeout_secs: 30,
        }
    }
}

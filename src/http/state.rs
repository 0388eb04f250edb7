use crate::agent::AgentApiClient;
use crate::chat::ChatRelay;
use crate::config::Config;
use crate::token::{SignedTokenIssuer, TokenIssuer};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Absent when no signing certificate is configured
    pub tokens: Option<Arc<dyn TokenIssuer>>,

    pub agents: Arc<AgentApiClient>,

    pub chat: Arc<ChatRelay>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let tokens: Option<Arc<dyn TokenIssuer>> = if config.rtc.has_certificate() {
            let issuer = SignedTokenIssuer::new(
                config.rtc.app_id.clone(),
                config.rtc.app_certificate.clone(),
                config.rtc.token_ttl_secs,
            )
            .context("Failed to create token issuer")?;
            Some(Arc::new(issuer))
        } else {
            warn!("App certificate not configured; /generate-token will fail");
            None
        };

        if config.webhook.url.is_empty() {
            warn!("Webhook URL not configured; chat replies will use the fallback text");
        }

        let agents = AgentApiClient::new(
            &config.rtc.app_id,
            config.agent.clone(),
            config.tts.clone(),
            config.webhook.url.clone(),
        )
        .context("Failed to create agent API client")?;

        let chat = ChatRelay::new(
            config.webhook.url.clone(),
            Duration::from_secs(config.webhook.timeout_secs),
        )?;

        Ok(Self {
            tokens,
            agents: Arc::new(agents),
            chat: Arc::new(chat),
        })
    }
}

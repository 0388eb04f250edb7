use super::messages::{
    AgentProperties, AsrProperties, JoinRequest, JoinResponse, LlmParams, LlmProperties,
    SystemMessage, TtsParams, TtsProperties, VendorError,
};
use crate::config::{AgentConfig, TtsConfig};
use crate::debug::redact_token;
use base64::Engine;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Outbound timeout for vendor calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum AgentApiError {
    #[error("Agent API responded with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Agent API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid agent id: {0:?}")]
    InvalidAgentId(String),
}

/// Client for the vendor's conversational AI agent REST API
pub struct AgentApiClient {
    http: reqwest::Client,
    project_url: String,
    authorization: String,
    agent: AgentConfig,
    tts: TtsConfig,
    webhook_url: String,
}

impl AgentApiClient {
    pub fn new(
        app_id: &str,
        agent: AgentConfig,
        tts: TtsConfig,
        webhook_url: impl Into<String>,
    ) -> Result<Self, AgentApiError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let project_url = format!(
            "{}/projects/{}",
            agent.api_base_url.trim_end_matches('/'),
            app_id
        );

        Ok(Self {
            http,
            project_url,
            authorization: basic_auth(&agent.customer_id, &agent.customer_secret),
            agent,
            tts,
            webhook_url: webhook_url.into(),
        })
    }

    /// Build the join payload for an agent attached to `channel`
    pub fn join_request(&self, channel: &str, token: &str) -> JoinRequest {
        JoinRequest {
            name: format!(
                "agent_{}_{}",
                self.tts.vendor,
                chrono::Utc::now().timestamp_millis()
            ),
            properties: AgentProperties {
                channel: channel.to_string(),
                token: token.to_string(),
                agent_rtc_uid: self.agent.agent_rtc_uid.clone(),
                remote_rtc_uids: self.agent.remote_rtc_uids.clone(),
                enable_string_uid: false,
                idle_timeout: self.agent.idle_timeout_secs,
                mute_agent: false,
                llm: LlmProperties {
                    url: self.webhook_url.clone(),
                    api_key: "unused".to_string(),
                    system_messages: vec![SystemMessage {
                        role: "system".to_string(),
                        content: self.agent.system_prompt.clone(),
                    }],
                    greeting_message: self.agent.greeting.clone(),
                    failure_message: self.agent.failure_message.clone(),
                    max_history: self.agent.max_history,
                    params: LlmParams {
                        model: self.agent.model.clone(),
                    },
                },
                asr: AsrProperties {
                    language: self.agent.asr_language.clone(),
                },
                tts: TtsProperties {
                    vendor: self.tts.vendor.clone(),
                    params: TtsParams {
                        key: self.tts.api_key.clone(),
                        voice_id: self.tts.voice_id.clone(),
                    },
                },
            },
        }
    }

    /// Start an agent in `channel`. Returns the vendor status code along with
    /// the parsed reply.
    pub async fn start(
        &self,
        channel: &str,
        token: &str,
    ) -> Result<(StatusCode, JoinResponse), AgentApiError> {
        let request = self.join_request(channel, token);
        let url = format!("{}/join", self.project_url);

        info!(
            "Starting agent {} in channel {} (token={})",
            request.name,
            channel,
            redact_token(token)
        );
        if !tts_key_looks_valid(&self.tts.api_key) {
            warn!("TTS API key looks malformed (expected an sk_ prefix)");
        }

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = vendor_message(response).await;
            error!("Agent API error on join: {} {}", status, message);
            return Err(AgentApiError::Status { status, message });
        }

        let reply: JoinResponse = response.json().await?;
        info!(
            "Agent started: {} (status={})",
            reply.agent_id,
            reply.status.as_deref().unwrap_or("unknown")
        );

        Ok((status, reply))
    }

    /// Remove an agent from its channel
    pub async fn stop(&self, agent_id: &str) -> Result<(), AgentApiError> {
        if !agent_id_is_valid(agent_id) {
            warn!("Rejecting stop for malformed agent id {:?}", agent_id);
            return Err(AgentApiError::InvalidAgentId(agent_id.to_string()));
        }
        let url = format!("{}/agents/{}/leave", self.project_url, agent_id);

        info!("Stopping agent with ID: {}", agent_id);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = vendor_message(response).await;
            error!("Agent API error on leave: {} {}", status, message);
            return Err(AgentApiError::Status { status, message });
        }

        info!("Agent stopped: {}", agent_id);
        Ok(())
    }
}

fn basic_auth(customer_id: &str, customer_secret: &str) -> String {
    let credentials = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", customer_id, customer_secret));
    format!("Basic {}", credentials)
}

/// Agent ids are embedded in the vendor URL path, so only a single plain
/// segment is accepted
fn agent_id_is_valid(agent_id: &str) -> bool {
    !agent_id.is_empty()
        && agent_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn tts_key_looks_valid(key: &str) -> bool {
    key.len() > 10 && key.starts_with("sk_")
}

async fn vendor_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<VendorError>(&body) {
        Ok(VendorError {
            message: Some(message),
            ..
        }) => message,
        Ok(VendorError {
            reason: Some(reason),
            ..
        }) => reason,
        _ if body.is_empty() => "Unknown error".to_string(),
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        // "id:secret" in base64
        assert_eq!(basic_auth("id", "secret"), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn test_tts_key_format_check() {
        assert!(tts_key_looks_valid("sk_0123456789abcdef"));
        assert!(!tts_key_looks_valid("sk_short"));
        assert!(!tts_key_looks_valid("0123456789abcdef"));
    }

    #[test]
    fn test_agent_id_must_be_single_segment() {
        assert!(agent_id_is_valid("A42FH3_x-9"));
        assert!(!agent_id_is_valid(""));
        assert!(!agent_id_is_valid("../other/agents/x"));
        assert!(!agent_id_is_valid("a/b"));
        assert!(!agent_id_is_valid("a%2Fb"));
        assert!(!agent_id_is_valid("a?b"));
    }
}

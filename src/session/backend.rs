use crate::debug::{redact_token, DebugEvent};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{endpoint} responded with status {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result of a successful agent start
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentStarted {
    pub agent_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Token and agent lifecycle operations offered by the bridge backend
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    async fn generate_token(&self, channel: &str) -> Result<String, BackendError>;

    async fn start_agent(&self, channel: &str, token: &str) -> Result<AgentStarted, BackendError>;

    async fn stop_agent(&self, agent_id: &str) -> Result<(), BackendError>;
}

#[derive(Deserialize)]
struct TokenReply {
    token: String,
}

/// `BackendApi` over HTTP. Every call is reported on the debug event stream.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// POST `body` to `endpoint`, decode the reply and log both ends
    async fn post_json<R: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        body: &Value,
    ) -> Result<R, BackendError> {
        let url = format!("{}{}", self.base_url, endpoint);

        DebugEvent::new(
            "API_CALL",
            "Frontend",
            "Backend",
            json!({ "url": url, "method": "POST" }),
        )
        .emit();

        let response = match self.http.post(&url).json(body).send().await {
            Ok(response) => response,
            Err(e) => {
                DebugEvent::new(
                    "API_ERROR",
                    "Backend",
                    "Frontend",
                    json!({ "url": url, "error": e.to_string() }),
                )
                .emit();
                return Err(e.into());
            }
        };

        let status = response.status();
        DebugEvent::new(
            "API_RESPONSE",
            "Backend",
            "Frontend",
            json!({ "url": url, "status": status.as_u16(), "ok": status.is_success() }),
        )
        .emit();

        if !status.is_success() {
            error!("{} responded with {}", endpoint, status);
            return Err(BackendError::Status { endpoint, status });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("{}: {}", endpoint, e)))
    }
}

#[async_trait::async_trait]
impl BackendApi for HttpBackend {
    async fn generate_token(&self, channel: &str) -> Result<String, BackendError> {
        DebugEvent::new(
            "TOKEN_REQUEST",
            "Frontend",
            "Backend",
            json!({ "channelName": channel }),
        )
        .emit();

        let reply: TokenReply = self
            .post_json("/generate-token", &json!({ "channelName": channel }))
            .await?;

        if reply.token.is_empty() {
            return Err(BackendError::InvalidResponse(
                "/generate-token returned an empty token".to_string(),
            ));
        }

        Ok(reply.token)
    }

    async fn start_agent(&self, channel: &str, token: &str) -> Result<AgentStarted, BackendError> {
        DebugEvent::new(
            "AGENT_START_REQUEST",
            "Frontend",
            "Backend",
            json!({ "channelName": channel, "token": redact_token(token) }),
        )
        .emit();

        let started: AgentStarted = self
            .post_json(
                "/start-agent",
                &json!({ "channelName": channel, "token": token }),
            )
            .await?;

        info!("AI Agent started with ID: {}", started.agent_id);
        DebugEvent::new(
            "AGENT_STARTED",
            "Backend",
            "Agent",
            json!({ "agentId": started.agent_id, "status": started.status }),
        )
        .emit();

        Ok(started)
    }

    async fn stop_agent(&self, agent_id: &str) -> Result<(), BackendError> {
        DebugEvent::new(
            "AGENT_STOP_REQUEST",
            "Frontend",
            "Backend",
            json!({ "agentId": agent_id }),
        )
        .emit();

        let _: Value = self
            .post_json("/stop-agent", &json!({ "agentId": agent_id }))
            .await?;

        Ok(())
    }
}

use super::state::AppState;
use crate::agent::AgentApiError;
use crate::chat::{ChatMessage, ChatReply};
use crate::debug::redact_token;
use crate::token::{Role, TokenError};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Join credentials grant any uid
const TOKEN_UID: u32 = 0;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenRequest {
    pub channel_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateTokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAgentRequest {
    pub channel_name: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopAgentRequest {
    pub agent_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StopAgentResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn internal_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Unwrap a JSON body, answering malformed ones in the `{error}` shape
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(error_response(rejection.status(), rejection.body_text()))
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /generate-token
/// Issue a join credential for a channel
pub async fn generate_token(
    State(state): State<AppState>,
    body: Result<Json<GenerateTokenRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let Some(tokens) = state.tokens.as_ref() else {
        error!("Token requested but no app certificate is configured");
        return internal_error(TokenError::MissingCertificate.to_string());
    };

    info!("Generating token for channel: {}", req.channel_name);

    match tokens.issue(&req.channel_name, TOKEN_UID, Role::Publisher) {
        Ok(token) => {
            info!("Token generated successfully");
            (StatusCode::OK, Json(GenerateTokenResponse { token })).into_response()
        }
        Err(e) => {
            error!("Token generation failed: {}", e);
            internal_error("Failed to generate RTC token.")
        }
    }
}

/// POST /start-agent
/// Start the conversational agent in a channel
pub async fn start_agent(
    State(state): State<AppState>,
    body: Result<Json<StartAgentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    info!(
        "Agent start requested for channel {} (token={})",
        req.channel_name,
        redact_token(&req.token)
    );

    match state.agents.start(&req.channel_name, &req.token).await {
        Ok((status, reply)) => (status, Json(reply)).into_response(),
        Err(e) => {
            error!("Failed to start agent: {}", e);
            internal_error(e.to_string())
        }
    }
}

/// POST /stop-agent
/// Remove an agent from its channel
pub async fn stop_agent(
    State(state): State<AppState>,
    body: Result<Json<StopAgentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match state.agents.stop(&req.agent_id).await {
        Ok(()) => (StatusCode::OK, Json(StopAgentResponse { success: true })).into_response(),
        Err(e @ AgentApiError::InvalidAgentId(_)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!("Failed to stop agent {}: {}", req.agent_id, e);
            internal_error(e.to_string())
        }
    }
}

/// POST /chat-message
/// Relay chat text to the workflow webhook
pub async fn chat_message(
    State(state): State<AppState>,
    body: Result<Json<ChatMessage>, JsonRejection>,
) -> impl IntoResponse {
    let message = match json_body(body) {
        Ok(message) => message,
        Err(response) => return response,
    };

    match state.chat.relay(message).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            error!("Chat relay failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply::internal_error()),
            )
                .into_response()
        }
    }
}

/// POST /test-webhook
/// Local stand-in for the workflow webhook
pub async fn test_webhook(Json(body): Json<Value>) -> impl IntoResponse {
    info!("Test webhook received: {}", body);

    Json(json!({
        "text": "This is a test response from the webhook",
        "audio_url": null,
        "status": "success"
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

//! HTTP API consumed by the voice/chat client
//!
//! - POST /generate-token - Issue a channel join credential
//! - POST /start-agent - Start the conversational agent in a channel
//! - POST /stop-agent - Stop a running agent
//! - POST /chat-message - Relay chat text to the workflow webhook
//! - POST /test-webhook - Canned webhook reply for local runs
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, GenerateTokenResponse, StopAgentResponse};
pub use routes::create_router;
pub use state::AppState;

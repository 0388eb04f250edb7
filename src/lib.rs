pub mod agent;
pub mod chat;
pub mod config;
pub mod debug;
pub mod http;
pub mod session;
pub mod token;

pub use agent::{AgentApiClient, AgentApiError};
pub use chat::{ChatClient, ChatMessage, ChatRelay, ChatReply};
pub use config::Config;
pub use debug::DebugEvent;
pub use http::{create_router, AppState};
pub use session::{
    BackendApi, ClientConfig, HttpBackend, MediaEngine, SessionController, SessionError,
    SessionState,
};
pub use token::{SignedTokenIssuer, TokenIssuer};

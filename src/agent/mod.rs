pub mod client;
pub mod messages;

pub use client::{AgentApiClient, AgentApiError};
pub use messages::{JoinRequest, JoinResponse};

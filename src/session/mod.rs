//! Client-side voice session management
//!
//! This module provides the `SessionController` that sequences a voice
//! session against the bridge backend and the media platform:
//! - Credential acquisition from the backend
//! - Channel join and microphone publish through the transport collaborators
//! - Remote agent start/stop through the backend
//! - Reverse-order, best-effort teardown on stop or failure

mod backend;
mod config;
mod controller;
mod error;
mod state;
mod transport;

pub use backend::{AgentStarted, BackendApi, BackendError, HttpBackend};
pub use config::{ClientConfig, BACKEND_URL_PLACEHOLDER};
pub use controller::{SessionController, CHANNEL_PREFIX};
pub use error::SessionError;
pub use state::{SessionState, SessionStatus};
pub use transport::{
    AudioCapture, EventSink, MediaEngine, MediaKind, RemoteUser, SessionEvent, SignalingClient,
    TransportEvent,
};

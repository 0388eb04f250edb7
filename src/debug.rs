//! Debug event stream
//!
//! Every request/response crossing the client/server boundary and every user
//! action is reported as a `{event, source, destination, data}` record. The
//! records are plain `tracing` events under the `debug_event` target, so any
//! subscriber (console, JSON, file) can display or export them. Nothing on a
//! success or failure path depends on them.

use serde::Serialize;
use serde_json::Value;

/// Target used for all debug events, for filtering (`RUST_LOG=debug_event=info`)
pub const TARGET: &str = "debug_event";

/// A single observability record
#[derive(Debug, Clone, Serialize)]
pub struct DebugEvent {
    pub event: String,
    pub source: String,
    pub destination: String,
    pub data: Value,
}

impl DebugEvent {
    pub fn new(
        event: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            event: event.into(),
            source: source.into(),
            destination: destination.into(),
            data,
        }
    }

    /// Fire-and-forget
    pub fn emit(&self) {
        tracing::info!(
            target: TARGET,
            event = %self.event,
            source = %self.source,
            destination = %self.destination,
            data = %self.data,
            "{} {} -> {}",
            self.event,
            self.source,
            self.destination
        );
    }
}

/// Shorten a credential for logs: first 20 characters plus `...`
pub fn redact_token(token: &str) -> String {
    match token.char_indices().nth(20) {
        Some((idx, _)) => format!("{}...", &token[..idx]),
        None => token.to_string(),
    }
}

use super::state::SessionStatus;
use anyhow::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tracing::warn;

/// Kind of media a remote participant published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

/// A remote participant as reported by the signaling client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub uid: String,
}

impl fmt::Display for RemoteUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uid)
    }
}

/// Notifications produced by transport collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    UserPublished { user: RemoteUser, media: MediaKind },
    UserUnpublished { user: RemoteUser, media: MediaKind },
    /// Local capture volume, 0-100
    Volume { level: u8 },
}

/// A transport event tagged with the channel of the session that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub channel: String,
    pub event: TransportEvent,
}

/// Handle given to collaborators for reporting events back to the controller.
///
/// Publish events are tagged with the channel the sink was created for, so
/// events from a torn-down session can be told apart from the active one, and
/// go onto a bounded queue drained by [`SessionController::wait_for_agent`] or
/// [`SessionController::next_event`]. When the queue is full they are dropped.
///
/// Volume levels bypass the queue: they update the session's mute flag in
/// place, so only the latest level is kept and nothing has to drain them.
/// Once the session is torn down they are ignored.
///
/// [`SessionController::wait_for_agent`]: super::SessionController::wait_for_agent
/// [`SessionController::next_event`]: super::SessionController::next_event
#[derive(Clone)]
pub struct EventSink {
    channel: String,
    events: mpsc::Sender<SessionEvent>,
    status: Arc<watch::Sender<SessionStatus>>,
    live: Arc<AtomicBool>,
}

impl EventSink {
    pub(crate) fn new(
        channel: impl Into<String>,
        events: mpsc::Sender<SessionEvent>,
        status: Arc<watch::Sender<SessionStatus>>,
        live: Arc<AtomicBool>,
    ) -> Self {
        Self {
            channel: channel.into(),
            events,
            status,
            live,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns false when the event was not delivered: the session is gone
    /// or the queue is full
    pub fn send(&self, event: TransportEvent) -> bool {
        if let TransportEvent::Volume { level } = event {
            return self.volume(level);
        }

        let event = SessionEvent {
            channel: self.channel.clone(),
            event,
        };
        match self.events.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    "Session event queue full, dropping {:?} from {}",
                    dropped.event, dropped.channel
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn user_published(&self, user: RemoteUser, media: MediaKind) -> bool {
        self.send(TransportEvent::UserPublished { user, media })
    }

    pub fn user_unpublished(&self, user: RemoteUser, media: MediaKind) -> bool {
        self.send(TransportEvent::UserUnpublished { user, media })
    }

    /// Record the latest capture level; 0 means muted
    pub fn volume(&self, level: u8) -> bool {
        let muted = level == 0;
        let mut applied = false;

        // The liveness check runs under the watch lock so it cannot race the
        // final mute written by teardown.
        self.status.send_if_modified(|status| {
            if !self.live.load(Ordering::Acquire) {
                return false;
            }
            applied = true;
            if status.muted == muted {
                return false;
            }
            status.muted = muted;
            true
        });

        applied
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("channel", &self.channel)
            .finish()
    }
}

/// Real-time signaling client (join/publish/subscribe/leave)
///
/// Implementations wrap the media platform's SDK. `leave` on a client that
/// never joined must succeed.
#[async_trait::async_trait]
pub trait SignalingClient: Send {
    /// Register the sink that receives user published/unpublished events
    fn on_remote_publish(&mut self, sink: EventSink);

    /// Drop the registered sink; no events are delivered afterwards
    fn off_remote_publish(&mut self);

    async fn join(
        &mut self,
        app_id: &str,
        channel: &str,
        token: &str,
        uid: Option<u32>,
    ) -> Result<()>;

    async fn publish(&mut self, track: &dyn AudioCapture) -> Result<()>;

    async fn subscribe(&mut self, user: &RemoteUser, media: MediaKind) -> Result<()>;

    async fn leave(&mut self) -> Result<()>;
}

/// Local microphone track
#[async_trait::async_trait]
pub trait AudioCapture: Send + Sync {
    /// Identifier used when publishing the track
    fn track_id(&self) -> &str;

    /// Register the sink that receives volume levels
    fn on_volume(&mut self, sink: EventSink);

    async fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Release the device; the track is unusable afterwards
    fn close(&mut self) -> Result<()>;
}

/// Factory for transport resources owned by a session
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    fn create_client(&self) -> Box<dyn SignalingClient>;

    /// Acquire the microphone; fails when access is denied or no device exists
    async fn create_microphone(&self) -> Result<Box<dyn AudioCapture>>;
}

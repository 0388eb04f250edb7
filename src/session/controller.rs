use super::backend::BackendApi;
use super::config::ClientConfig;
use super::error::SessionError;
use super::state::*;
use super::transport::{
    AudioCapture, EventSink, MediaEngine, MediaKind, RemoteUser, SessionEvent, SignalingClient,
    TransportEvent,
};
use crate::debug::DebugEvent;
use chrono::Utc;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Prefix of generated channel names
pub const CHANNEL_PREFIX: &str = "support_session_";

/// Publish events held before sinks start dropping them
const EVENT_QUEUE_CAPACITY: usize = 32;

/// Resources owned by the active session. Every field is populated during
/// bring-up and cleared by teardown.
struct Session {
    channel_name: Option<String>,
    credential: Option<String>,
    agent_id: Option<String>,
    client: Option<Box<dyn SignalingClient>>,
    capture: Option<Box<dyn AudioCapture>>,
    /// Cleared at the start of teardown; sinks stop applying volume after
    live: Arc<AtomicBool>,
}

impl Session {
    fn new() -> Self {
        Self {
            channel_name: None,
            credential: None,
            agent_id: None,
            client: None,
            capture: None,
            live: Arc::new(AtomicBool::new(false)),
        }
    }

    fn holds_resources(&self) -> bool {
        self.agent_id.is_some() || self.client.is_some() || self.capture.is_some()
    }
}

/// Drives one voice session through bring-up and teardown.
///
/// Operations take `&mut self`, so at most one bring-up or teardown runs at a
/// time; `start` additionally refuses to run unless the state is Idle or
/// Error.
///
/// Remote publish events arrive on a bounded controller-owned queue and are
/// applied by [`SessionController::wait_for_agent`], or by callers feeding
/// [`SessionController::next_event`] into [`SessionController::handle_event`].
/// Capture volume is applied by the sink itself, so the mute flag tracks the
/// microphone with nothing draining the queue.
pub struct SessionController {
    config: ClientConfig,
    backend: Arc<dyn BackendApi>,
    media: Arc<dyn MediaEngine>,
    state: SessionState,
    status_text: String,
    session: Session,
    last_channel_stamp: i64,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
    status_tx: Arc<watch::Sender<SessionStatus>>,
}

impl SessionController {
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn BackendApi>,
        media: Arc<dyn MediaEngine>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (status_tx, _) = watch::channel(SessionStatus::default());

        Self {
            config,
            backend,
            media,
            state: SessionState::Idle,
            status_text: STATUS_DISCONNECTED.to_string(),
            session: Session::new(),
            last_channel_stamp: 0,
            events_tx,
            events_rx,
            status_tx: Arc::new(status_tx),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// True whenever no capture is held or the capture reports silence
    pub fn is_muted(&self) -> bool {
        self.status_tx.borrow().muted
    }

    pub fn channel_name(&self) -> Option<&str> {
        self.session.channel_name.as_deref()
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.session.agent_id.as_deref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.session.credential.as_deref()
    }

    /// Observe state, status text and mute changes
    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// Start a session and wait for the agent to publish audio
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        self.start().await?;
        self.wait_for_agent().await
    }

    /// Run bring-up up to and including the agent start. On success the
    /// session is left in Connecting until the agent publishes audio.
    ///
    /// Any failure moves the session to Error, releases whatever was acquired
    /// and is returned to the caller.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if !self.state.can_start() {
            warn!("Ignoring start request while {}", self.state);
            return Err(SessionError::Busy(self.state));
        }

        DebugEvent::new(
            "USER_ACTION",
            "User",
            "Frontend",
            json!({ "action": "start_call" }),
        )
        .emit();

        self.transition(SessionState::Connecting, STATUS_INITIALIZING);

        match self.bring_up().await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e).await),
        }
    }

    async fn bring_up(&mut self) -> Result<(), SessionError> {
        self.config.validate().map_err(SessionError::Config)?;

        let channel = self.next_channel_name();
        info!("Starting session in channel {}", channel);
        self.session.channel_name = Some(channel.clone());
        self.session.live = Arc::new(AtomicBool::new(true));

        self.set_status(STATUS_GETTING_TOKEN);
        let token = self
            .backend
            .generate_token(&channel)
            .await
            .map_err(SessionError::Token)?;
        self.session.credential = Some(token.clone());

        self.set_status(STATUS_JOINING);
        let mut client = self.media.create_client();
        client.on_remote_publish(self.sink_for(&channel));
        let joined = client.join(&self.config.app_id, &channel, &token, None).await;
        self.session.client = Some(client);
        joined.map_err(SessionError::Join)?;

        self.set_status(STATUS_STARTING_MIC);
        let mut capture = self
            .media
            .create_microphone()
            .await
            .map_err(SessionError::Microphone)?;
        capture.on_volume(self.sink_for(&channel));
        let started = capture.start().await;
        self.session.capture = Some(capture);
        started.map_err(SessionError::Microphone)?;

        if let (Some(client), Some(capture)) = (
            self.session.client.as_mut(),
            self.session.capture.as_deref(),
        ) {
            client.publish(capture).await.map_err(SessionError::Publish)?;
        }
        self.set_muted(false);

        self.set_status(STATUS_STARTING_AGENT);
        let agent = self
            .backend
            .start_agent(&channel, &token)
            .await
            .map_err(SessionError::AgentStart)?;
        self.session.agent_id = Some(agent.agent_id);

        self.set_status(STATUS_WAITING_AGENT);
        Ok(())
    }

    /// Process events until the agent's audio is subscribed, bounded by the
    /// configured join timeout. Expiry counts as a bring-up failure.
    pub async fn wait_for_agent(&mut self) -> Result<(), SessionError> {
        let timeout = self.config.agent_join_timeout();
        let deadline = Instant::now() + timeout;

        loop {
            match self.state {
                SessionState::Connected => return Ok(()),
                SessionState::Connecting => {}
                other => return Err(SessionError::NotConnecting(other)),
            }

            let event = match tokio::time::timeout_at(deadline, self.events_rx.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) | Err(_) => {
                    warn!("No remote audio within {}s", timeout.as_secs());
                    return Err(self.fail(SessionError::AgentTimeout(timeout)).await);
                }
            };

            self.handle_event(event).await?;
        }
    }

    /// Next queued publish event, for callers driving the session themselves.
    /// Volume never shows up here.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply a collaborator event. Events tagged with any channel other than
    /// the active session's are dropped.
    ///
    /// Returns an error only when the event caused the session to fail.
    pub async fn handle_event(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        if self.session.channel_name.as_deref() != Some(event.channel.as_str()) {
            debug!("Dropping stale event from channel {}", event.channel);
            return Ok(());
        }

        match event.event {
            TransportEvent::Volume { level } => {
                self.set_muted(level == 0);
                Ok(())
            }
            TransportEvent::UserPublished { user, media } => {
                self.on_user_published(user, media).await
            }
            TransportEvent::UserUnpublished { user, media } => {
                info!("Remote user {} unpublished {:?}", user, media);
                Ok(())
            }
        }
    }

    async fn on_user_published(
        &mut self,
        user: RemoteUser,
        media: MediaKind,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Connecting {
            debug!("Ignoring publish from {} while {}", user, self.state);
            return Ok(());
        }
        if media != MediaKind::Audio {
            debug!("Ignoring {:?} published by {}", media, user);
            return Ok(());
        }
        let Some(client) = self.session.client.as_mut() else {
            return Ok(());
        };

        if let Err(e) = client.subscribe(&user, media).await {
            error!("Failed to subscribe to remote user {}: {:#}", user, e);
            return Err(self.fail(SessionError::Subscribe(e)).await);
        }

        info!("Subscribed to and playing AI agent audio: {}", user);
        self.transition(SessionState::Connected, STATUS_CONNECTED);

        DebugEvent::new(
            "AUDIO_CONNECTED",
            "Agent",
            "Frontend",
            json!({ "userId": user.uid, "mediaType": "audio", "state": "CONNECTED" }),
        )
        .emit();

        Ok(())
    }

    /// Tear the session down and return to Idle. Accepted in any state; with
    /// nothing held it only performs the final transition.
    pub async fn stop(&mut self) {
        DebugEvent::new(
            "USER_ACTION",
            "User",
            "Frontend",
            json!({ "action": "end_call" }),
        )
        .emit();

        self.teardown(None).await;
    }

    /// Release everything before the controller goes away
    pub async fn shutdown(mut self) {
        if self.session.holds_resources() {
            info!("Releasing session resources on shutdown");
            self.teardown(None).await;
        }
    }

    async fn fail(&mut self, error: SessionError) -> SessionError {
        error!("Error during connection process: {}", error);
        self.teardown(Some(format!("Error: {}", error))).await;
        error
    }

    /// Release resources in reverse acquisition order. Each step is guarded on
    /// its own so a failing release never skips the ones after it.
    ///
    /// With `failure` set the session ends in Error carrying that text,
    /// otherwise in Idle.
    async fn teardown(&mut self, failure: Option<String>) {
        let text = failure.clone().unwrap_or_else(|| STATUS_DISCONNECTING.to_string());
        self.transition(SessionState::Disconnecting, &text);
        self.session.live.store(false, Ordering::Release);

        if let Some(client) = self.session.client.as_mut() {
            client.off_remote_publish();
        }

        if let Some(agent_id) = self.session.agent_id.take() {
            match self.backend.stop_agent(&agent_id).await {
                Ok(()) => info!("AI Agent stopped: {}", agent_id),
                Err(e) => error!("Error stopping agent {}: {}", agent_id, e),
            }
        }

        if let Some(mut capture) = self.session.capture.take() {
            if let Err(e) = capture.stop() {
                warn!("Failed to stop microphone track: {:#}", e);
            }
            if let Err(e) = capture.close() {
                warn!("Failed to close microphone track: {:#}", e);
            }
        }
        self.set_muted(true);

        if let Some(mut client) = self.session.client.take() {
            if let Err(e) = client.leave().await {
                error!("Failed to leave channel: {:#}", e);
            }
        }

        self.session.credential = None;
        self.session.channel_name = None;

        match failure {
            Some(text) => self.transition(SessionState::Error, &text),
            None => {
                self.transition(SessionState::Idle, STATUS_DISCONNECTED);
                info!("Successfully disconnected");
            }
        }
    }

    /// Timestamp-derived and strictly increasing across attempts
    fn next_channel_name(&mut self) -> String {
        let stamp = Utc::now()
            .timestamp_millis()
            .max(self.last_channel_stamp + 1);
        self.last_channel_stamp = stamp;
        format!("{}{}", CHANNEL_PREFIX, stamp)
    }

    fn sink_for(&self, channel: &str) -> EventSink {
        EventSink::new(
            channel,
            self.events_tx.clone(),
            Arc::clone(&self.status_tx),
            Arc::clone(&self.session.live),
        )
    }

    fn transition(&mut self, state: SessionState, text: &str) {
        if self.state != state {
            info!("Session state {} -> {}", self.state, state);
        }
        self.state = state;
        self.status_text = text.to_string();
        self.publish_status();
    }

    fn set_status(&mut self, text: &str) {
        debug!("{}", text);
        self.status_text = text.to_string();
        self.publish_status();
    }

    fn set_muted(&self, muted: bool) {
        self.status_tx.send_if_modified(|status| {
            if status.muted == muted {
                return false;
            }
            status.muted = muted;
            true
        });
    }

    fn publish_status(&self) {
        self.status_tx.send_modify(|status| {
            status.state = self.state;
            status.text = self.status_text.clone();
        });
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.session.holds_resources() {
            warn!(
                "Session controller dropped while holding resources (channel {:?}); call shutdown() first",
                self.session.channel_name
            );
        }
    }
}

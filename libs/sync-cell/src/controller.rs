use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use appointment_cell::AppointmentService;
use chat_cell::{
    ChatMessage, ChatMessagePayload, ChatService, ChatThreadCache, ConversationKey, MessageBody,
};
use session_cell::SessionStore;
use shared_api::ApiClient;
use shared_config::AppConfig;
use shared_models::Session;

use crate::error::SyncError;
use crate::events::{LiveEvent, OutboundEvent};
use crate::stream::EventStream;

/// Commands the UI layer feeds into the running controller.
#[derive(Debug)]
enum Command {
    Send { patient_id: String, body: MessageBody },
    OpenConversation { patient_id: String },
}

/// Handle the UI keeps while the controller runs: lifecycle signals in,
/// outbound chat commands in. Cache state flows out through the shared
/// service/cache references.
#[derive(Clone)]
pub struct SyncHandle {
    foreground_tx: watch::Sender<bool>,
    shutdown_tx: watch::Sender<bool>,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl SyncHandle {
    pub fn set_foreground(&self, foreground: bool) {
        let _ = self.foreground_tx.send(foreground);
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Fire-and-forget send; the message shows up as pending in the cache and
    /// is confirmed by the broadcast echo.
    pub fn send_message(&self, patient_id: &str, body: MessageBody) -> Result<(), SyncError> {
        self.command_tx
            .send(Command::Send {
                patient_id: patient_id.to_string(),
                body,
            })
            .map_err(|_| SyncError::StreamUnavailable)
    }

    /// Load a conversation's full history into the cache (one-time load per
    /// conversation open).
    pub fn open_conversation(&self, patient_id: &str) -> Result<(), SyncError> {
        self.command_tx
            .send(Command::OpenConversation {
                patient_id: patient_id.to_string(),
            })
            .map_err(|_| SyncError::StreamUnavailable)
    }
}

enum Step {
    Poll,
    ForegroundChanged,
    Command(Command),
    Event(Option<Result<LiveEvent, SyncError>>),
    Unauthorized,
    Shutdown,
}

/// The only component that decides when to poll and when to trust the live
/// stream. Owns the stream exclusively; the registries and the chat cache are
/// mutated from here and from user-initiated service calls, never from
/// rendering code.
pub struct SyncController<S: EventStream> {
    config: Arc<AppConfig>,
    session: Arc<SessionStore>,
    appointments: Arc<AppointmentService>,
    chats: Arc<ChatService>,
    cache: Arc<RwLock<ChatThreadCache>>,
    stream: S,
    foreground_rx: watch::Receiver<bool>,
    shutdown_rx: watch::Receiver<bool>,
    command_rx: mpsc::UnboundedReceiver<Command>,
    unauthorized_rx: broadcast::Receiver<()>,
    // Bumped on background/teardown; fetches started under an older epoch are
    // never committed.
    epoch: u64,
}

impl<S: EventStream> SyncController<S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<AppConfig>,
        api: &ApiClient,
        session: Arc<SessionStore>,
        appointments: Arc<AppointmentService>,
        chats: Arc<ChatService>,
        cache: Arc<RwLock<ChatThreadCache>>,
        stream: S,
    ) -> (Self, SyncHandle) {
        let (foreground_tx, foreground_rx) = watch::channel(true);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let unauthorized_rx = api.subscribe_unauthorized();

        let controller = Self {
            config,
            session,
            appointments,
            chats,
            cache,
            stream,
            foreground_rx,
            shutdown_rx,
            command_rx,
            unauthorized_rx,
            epoch: 0,
        };
        let handle = SyncHandle {
            foreground_tx,
            shutdown_tx,
            command_tx,
        };
        (controller, handle)
    }

    /// Run until shutdown or forced logout. On session activation this does
    /// one REST refresh of both caches, then opens the live stream; from then
    /// on live events are the low-latency path and polling the fallback.
    pub async fn run(&mut self) -> Result<(), SyncError> {
        let session = self
            .session
            .session()
            .await
            .ok_or(SyncError::NoActiveSession)?;

        info!("Sync started for user {}", session.user_id);
        self.refresh_all(&session).await;

        if let Err(e) = self.stream.connect(&session.user_id).await {
            warn!("Live stream unavailable, relying on polling: {}", e);
        }

        let mut poll = interval(Duration::from_secs(self.config.poll_interval_seconds));
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        poll.tick().await; // the first tick fires immediately; already refreshed

        loop {
            let subscribed = self.stream.is_subscribed();

            let step = tokio::select! {
                _ = poll.tick() => Step::Poll,
                changed = self.foreground_rx.changed() => match changed {
                    Ok(()) => Step::ForegroundChanged,
                    Err(_) => Step::Shutdown,
                },
                _ = self.shutdown_rx.changed() => Step::Shutdown,
                received = self.unauthorized_rx.recv() => match received {
                    Err(broadcast::error::RecvError::Closed) => Step::Shutdown,
                    _ => Step::Unauthorized,
                },
                command = self.command_rx.recv() => match command {
                    Some(command) => Step::Command(command),
                    None => Step::Shutdown,
                },
                event = self.stream.next_event(), if subscribed => Step::Event(event),
            };

            match step {
                Step::Poll => self.on_poll_tick(&session).await,
                Step::ForegroundChanged => self.on_foreground_changed(&session).await,
                Step::Command(command) => self.on_command(&session, command).await,
                Step::Event(Some(Ok(event))) => self.apply_event(&session, event).await,
                Step::Event(Some(Err(e))) => warn!("Ignoring undecodable event: {}", e),
                Step::Event(None) => {
                    warn!("Stream disconnected; polling is the sole source of truth until resubscribed");
                }
                Step::Unauthorized => {
                    warn!("Token rejected by the backend, forcing logout");
                    self.stream.close().await;
                    self.session.logout().await;
                    return Err(SyncError::SessionExpired);
                }
                Step::Shutdown => {
                    self.stream.close().await;
                    info!("Sync stopped");
                    return Ok(());
                }
            }
        }
    }

    async fn on_poll_tick(&mut self, session: &Session) {
        if !*self.foreground_rx.borrow() {
            return;
        }

        self.refresh_appointments(session).await;

        if !self.stream.is_subscribed() {
            // While the stream is down, the chat list also rides the poll.
            self.refresh_chat_list(session).await;
            if let Err(e) = self.stream.connect(&session.user_id).await {
                debug!("Reconnect attempt failed: {}", e);
            }
        }
    }

    async fn on_foreground_changed(&mut self, session: &Session) {
        if *self.foreground_rx.borrow() {
            info!("App foregrounded, refreshing immediately");
            self.refresh_all(session).await;
            if !self.stream.is_subscribed() {
                if let Err(e) = self.stream.connect(&session.user_id).await {
                    debug!("Reconnect on resume failed: {}", e);
                }
            }
        } else {
            info!("App backgrounded, pausing sync");
            self.epoch += 1;
            self.stream.close().await;
        }
    }

    async fn on_command(&mut self, session: &Session, command: Command) {
        match command {
            Command::Send { patient_id, body } => {
                if let Err(e) = self.dispatch_message(session, &patient_id, body).await {
                    warn!("Failed to send message to {}: {}", patient_id, e);
                }
            }
            Command::OpenConversation { patient_id } => {
                self.load_history(session, &patient_id).await;
            }
        }
    }

    async fn apply_event(&mut self, session: &Session, event: LiveEvent) {
        match event {
            LiveEvent::ChatMessage(payload) => {
                // Pushes are matched by user id, not room membership alone.
                if !payload.involves(&session.user_id) {
                    debug!("Ignoring chat event addressed to another user");
                    return;
                }
                match payload.into_message() {
                    Ok(message) => {
                        let outcome = self.cache.write().await.append_live(message);
                        debug!("Applied live message: {:?}", outcome);
                    }
                    Err(e) => warn!("Rejected malformed chat event: {}", e),
                }
            }
            LiveEvent::ChatListUpdate => {
                // Per-event payloads on this signal are unreliable; refetch.
                self.refresh_chat_list(session).await;
            }
        }
    }

    async fn dispatch_message(
        &mut self,
        session: &Session,
        patient_id: &str,
        body: MessageBody,
    ) -> Result<(), SyncError> {
        if !self.stream.is_subscribed() {
            return Err(SyncError::StreamUnavailable);
        }

        let key = ConversationKey::new(&session.user_id, patient_id);
        let message = ChatMessage::outbound(key, body, Utc::now());
        let payload = ChatMessagePayload::from_message(&message);

        self.stream
            .send(&OutboundEvent::ChatMessage(payload))
            .await?;
        self.cache.write().await.register_pending(message);
        Ok(())
    }

    async fn refresh_all(&mut self, session: &Session) {
        self.refresh_appointments(session).await;
        self.refresh_chat_list(session).await;
    }

    async fn refresh_appointments(&mut self, session: &Session) {
        if let Err(e) = self
            .appointments
            .refresh(&session.user_id, &session.auth_token)
            .await
        {
            // Previous snapshot stays visible; next tick retries.
            warn!("Appointment refresh failed, keeping previous snapshot: {}", e);
        }
    }

    async fn refresh_chat_list(&mut self, session: &Session) {
        let epoch = self.epoch;
        match self
            .chats
            .fetch_chat_list(&session.user_id, &session.auth_token)
            .await
        {
            Ok(summaries) => {
                if epoch != self.epoch {
                    debug!("Discarding chat list fetched before background transition");
                    return;
                }
                self.cache.write().await.apply_chat_list(summaries);
            }
            Err(e) => warn!("Chat list refresh failed, keeping previous snapshot: {}", e),
        }
    }

    async fn load_history(&mut self, session: &Session, patient_id: &str) {
        let epoch = self.epoch;
        match self
            .chats
            .load_history(&session.user_id, patient_id, &session.auth_token)
            .await
        {
            Ok(history) => {
                if epoch != self.epoch {
                    debug!("Discarding history fetched before background transition");
                    return;
                }
                let key = ConversationKey::new(&session.user_id, patient_id);
                self.cache.write().await.load_history(key, history);
            }
            Err(e) => warn!("History load for {} failed: {}", patient_id, e),
        }
    }
}

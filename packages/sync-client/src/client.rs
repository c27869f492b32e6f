//! Refcounted client with a single shared connection per consumer group
//!
//! The first [`subscribe`](SyncClient::subscribe) spawns a connection
//! actor; further subscriptions share it and receive the same events
//! through a broadcast channel. Dropping the last [`Subscription`] tears
//! the actor down, which cancels the heartbeat, any pending reconnect,
//! and the socket itself.
//!
//! Every mutation the actor makes to shared state carries its
//! [`Generation`]; state transitions and snapshot writes from a
//! superseded session are no-ops, so a teardown racing a reconnect can
//! never resurrect a dead connection's data.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval_at, sleep, Instant as TokioInstant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::connection::{ConnectionPhase, Generation, SyncState};
use crate::error::{ActionError, SyncResult};
use crate::heartbeat::{HeartbeatMonitor, HEARTBEAT_INTERVAL, PONG_TIMEOUT};
use crate::models::{PlaybackSnapshot, QueueSnapshot};
use crate::progress::{self, TrackProgress, REDRAW_INTERVAL};
use crate::protocol::{self, ClientRequest, ServerMessage};
use crate::reconnect::{ReconnectScheduler, RECONNECT_DELAY};

/// Event buffer per subscriber; a display that falls this far behind is
/// lagged rather than blocking the connection
const BROADCAST_CAPACITY: usize = 256;

/// Timing knobs for a [`SyncClient`]
///
/// The defaults match the server's expectations; tests shrink them to
/// keep real-time runs short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Cadence of heartbeat pings on an open connection
    pub heartbeat_interval: Duration,
    /// How long a ping may go unanswered before the connection is
    /// declared dead
    pub pong_timeout: Duration,
    /// Fixed wait between losing a connection and redialing
    pub reconnect_delay: Duration,
    /// Suggested cadence for re-deriving progress in a display
    pub redraw_interval: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: HEARTBEAT_INTERVAL,
            pong_timeout: PONG_TIMEOUT,
            reconnect_delay: RECONNECT_DELAY,
            redraw_interval: REDRAW_INTERVAL,
        }
    }
}

impl SyncOptions {
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_pong_timeout(mut self, timeout: Duration) -> Self {
        self.pong_timeout = timeout;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_redraw_interval(mut self, interval: Duration) -> Self {
        self.redraw_interval = interval;
        self
    }
}

/// Playback actions a consumer can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Start playing the queue
    Play,
    /// Stop playback
    Stop,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Play => write!(f, "play"),
            ActionKind::Stop => write!(f, "stop"),
        }
    }
}

/// Delivers playback actions to the server, typically over its HTTP API
///
/// Actions travel on a separate path from the push socket: the resulting
/// state change comes back as a regular server push, so dispatch has no
/// success payload to return.
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, action: ActionKind) -> BoxFuture<'static, Result<(), ActionError>>;
}

/// Everything subscribers can observe from the client
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A connection opened and initial state was requested
    Connected { generation: Generation },
    /// An open connection was lost; a reconnect is pending
    Disconnected { generation: Generation },
    /// The server pushed new playback state
    TrackUpdated(PlaybackSnapshot),
    /// The server pushed a new queue
    QueueUpdated(QueueSnapshot),
    /// A requested action could not be delivered
    ActionFailed { action: ActionKind, reason: String },
}

enum Command {
    Teardown,
}

struct ActorHandle {
    subscribers: usize,
    commands: Option<mpsc::UnboundedSender<Command>>,
}

struct ClientInner {
    endpoint: String,
    options: SyncOptions,
    dispatcher: Option<Arc<dyn ActionDispatcher>>,
    state: Mutex<SyncState>,
    events: broadcast::Sender<SyncEvent>,
    actor: Mutex<ActorHandle>,
}

impl ClientInner {
    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn actor(&self) -> MutexGuard<'_, ActorHandle> {
        self.actor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release_subscriber(&self) {
        let mut actor = self.actor();
        actor.subscribers -= 1;
        if actor.subscribers == 0 {
            if let Some(commands) = actor.commands.take() {
                let _ = commands.send(Command::Teardown);
            }
            self.state().reset();
            debug!("last subscription dropped, connection torn down");
        }
    }
}

/// Shared handle to the synchronized server state
///
/// Cloning is cheap and every clone observes the same connection; a
/// process talking to one server should create the client once and hand
/// out clones.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<ClientInner>,
}

impl SyncClient {
    /// Create a client for a WebSocket endpoint with default options
    ///
    /// Nothing connects until the first [`subscribe`](SyncClient::subscribe).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_options(endpoint, SyncOptions::default())
    }

    /// Create a client with explicit timing options
    pub fn with_options(endpoint: impl Into<String>, options: SyncOptions) -> Self {
        Self::build(endpoint.into(), options, None)
    }

    /// Create a client that can also deliver playback actions
    pub fn with_dispatcher(
        endpoint: impl Into<String>,
        options: SyncOptions,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Self {
        Self::build(endpoint.into(), options, Some(dispatcher))
    }

    fn build(
        endpoint: String,
        options: SyncOptions,
        dispatcher: Option<Arc<dyn ActionDispatcher>>,
    ) -> Self {
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(ClientInner {
                endpoint,
                options,
                dispatcher,
                state: Mutex::new(SyncState::new()),
                events,
                actor: Mutex::new(ActorHandle {
                    subscribers: 0,
                    commands: None,
                }),
            }),
        }
    }

    /// Register interest in server state
    ///
    /// The first subscription starts the connection; later ones share
    /// it. Events date from the subscription onward; current state is
    /// available immediately through the snapshot accessors.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime, which is needed to
    /// drive the connection.
    pub fn subscribe(&self) -> Subscription {
        let mut actor = self.inner.actor();
        actor.subscribers += 1;
        if actor.subscribers == 1 {
            let (commands, receiver) = mpsc::unbounded_channel();
            actor.commands = Some(commands);
            let runner = ConnectionActor {
                inner: Arc::clone(&self.inner),
                commands: receiver,
            };
            tokio::spawn(runner.run());
            debug!(endpoint = %self.inner.endpoint, "first subscription, starting connection");
        }
        Subscription {
            events: self.inner.events.subscribe(),
            inner: Arc::clone(&self.inner),
        }
    }

    /// Ask the server to perform a playback action, without waiting
    ///
    /// Delivery is fire and forget: the observable result is the state
    /// push that follows, and a delivery failure surfaces as
    /// [`SyncEvent::ActionFailed`].
    pub fn request_action(&self, action: ActionKind) {
        let dispatcher = match &self.inner.dispatcher {
            Some(dispatcher) => Arc::clone(dispatcher),
            None => {
                warn!(action = %action, "no action dispatcher configured, dropping request");
                let _ = self.inner.events.send(SyncEvent::ActionFailed {
                    action,
                    reason: "no action dispatcher configured".to_string(),
                });
                return;
            }
        };
        let events = self.inner.events.clone();
        let delivery = dispatcher.dispatch(action);
        tokio::spawn(async move {
            if let Err(e) = delivery.await {
                warn!(action = %action, error = %e, "action delivery failed");
                let _ = events.send(SyncEvent::ActionFailed {
                    action,
                    reason: e.to_string(),
                });
            }
        });
    }

    /// Latest playback snapshot from the current connection, if any
    pub fn playback(&self) -> Option<PlaybackSnapshot> {
        self.inner.state().playback()
    }

    /// Latest queue snapshot from the current connection, if any
    pub fn queue(&self) -> Option<QueueSnapshot> {
        self.inner.state().queue()
    }

    /// Playback position interpolated to this instant
    ///
    /// `None` without a snapshot or when the track has no usable length.
    pub fn progress(&self) -> Option<TrackProgress> {
        let snapshot = self.inner.state().playback()?;
        progress::interpolate(&snapshot, Instant::now())
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.inner.state().phase()
    }

    pub fn is_connected(&self) -> bool {
        self.phase().is_open()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.actor().subscribers
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }
}

impl fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncClient")
            .field("endpoint", &self.inner.endpoint)
            .field("phase", &self.phase())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// One subscriber's membership in the shared connection
///
/// Receives every event broadcast while it exists. Dropping it releases
/// the membership; dropping the last one closes the connection.
pub struct Subscription {
    events: broadcast::Receiver<SyncEvent>,
    inner: Arc<ClientInner>,
}

impl Subscription {
    /// Wait for the next event
    ///
    /// A subscriber that falls more than the buffer behind skips the
    /// missed events and keeps going; the snapshot accessors still hold
    /// the latest state. Returns `None` only when the client is gone.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscription lagged, dropping missed events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicitly release the membership; equivalent to dropping
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.inner.release_subscriber();
    }
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

enum SessionEnd {
    /// The server closed the socket or the stream ended
    ServerClosed,
    /// A heartbeat went unanswered past its deadline
    LivenessLost,
    /// The last subscriber left
    Teardown,
}

struct ConnectionActor {
    inner: Arc<ClientInner>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl ConnectionActor {
    async fn run(mut self) {
        let mut scheduler = ReconnectScheduler::new(self.inner.options.reconnect_delay);

        loop {
            // Check for teardown and allocate the generation under one
            // state lock, so an actor that has already been replaced can
            // never start another attempt.
            let generation = {
                let mut state = self.inner.state();
                match self.commands.try_recv() {
                    Ok(Command::Teardown) | Err(TryRecvError::Disconnected) => return,
                    Err(TryRecvError::Empty) => {}
                }
                state.begin_attempt()
            };
            scheduler.begin_attempt();
            debug!(generation = %generation, endpoint = %self.inner.endpoint, "connecting");

            let dialed = tokio::select! {
                biased;
                _ = self.commands.recv() => {
                    self.inner.state().mark_idle(generation);
                    return;
                }
                result = connect_async(self.inner.endpoint.as_str()) => result,
            };

            let (until, was_open) = match dialed {
                Ok((socket, _response)) => {
                    scheduler.attempt_succeeded();
                    let opened = self.inner.state().mark_open(generation);
                    if opened {
                        info!(generation = %generation, "connected");
                        let _ = self.inner.events.send(SyncEvent::Connected { generation });
                    }

                    match self.run_session(socket, generation).await {
                        Ok(SessionEnd::Teardown) => {
                            self.inner.state().mark_idle(generation);
                            return;
                        }
                        Ok(SessionEnd::ServerClosed) => {
                            warn!(generation = %generation, "server closed the connection");
                        }
                        Ok(SessionEnd::LivenessLost) => {
                            warn!(
                                generation = %generation,
                                "pong deadline missed, connection presumed dead"
                            );
                        }
                        Err(e) => {
                            warn!(generation = %generation, error = %e, "connection error");
                        }
                    }

                    let now = Instant::now();
                    let until = scheduler
                        .connection_lost(now)
                        .unwrap_or_else(|| now + self.inner.options.reconnect_delay);
                    (until, opened)
                }
                Err(e) => {
                    warn!(generation = %generation, error = %e, "connect failed");
                    (scheduler.attempt_failed(Instant::now()), false)
                }
            };

            if self.inner.state().mark_waiting(generation, until) && was_open {
                let _ = self.inner.events.send(SyncEvent::Disconnected { generation });
            }

            let delay = until.saturating_duration_since(Instant::now());
            debug!(
                generation = %generation,
                delay_ms = delay.as_millis() as u64,
                "waiting before reconnect"
            );
            tokio::select! {
                biased;
                _ = self.commands.recv() => {
                    self.inner.state().mark_idle(generation);
                    return;
                }
                () = sleep(delay) => {}
            }
        }
    }

    async fn run_session(
        &mut self,
        socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
        generation: Generation,
    ) -> SyncResult<SessionEnd> {
        let (mut sink, mut stream) = socket.split();

        // Ask for the full picture up front; the server then pushes on
        // its own cadence.
        send_request(&mut sink, ClientRequest::CurrentTrack).await?;
        send_request(&mut sink, ClientRequest::CurrentQueue).await?;

        let mut monitor = HeartbeatMonitor::new(self.inner.options.pong_timeout);
        let mut ping_interval = interval_at(
            TokioInstant::now() + self.inner.options.heartbeat_interval,
            self.inner.options.heartbeat_interval,
        );
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let pong_deadline = sleep(Duration::ZERO);
        tokio::pin!(pong_deadline);
        let mut deadline_armed = false;

        loop {
            tokio::select! {
                biased;
                _ = self.commands.recv() => {
                    let _ = sink.close().await;
                    return Ok(SessionEnd::Teardown);
                }
                () = &mut pong_deadline, if deadline_armed => {
                    deadline_armed = false;
                    if monitor.has_outstanding_ping() {
                        let _ = sink.close().await;
                        return Ok(SessionEnd::LivenessLost);
                    }
                }
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text, generation, &mut monitor, &mut deadline_armed);
                        }
                        Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::ServerClosed),
                        Some(Ok(_)) => {} // protocol frames are all text
                        Some(Err(e)) => return Err(e.into()),
                    }
                }
                _ = ping_interval.tick() => {
                    if let Some(deadline) = monitor.arm_ping(Instant::now()) {
                        send_request(&mut sink, ClientRequest::Ping).await?;
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        pong_deadline.as_mut().reset(TokioInstant::now() + remaining);
                        deadline_armed = true;
                    }
                }
            }
        }
    }

    /// Decode one incoming text frame and apply it
    ///
    /// A malformed frame is logged and dropped; the connection stays up.
    fn handle_frame(
        &self,
        text: &str,
        generation: Generation,
        monitor: &mut HeartbeatMonitor,
        deadline_armed: &mut bool,
    ) {
        match protocol::decode(text) {
            Ok(ServerMessage::CurrentTrackUpdate { current_track }) => {
                let snapshot = PlaybackSnapshot::new(current_track, Instant::now());
                if self.inner.state().apply_playback(generation, snapshot.clone()) {
                    debug!(
                        generation = %generation,
                        title = %snapshot.track.title,
                        state = ?snapshot.track.track_state,
                        "track update"
                    );
                    let _ = self.inner.events.send(SyncEvent::TrackUpdated(snapshot));
                }
            }
            Ok(ServerMessage::QueueUpdate { queue }) => {
                let snapshot = QueueSnapshot::new(queue);
                if self.inner.state().apply_queue(generation, snapshot.clone()) {
                    debug!(generation = %generation, entries = snapshot.len(), "queue update");
                    let _ = self.inner.events.send(SyncEvent::QueueUpdated(snapshot));
                }
            }
            Ok(ServerMessage::Pong) => {
                if monitor.pong_received(Instant::now()) {
                    *deadline_armed = false;
                } else {
                    debug!("unsolicited pong");
                }
            }
            Ok(ServerMessage::Unrecognized) => {
                debug!("ignoring unrecognized server frame");
            }
            Err(e) => {
                warn!(error = %e, "dropping malformed frame");
            }
        }
    }
}

async fn send_request(sink: &mut WsSink, request: ClientRequest) -> SyncResult<()> {
    sink.send(Message::Text(protocol::encode(request))).await?;
    Ok(())
}

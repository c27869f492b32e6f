//! Real-time state synchronization with a TuneBox music server
//!
//! The server pushes playback and queue state over a WebSocket as JSON
//! text frames. This crate keeps one connection per consumer group alive
//! against that socket: it decodes pushes into typed snapshots, fans
//! them out to subscribers, pings the server to detect a silently dead
//! link, and redials on a fixed delay when the connection drops.
//!
//! [`SyncClient`] is the entry point. Displays read the latest snapshots
//! through its accessors and derive a smooth playback position with
//! [`progress::interpolate`]; pushes arriving between redraws are
//! delivered as [`SyncEvent`]s through a [`Subscription`].
//!
//! # Example
//!
//! ```rust,no_run
//! use tunebox_sync_client::{SyncClient, SyncEvent};
//!
//! # async fn example() {
//! let client = SyncClient::new("ws://localhost:8000/ws");
//! let mut subscription = client.subscribe();
//!
//! while let Some(event) = subscription.next_event().await {
//!     if let SyncEvent::TrackUpdated(snapshot) = event {
//!         println!("now playing: {}", snapshot.track.title);
//!     }
//! }
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod models;
pub mod progress;
pub mod protocol;
pub mod reconnect;

pub use client::{ActionDispatcher, ActionKind, Subscription, SyncClient, SyncEvent, SyncOptions};
pub use connection::{ConnectionPhase, Generation};
pub use error::{ActionError, DecodeError, SyncError, SyncResult};
pub use heartbeat::{HeartbeatMonitor, HEARTBEAT_INTERVAL, PONG_TIMEOUT};
pub use models::{CurrentTrack, PlayState, PlaybackSnapshot, QueueEntry, QueueSnapshot};
pub use progress::{TrackProgress, REDRAW_INTERVAL};
pub use protocol::{ClientRequest, ServerMessage};
pub use reconnect::{ReconnectScheduler, SchedulerState, RECONNECT_DELAY};

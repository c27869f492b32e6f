//! Connection lifecycle state shared between the client and its actor
//!
//! Each connection attempt gets a fresh [`Generation`]. Everything a
//! session does to shared state carries its generation, and a mutation
//! whose generation is not the current one is a no-op. That makes late
//! writes from an already-replaced session harmless without any
//! cross-task coordination beyond the state lock.

use std::fmt;
use std::time::Instant;

use crate::models::{PlaybackSnapshot, QueueSnapshot};

/// Identity of one connection attempt, unique within a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn number(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the client is in the connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// No subscribers, nothing running
    Idle,
    /// Dialing the server
    Connecting { generation: Generation },
    /// Connected and receiving pushes
    Open { generation: Generation },
    /// Connection lost; the next attempt starts at `until`
    Waiting { generation: Generation, until: Instant },
}

impl ConnectionPhase {
    /// The generation this phase belongs to, if any
    pub fn generation(&self) -> Option<Generation> {
        match self {
            ConnectionPhase::Idle => None,
            ConnectionPhase::Connecting { generation }
            | ConnectionPhase::Open { generation }
            | ConnectionPhase::Waiting { generation, .. } => Some(*generation),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionPhase::Open { .. })
    }
}

/// Client state the actor mutates and subscribers read
///
/// Held behind the client's mutex; all methods take `&mut self` and are
/// cheap. Transitions and snapshot writes are generation checked except
/// [`reset`](SyncState::reset), which the client only calls once the
/// actor has been told to stop.
#[derive(Debug)]
pub(crate) struct SyncState {
    phase: ConnectionPhase,
    generations: u64,
    playback: Option<PlaybackSnapshot>,
    queue: Option<QueueSnapshot>,
}

impl SyncState {
    pub(crate) fn new() -> Self {
        Self {
            phase: ConnectionPhase::Idle,
            generations: 0,
            playback: None,
            queue: None,
        }
    }

    /// Start a new connection attempt
    ///
    /// Allocates the next generation and discards any snapshots from the
    /// previous connection, so nothing stale is served while dialing.
    pub(crate) fn begin_attempt(&mut self) -> Generation {
        self.generations += 1;
        let generation = Generation(self.generations);
        self.phase = ConnectionPhase::Connecting { generation };
        self.playback = None;
        self.queue = None;
        generation
    }

    /// Move `generation` to open; a no-op returning `false` when a newer
    /// attempt or a reset has already replaced it
    pub(crate) fn mark_open(&mut self, generation: Generation) -> bool {
        if self.phase.generation() == Some(generation) {
            self.phase = ConnectionPhase::Open { generation };
            true
        } else {
            false
        }
    }

    /// Move `generation` to waiting; same staleness rule as
    /// [`mark_open`](SyncState::mark_open)
    pub(crate) fn mark_waiting(&mut self, generation: Generation, until: Instant) -> bool {
        if self.phase.generation() == Some(generation) {
            self.phase = ConnectionPhase::Waiting { generation, until };
            true
        } else {
            false
        }
    }

    /// Move `generation` to idle; same staleness rule as
    /// [`mark_open`](SyncState::mark_open)
    pub(crate) fn mark_idle(&mut self, generation: Generation) -> bool {
        if self.phase.generation() == Some(generation) {
            self.phase = ConnectionPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Drop back to idle regardless of the current phase
    pub(crate) fn reset(&mut self) {
        self.phase = ConnectionPhase::Idle;
        self.playback = None;
        self.queue = None;
    }

    /// Store a playback snapshot received on `generation`
    ///
    /// Returns `false` without storing when that generation is no longer
    /// the open connection.
    pub(crate) fn apply_playback(
        &mut self,
        generation: Generation,
        snapshot: PlaybackSnapshot,
    ) -> bool {
        if self.phase == (ConnectionPhase::Open { generation }) {
            self.playback = Some(snapshot);
            true
        } else {
            false
        }
    }

    /// Store a queue snapshot received on `generation`; same staleness
    /// rule as [`apply_playback`](SyncState::apply_playback)
    pub(crate) fn apply_queue(&mut self, generation: Generation, snapshot: QueueSnapshot) -> bool {
        if self.phase == (ConnectionPhase::Open { generation }) {
            self.queue = Some(snapshot);
            true
        } else {
            false
        }
    }

    pub(crate) fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub(crate) fn playback(&self) -> Option<PlaybackSnapshot> {
        self.playback.clone()
    }

    pub(crate) fn queue(&self) -> Option<QueueSnapshot> {
        self.queue.clone()
    }
}

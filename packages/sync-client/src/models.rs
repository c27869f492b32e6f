//! Playback and queue state snapshots
//!
//! The server owns the canonical playback state and pushes it wholesale.
//! Each incoming update fully replaces the previous snapshot of its kind;
//! nothing here is ever patched field by field.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Playback state of the active player as reported by the server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Playing,
    Paused,
    Stopped,
    /// Any state this client version does not know about
    #[serde(other)]
    Unknown,
}

impl PlayState {
    /// Whether playback is advancing in this state
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayState::Playing)
    }
}

/// The `current_track` payload of a track update frame
///
/// All durations are in seconds, matching the wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentTrack {
    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Total track duration in seconds
    pub total_time: f64,

    /// Seconds left until the track ends, as of the server's measurement
    pub remaining_time: f64,

    /// Remaining time as a percentage of the total
    pub remaining_percentage: f64,

    /// Player state for this track
    pub track_state: PlayState,

    /// Seconds already played, when the server includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
}

/// The last authoritative playback state received from the server,
/// stamped with the local receipt time
///
/// `received_at` is captured on the client clock the moment the frame is
/// decoded; it anchors progress interpolation between server pushes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    /// Track payload exactly as the server sent it
    pub track: CurrentTrack,

    /// Local clock reading when this snapshot was decoded
    pub received_at: Instant,
}

impl PlaybackSnapshot {
    /// Create a snapshot from a decoded track payload
    pub fn new(track: CurrentTrack, received_at: Instant) -> Self {
        Self { track, received_at }
    }

    /// Seconds of the track already played as of `received_at`
    ///
    /// Derived from total minus remaining and clamped into `[0, total]`,
    /// so inconsistent server values can never produce a negative or
    /// overlong baseline.
    pub fn baseline_elapsed(&self) -> f64 {
        let total = self.track.total_time.max(0.0);
        (total - self.track.remaining_time).clamp(0.0, total)
    }
}

fn unknown_artist() -> String {
    "Unknown Artist".to_string()
}

/// One entry of the playback queue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEntry {
    /// Server-side identity of the queued item; absent for entries the
    /// server queued outside its library
    #[serde(default)]
    pub item_id: Option<i64>,

    /// Track title
    pub title: String,

    /// Artist name; the server omits it for tracks with no artist tag
    #[serde(default = "unknown_artist")]
    pub artist: String,

    /// Track length in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,

    /// Album art path on the server, if any
    #[serde(default)]
    pub album_art: Option<String>,
}

/// The full playback queue in play order, replaced wholesale on every
/// queue update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Queue entries; insertion order is the play order
    pub entries: Vec<QueueEntry>,
}

impl QueueSnapshot {
    pub fn new(entries: Vec<QueueEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

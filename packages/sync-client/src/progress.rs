//! Client-side playback progress interpolation
//!
//! The server pushes playback state every few seconds; between pushes
//! the client advances the elapsed time locally so a once-per-second
//! display moves smoothly. Interpolation is a pure function of the
//! latest snapshot and the current instant, so a late or missing push
//! degrades to a slightly stale position rather than an error.

use std::time::{Duration, Instant};

use crate::models::PlaybackSnapshot;

/// How often a display should re-derive progress for a smooth readout
pub const REDRAW_INTERVAL: Duration = Duration::from_secs(1);

/// An interpolated playback position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackProgress {
    /// Seconds into the track, clamped to `[0, total]`
    pub elapsed: f64,
    /// Track length in seconds
    pub total: f64,
}

impl TrackProgress {
    /// Position as a percentage of the track length
    ///
    /// [`interpolate`] only builds values with a positive length, but
    /// the fields are public; a zero or otherwise unusable length reads
    /// as zero percent instead of dividing by it.
    pub fn percentage(&self) -> f64 {
        if !self.total.is_finite() || self.total <= 0.0 {
            return 0.0;
        }
        100.0 * self.elapsed / self.total
    }

    /// Seconds left until the end of the track
    pub fn remaining(&self) -> f64 {
        self.total - self.elapsed
    }
}

/// Derive the playback position at `now` from the latest snapshot
///
/// The snapshot fixes a baseline elapsed time at the instant it was
/// received; while the track is playing, the wall-clock time since then
/// is added on top. A paused or stopped track holds at the baseline.
/// Returns `None` when the track length is zero or nonsensical, which is
/// how the server reports streams with no known duration; such tracks
/// are displayed indeterminate rather than at a fabricated position.
pub fn interpolate(snapshot: &PlaybackSnapshot, now: Instant) -> Option<TrackProgress> {
    let total = snapshot.track.total_time;
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let baseline = snapshot.baseline_elapsed();
    let elapsed = if snapshot.track.track_state.is_playing() {
        baseline + now.saturating_duration_since(snapshot.received_at).as_secs_f64()
    } else {
        baseline
    };

    Some(TrackProgress {
        elapsed: elapsed.clamp(0.0, total),
        total,
    })
}

//! Status line rendering
//!
//! Pure formatting helpers, kept free of terminal handling so they can
//! be tested as plain string functions.

use tunebox_sync_client::{ConnectionPhase, PlayState, PlaybackSnapshot, TrackProgress};

/// Width of the progress bar in characters
const BAR_WIDTH: usize = 24;

/// Render the one-line player status for the current connection state
pub fn status_line(
    phase: ConnectionPhase,
    playback: Option<&PlaybackSnapshot>,
    progress: Option<&TrackProgress>,
) -> String {
    match phase {
        ConnectionPhase::Idle => "offline".to_string(),
        ConnectionPhase::Connecting { .. } => "connecting...".to_string(),
        ConnectionPhase::Waiting { .. } => "connection lost, retrying...".to_string(),
        ConnectionPhase::Open { .. } => match playback {
            Some(snapshot) => track_line(snapshot, progress),
            None => "connected, nothing playing".to_string(),
        },
    }
}

fn track_line(snapshot: &PlaybackSnapshot, progress: Option<&TrackProgress>) -> String {
    let track = &snapshot.track;
    let state = state_label(track.track_state);
    match progress {
        Some(progress) => format!(
            "[{state}] {} - {}  {}  {} / {}",
            track.artist,
            track.title,
            progress_bar(progress.percentage() / 100.0, BAR_WIDTH),
            format_clock(progress.elapsed),
            format_clock(progress.total),
        ),
        // No usable track length, so no position either
        None => format!("[{state}] {} - {}", track.artist, track.title),
    }
}

fn state_label(state: PlayState) -> &'static str {
    match state {
        PlayState::Playing => "playing",
        PlayState::Paused => "paused",
        PlayState::Stopped => "stopped",
        PlayState::Unknown => "unknown",
    }
}

/// Format a second count as `m:ss`
pub fn format_clock(seconds: f64) -> String {
    let whole = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Render a fixed-width bar for a fraction in `0..=1`
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for cell in 0..width {
        bar.push(if cell < filled { '#' } else { '-' });
    }
    bar.push(']');
    bar
}

//! JSON payload builders matching the music server's wire format
//!
//! Frame builders feed [`MockMusicServer`](crate::MockMusicServer)
//! directly; `queue_entry` doubles as the HTTP queue payload, which uses
//! the same shape.

use serde_json::{json, Value};

/// A `Current track update` push frame
///
/// Times are seconds. `track_state` is one of `playing`, `paused` or
/// `stopped`.
pub fn track_update(
    title: &str,
    artist: &str,
    total_time: f64,
    remaining_time: f64,
    track_state: &str,
) -> Value {
    let remaining_percentage = if total_time > 0.0 {
        100.0 * remaining_time / total_time
    } else {
        0.0
    };
    json!({
        "message": "Current track update",
        "current_track": {
            "title": title,
            "artist": artist,
            "total_time": total_time,
            "remaining_time": remaining_time,
            "remaining_percentage": remaining_percentage,
            "track_state": track_state,
            "elapsed_time": total_time - remaining_time,
        }
    })
}

/// A `Queue update` push frame
///
/// Real servers tag these frames with a routing `type` as well, so the
/// fixture does too.
pub fn queue_update(entries: &[Value]) -> Value {
    json!({
        "type": "queue_update",
        "message": "Queue update",
        "queue": entries,
    })
}

/// One queued item, as it appears in queue frames and the HTTP queue
pub fn queue_entry(item_id: i64, title: &str, artist: &str) -> Value {
    json!({
        "item_id": item_id,
        "title": title,
        "artist": artist,
        "duration": 180_000,
        "album_art": Value::Null,
    })
}

/// A heartbeat pong frame
pub fn pong() -> Value {
    json!({"message": "pong"})
}

//! Wire protocol for the state synchronization WebSocket
//!
//! All frames are JSON text. Outgoing requests carry a `type` field the
//! server routes on plus a `message` field naming the request; incoming
//! frames are selected by their `message` field alone. Unknown incoming
//! `message` values decode to [`ServerMessage::Unrecognized`] so newer
//! servers can add frames without breaking older clients.

use serde::Deserialize;

use crate::error::DecodeError;
use crate::models::{CurrentTrack, QueueEntry};

/// Requests a client can send to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRequest {
    /// Ask for an immediate current-track push
    CurrentTrack,
    /// Ask for an immediate queue push
    CurrentQueue,
    /// Heartbeat ping; the server answers with a pong frame
    Ping,
}

impl ClientRequest {
    /// The `type` discriminator the server uses to route this request
    pub fn channel(&self) -> &'static str {
        match self {
            ClientRequest::CurrentTrack => "music_control",
            ClientRequest::CurrentQueue => "queue_update",
            ClientRequest::Ping => "heartbeat",
        }
    }

    /// The `message` field naming this request
    pub fn message(&self) -> &'static str {
        match self {
            ClientRequest::CurrentTrack => "get_current_track",
            ClientRequest::CurrentQueue => "get_current_queue",
            ClientRequest::Ping => "ping",
        }
    }
}

/// Encode an outgoing request as a JSON text frame
pub fn encode(request: ClientRequest) -> String {
    serde_json::json!({
        "type": request.channel(),
        "message": request.message(),
    })
    .to_string()
}

/// Frames the server pushes to clients, selected by their `message` field
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "message")]
pub enum ServerMessage {
    /// Authoritative playback state for the active player
    #[serde(rename = "Current track update")]
    CurrentTrackUpdate { current_track: CurrentTrack },

    /// Authoritative playback queue in play order
    #[serde(rename = "Queue update")]
    QueueUpdate { queue: Vec<QueueEntry> },

    /// Answer to a heartbeat ping
    #[serde(rename = "pong")]
    Pong,

    /// A well-formed frame whose `message` value this client does not know;
    /// ignored rather than treated as an error
    #[serde(other)]
    Unrecognized,
}

/// Decode an incoming JSON text frame into a typed server message
///
/// # Errors
/// Returns [`DecodeError`] when the frame is not valid JSON, has no
/// `message` field, or carries a known `message` with a malformed payload.
/// The caller drops the frame; a decode failure never affects the
/// connection.
pub fn decode(frame: &str) -> Result<ServerMessage, DecodeError> {
    Ok(serde_json::from_str(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayState;

    #[test]
    fn test_encode_current_track_request() {
        let frame = encode(ClientRequest::CurrentTrack);
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "music_control");
        assert_eq!(value["message"], "get_current_track");
    }

    #[test]
    fn test_encode_current_queue_request() {
        let frame = encode(ClientRequest::CurrentQueue);
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "queue_update");
        assert_eq!(value["message"], "get_current_queue");
    }

    #[test]
    fn test_encode_ping() {
        let frame = encode(ClientRequest::Ping);
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "heartbeat");
        assert_eq!(value["message"], "ping");
    }

    #[test]
    fn test_decode_track_update() {
        let frame = r#"{
            "message": "Current track update",
            "current_track": {
                "title": "Album of the Year",
                "artist": "Faith No More",
                "total_time": 200.0,
                "remaining_time": 150.0,
                "remaining_percentage": 75.0,
                "track_state": "playing",
                "elapsed_time": 50.0
            }
        }"#;

        let msg = decode(frame).unwrap();
        match msg {
            ServerMessage::CurrentTrackUpdate { current_track } => {
                assert_eq!(current_track.title, "Album of the Year");
                assert_eq!(current_track.track_state, PlayState::Playing);
                assert_eq!(current_track.elapsed_time, Some(50.0));
            }
            other => panic!("expected track update, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_queue_update_with_type_field() {
        // The server includes a routing `type` on queue frames; it is
        // irrelevant to decoding and must be tolerated.
        let frame = r#"{
            "type": "queue_update",
            "message": "Queue update",
            "queue": [
                {"item_id": 1, "title": "Roundabout", "artist": "Yes", "duration": 506000, "album_art": null},
                {"item_id": 2, "title": "Owner of a Lonely Heart"}
            ]
        }"#;

        let msg = decode(frame).unwrap();
        match msg {
            ServerMessage::QueueUpdate { queue } => {
                assert_eq!(queue.len(), 2);
                assert_eq!(queue[0].item_id, Some(1));
                assert_eq!(queue[1].artist, "Unknown Artist");
            }
            other => panic!("expected queue update, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_queue_entry_without_item_id() {
        // Servers may queue tracks that have no library identity; the
        // whole update must still decode.
        let frame = r#"{
            "message": "Queue update",
            "queue": [{"title": "Hidden Bonus Track", "artist": "Yes"}]
        }"#;

        let msg = decode(frame).unwrap();
        match msg {
            ServerMessage::QueueUpdate { queue } => {
                assert_eq!(queue.len(), 1);
                assert_eq!(queue[0].item_id, None);
                assert_eq!(queue[0].title, "Hidden Bonus Track");
            }
            other => panic!("expected queue update, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_queue() {
        let msg = decode(r#"{"message": "Queue update", "queue": []}"#).unwrap();
        assert!(matches!(msg, ServerMessage::QueueUpdate { queue } if queue.is_empty()));
    }

    #[test]
    fn test_decode_pong() {
        let msg = decode(r#"{"message": "pong"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Pong);
    }

    #[test]
    fn test_decode_unknown_message_is_unrecognized() {
        let msg = decode(r#"{"message": "Library rescan finished"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unrecognized);
    }

    #[test]
    fn test_decode_invalid_json_is_error() {
        assert!(decode("{not json at all").is_err());
    }

    #[test]
    fn test_decode_missing_message_field_is_error() {
        assert!(decode(r#"{"type": "heartbeat"}"#).is_err());
    }

    #[test]
    fn test_decode_known_message_with_bad_payload_is_error() {
        // A track update without its payload must fail decoding rather
        // than produce a half-empty snapshot.
        assert!(decode(r#"{"message": "Current track update"}"#).is_err());

        let missing_fields = r#"{
            "message": "Current track update",
            "current_track": {"title": "Orphan"}
        }"#;
        assert!(decode(missing_fields).is_err());
    }
}

//! Music API response models
//!
//! Shapes follow the server's JSON exactly. Note the two duration
//! conventions the server uses: queue items carry milliseconds, album
//! track listings carry seconds.

use serde::Deserialize;

fn unknown_artist() -> String {
    "Unknown Artist".to_string()
}

/// The playing track as reported by the `now-playing` endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Track length in seconds
    pub total_time: f64,
    /// Seconds left at the moment the server answered
    pub remaining_time: f64,
    #[serde(default)]
    pub remaining_percentage: f64,
    /// Player state, `playing`, `paused` or `stopped`
    pub track_state: String,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
}

/// One item of the play queue
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QueueItem {
    /// The server's library key for this item
    pub item_id: i64,
    pub title: String,
    #[serde(default = "unknown_artist")]
    pub artist: String,
    /// Track length in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    /// Server path of the cover image, when the library has one
    #[serde(default)]
    pub album_art: Option<String>,
}

/// A library artist
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub artist_id: i64,
    pub name: String,
}

/// A library album
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Album {
    pub album_id: i64,
    pub artist: String,
    pub title: String,
}

/// An album's track listing
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AlbumTracks {
    pub album_title: String,
    pub tracks: Vec<AlbumTrack>,
}

/// One track within an album listing
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AlbumTrack {
    pub track_id: i64,
    pub title: String,
    /// Track length in seconds
    pub duration: f64,
}

/// One library search hit, tagged by kind
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResult {
    Artist {
        name: String,
        artist_id: i64,
    },
    Album {
        title: String,
        album_id: i64,
        artist: String,
    },
    Track {
        title: String,
        track_id: i64,
        /// Track length in seconds
        duration: f64,
        artist: String,
        album: String,
    },
}

/// Envelope of the `now-playing` endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct NowPlayingResponse {
    pub current_track: NowPlaying,
}

/// Acknowledgement body of the command endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

/// FastAPI-style error body
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_item_defaults() {
        let item: QueueItem = serde_json::from_str(r#"{"item_id": 7, "title": "Lonely"}"#).unwrap();
        assert_eq!(item.artist, "Unknown Artist");
        assert_eq!(item.duration, None);
        assert_eq!(item.album_art, None);
    }

    #[test]
    fn test_queue_item_full() {
        let item: QueueItem = serde_json::from_str(
            r#"{
                "item_id": 12,
                "title": "Heart of the Sunrise",
                "artist": "Yes",
                "duration": 663000,
                "album_art": "/library/metadata/12/thumb"
            }"#,
        )
        .unwrap();
        assert_eq!(item.item_id, 12);
        assert_eq!(item.duration, Some(663_000));
        assert_eq!(item.album_art.as_deref(), Some("/library/metadata/12/thumb"));
    }

    #[test]
    fn test_search_results_are_tagged_by_kind() {
        let results: Vec<SearchResult> = serde_json::from_str(
            r#"[
                {"name": "Yes", "type": "artist", "artist_id": 3},
                {"title": "Fragile", "type": "album", "album_id": 14, "artist": "Yes"},
                {
                    "title": "Roundabout",
                    "type": "track",
                    "track_id": 99,
                    "duration": 506.0,
                    "artist": "Yes",
                    "album": "Fragile"
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(results.len(), 3);
        assert!(matches!(&results[0], SearchResult::Artist { artist_id: 3, .. }));
        assert!(matches!(&results[1], SearchResult::Album { artist, .. } if artist == "Yes"));
        assert!(
            matches!(&results[2], SearchResult::Track { album, duration, .. }
                if album == "Fragile" && *duration == 506.0)
        );
    }

    #[test]
    fn test_search_result_with_unknown_tag_is_an_error() {
        let result = serde_json::from_str::<SearchResult>(r#"{"type": "playlist", "title": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_album_tracks_parse() {
        let listing: AlbumTracks = serde_json::from_str(
            r#"{
                "album_title": "Fragile",
                "tracks": [
                    {"track_id": 1, "title": "Roundabout", "duration": 506.0},
                    {"track_id": 2, "title": "Cans and Brahms", "duration": 98.0}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(listing.album_title, "Fragile");
        assert_eq!(listing.tracks.len(), 2);
        assert_eq!(listing.tracks[1].duration, 98.0);
    }

    #[test]
    fn test_now_playing_response_envelope() {
        let response: NowPlayingResponse = serde_json::from_str(
            r#"{
                "current_track": {
                    "title": "South Side of the Sky",
                    "artist": "Yes",
                    "album": "Fragile",
                    "total_time": 485.0,
                    "remaining_time": 300.0,
                    "remaining_percentage": 61.9,
                    "track_state": "playing",
                    "elapsed_time": 185.0
                }
            }"#,
        )
        .unwrap();
        assert_eq!(response.current_track.album, "Fragile");
        assert_eq!(response.current_track.track_state, "playing");
    }
}

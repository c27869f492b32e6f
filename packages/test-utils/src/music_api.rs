//! Mock music server HTTP API
//!
//! Provides a [`MockMusicApi`] that simulates the server's control
//! endpoints for testing clients without a real server. Error bodies use
//! the server's `{"detail": ...}` shape.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock music server HTTP API
///
/// Wraps a [`wiremock::MockServer`] and provides convenience methods for
/// the common endpoint responses. Mount custom mocks through
/// [`inner`](MockMusicApi::inner) when a test needs something these
/// helpers do not cover.
pub struct MockMusicApi {
    server: MockServer,
}

impl MockMusicApi {
    /// Start a new mock API server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Base URL of the music API, the value an `ApiClient` is built with
    pub fn http_base(&self) -> String {
        format!("{}/api/music", self.server.uri())
    }

    /// Mount a mock for a currently playing track
    pub async fn mock_now_playing_success(&self, track: Value) {
        Mock::given(method("GET"))
            .and(path("/api/music/now-playing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current_track": track
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for the nothing-playing response
    pub async fn mock_now_playing_none(&self) {
        Mock::given(method("GET"))
            .and(path("/api/music/now-playing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "detail": "No track is currently playing"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for the current queue
    pub async fn mock_queue_success(&self, queue: &[Value]) {
        Mock::given(method("GET"))
            .and(path("/api/music/queue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(queue)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for the artist listing
    pub async fn mock_artists_success(&self, artists: &[Value]) {
        Mock::given(method("GET"))
            .and(path("/api/music/artists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(artists)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for one artist's album listing
    pub async fn mock_artist_albums_success(&self, artist_id: i64, albums: &[Value]) {
        Mock::given(method("GET"))
            .and(path(format!("/api/music/artists/{artist_id}/albums")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(albums)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for one album's track listing
    pub async fn mock_album_tracks_success(&self, album_id: i64, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/music/albums/{album_id}/tracks")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for library search results
    pub async fn mock_search_success(&self, results: &[Value]) {
        Mock::given(method("GET"))
            .and(path("/api/music/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(results)))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for successfully queueing an item
    pub async fn mock_add_to_queue_success(&self, item_id: i64) {
        Mock::given(method("POST"))
            .and(path(format!("/api/music/queue/{item_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Song added to the queue."
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for queueing an item that is already queued
    pub async fn mock_add_to_queue_conflict(&self, item_id: i64, title: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/api/music/queue/{item_id}")))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": format!("Song {title} is already in the queue.")
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for removing a queued item
    pub async fn mock_remove_from_queue_success(&self, item_id: i64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/music/queue/{item_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Song removed from the queue."
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for clearing the queue
    pub async fn mock_clear_queue_success(&self) {
        Mock::given(method("POST"))
            .and(path("/api/music/clear-queue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Queue cleared."
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for starting queue playback
    pub async fn mock_play_queue_success(&self) {
        Mock::given(method("POST"))
            .and(path("/api/music/play-queue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Playback started in the background."
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for a failing play-queue request
    pub async fn mock_play_queue_failure(&self, status_code: u16, detail: &str) {
        Mock::given(method("POST"))
            .and(path("/api/music/play-queue"))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(json!({
                "detail": detail
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for stopping playback
    pub async fn mock_stop_queue_success(&self) {
        Mock::given(method("POST"))
            .and(path("/api/music/stop-queue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Playback stopped."
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a delayed now-playing response, for timeout tests
    pub async fn mock_now_playing_delayed(&self, delay_ms: u64) {
        Mock::given(method("GET"))
            .and(path("/api/music/now-playing"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(delay_ms))
                    .set_body_json(json!({"current_track": null})),
            )
            .mount(&self.server)
            .await;
    }

    /// Get reference to the underlying mock server for custom mock setups
    pub fn inner(&self) -> &MockServer {
        &self.server
    }
}

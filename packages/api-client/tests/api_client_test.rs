//! Integration tests for the music API client
//!
//! Exercises the client against a mock music server, covering response
//! parsing, error mapping, and the retry split between queries and
//! commands.

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use tunebox_api_client::{ApiClient, ApiError, SearchResult};
use tunebox_test_utils::MockMusicApi;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn client_for(api: &MockMusicApi) -> ApiClient {
    ApiClient::new(api.http_base()).expect("client should build")
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Test now-playing parses the full track payload
#[tokio::test]
async fn test_now_playing_parses_track() {
    let api = MockMusicApi::start().await;
    api.mock_now_playing_success(json!({
        "title": "Close to the Edge",
        "artist": "Yes",
        "album": "Close to the Edge",
        "total_time": 1112.0,
        "remaining_time": 900.5,
        "remaining_percentage": 80.98,
        "track_state": "playing",
        "elapsed_time": 211.5
    }))
    .await;

    let track = client_for(&api)
        .now_playing()
        .await
        .expect("request should succeed")
        .expect("a track should be playing");

    assert_eq!(track.title, "Close to the Edge");
    assert_eq!(track.artist, "Yes");
    assert_eq!(track.album, "Close to the Edge");
    assert_eq!(track.total_time, 1112.0);
    assert_eq!(track.remaining_time, 900.5);
    assert_eq!(track.track_state, "playing");
    assert_eq!(track.elapsed_time, Some(211.5));
}

/// Test the idle 404 comes back as None rather than an error
#[tokio::test]
async fn test_now_playing_idle_is_none() {
    let api = MockMusicApi::start().await;
    api.mock_now_playing_none().await;

    let track = client_for(&api)
        .now_playing()
        .await
        .expect("request should succeed");

    assert!(track.is_none());
}

/// Test queue entries parse in order, with defaults for missing fields
#[tokio::test]
async fn test_queue_lists_entries_in_order() {
    let api = MockMusicApi::start().await;
    api.mock_queue_success(&[
        json!({
            "item_id": 11,
            "title": "Siberian Khatru",
            "artist": "Yes",
            "duration": 537_000,
            "album_art": "/api/music/album-art/4"
        }),
        json!({
            "item_id": 12,
            "title": "Untagged Bootleg"
        }),
    ])
    .await;

    let queue = client_for(&api).queue().await.expect("request should succeed");

    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].item_id, 11);
    assert_eq!(queue[0].title, "Siberian Khatru");
    assert_eq!(queue[0].duration, Some(537_000));
    assert_eq!(queue[1].item_id, 12);
    assert_eq!(queue[1].artist, "Unknown Artist");
    assert_eq!(queue[1].duration, None);
    assert_eq!(queue[1].album_art, None);
}

/// Test walking the library from artists to albums to tracks
#[tokio::test]
async fn test_library_browse_chain() {
    let api = MockMusicApi::start().await;
    api.mock_artists_success(&[json!({"artist_id": 1, "name": "Camel"})])
        .await;
    api.mock_artist_albums_success(
        1,
        &[json!({"album_id": 10, "artist": "Camel", "title": "Mirage"})],
    )
    .await;
    api.mock_album_tracks_success(
        10,
        json!({
            "album_title": "Mirage",
            "tracks": [
                {"track_id": 100, "title": "Freefall", "duration": 354.0},
                {"track_id": 101, "title": "Supertwister", "duration": 203.0}
            ]
        }),
    )
    .await;

    let client = client_for(&api);

    let artists = client.artists().await.expect("artists should list");
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].name, "Camel");

    let albums = client
        .artist_albums(artists[0].artist_id)
        .await
        .expect("albums should list");
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].title, "Mirage");

    let album = client
        .album_tracks(albums[0].album_id)
        .await
        .expect("tracks should list");
    assert_eq!(album.album_title, "Mirage");
    assert_eq!(album.tracks.len(), 2);
    assert_eq!(album.tracks[0].title, "Freefall");
    assert_eq!(album.tracks[0].duration, 354.0);
}

/// Test search results deserialize into their tagged variants
#[tokio::test]
async fn test_search_returns_tagged_results() {
    let api = MockMusicApi::start().await;
    api.mock_search_success(&[
        json!({"type": "artist", "name": "Focus", "artist_id": 5}),
        json!({"type": "album", "title": "Moving Waves", "album_id": 50, "artist": "Focus"}),
        json!({
            "type": "track",
            "title": "Hocus Pocus",
            "track_id": 500,
            "duration": 402.0,
            "artist": "Focus",
            "album": "Moving Waves"
        }),
    ])
    .await;

    let results = client_for(&api)
        .search("focus")
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 3);
    assert_matches!(&results[0], SearchResult::Artist { name, artist_id: 5 } if name == "Focus");
    assert_matches!(&results[1], SearchResult::Album { title, .. } if title == "Moving Waves");
    assert_matches!(
        &results[2],
        SearchResult::Track { title, duration, .. } if title == "Hocus Pocus" && *duration == 402.0
    );
}

// ============================================================================
// Commands
// ============================================================================

/// Test the queue editing and playback commands succeed against the mock
#[tokio::test]
async fn test_commands_succeed() {
    let api = MockMusicApi::start().await;
    api.mock_add_to_queue_success(21).await;
    api.mock_remove_from_queue_success(21).await;
    api.mock_clear_queue_success().await;
    api.mock_play_queue_success().await;
    api.mock_stop_queue_success().await;

    let client = client_for(&api);

    client.add_to_queue(21).await.expect("add should succeed");
    client
        .remove_from_queue(21)
        .await
        .expect("remove should succeed");
    client.clear_queue().await.expect("clear should succeed");
    client.play_queue().await.expect("play should succeed");
    client.stop_queue().await.expect("stop should succeed");
}

/// Test queueing a duplicate surfaces the server's conflict message
#[tokio::test]
async fn test_conflict_when_queueing_duplicate() {
    let api = MockMusicApi::start().await;
    api.mock_add_to_queue_conflict(7, "Roundabout").await;

    let result = client_for(&api).add_to_queue(7).await;

    assert_matches!(
        result,
        Err(ApiError::Conflict(detail)) if detail == "Song Roundabout is already in the queue."
    );

    // A rejected command must not be resent
    let requests = api.inner().received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

/// Test a missing library item surfaces the server's detail message
#[tokio::test]
async fn test_not_found_surfaces_detail() {
    let api = MockMusicApi::start().await;
    Mock::given(method("GET"))
        .and(path("/api/music/artists/99/albums"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Artist not found"
        })))
        .mount(api.inner())
        .await;

    let result = client_for(&api).artist_albums(99).await;

    assert_matches!(result, Err(ApiError::NotFound(detail)) if detail == "Artist not found");
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Test queries retry transient server errors and then succeed
#[tokio::test]
async fn test_queries_retry_transient_errors() {
    let api = MockMusicApi::start().await;

    // First two attempts fail, third succeeds
    Mock::given(method("GET"))
        .and(path("/api/music/artists"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": "Database connection lost"
        })))
        .up_to_n_times(2)
        .mount(api.inner())
        .await;
    Mock::given(method("GET"))
        .and(path("/api/music/artists"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"artist_id": 1, "name": "Can"}])),
        )
        .mount(api.inner())
        .await;

    let client = client_for(&api).with_retry_config(3, 1);
    let artists = client.artists().await.expect("retries should recover");

    assert_eq!(artists.len(), 1);
    let requests = api.inner().received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

/// Test a query that keeps failing gives up after the retry budget
#[tokio::test]
async fn test_queries_stop_after_retry_budget() {
    let api = MockMusicApi::start().await;
    Mock::given(method("GET"))
        .and(path("/api/music/queue"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "detail": "Server restarting"
        })))
        .mount(api.inner())
        .await;

    let client = client_for(&api).with_retry_config(2, 1);
    let result = client.queue().await;

    assert_matches!(result, Err(ApiError::Server { status: 503, .. }));
    let requests = api.inner().received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

/// Test commands are never retried, even on server errors
#[tokio::test]
async fn test_commands_are_not_retried() {
    let api = MockMusicApi::start().await;
    api.mock_play_queue_failure(500, "Playback worker crashed").await;

    let client = client_for(&api).with_retry_config(3, 1);
    let result = client.play_queue().await;

    assert_matches!(
        result,
        Err(ApiError::Server { status: 500, detail }) if detail == "Playback worker crashed"
    );
    let requests = api.inner().received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

/// Test a slow server maps to the timeout error
#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let api = MockMusicApi::start().await;
    api.mock_now_playing_delayed(500).await;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let client = ApiClient::with_client(api.http_base(), http_client).with_retry_config(0, 1);

    let result = client.now_playing().await;

    assert_matches!(result, Err(ApiError::Timeout));
}

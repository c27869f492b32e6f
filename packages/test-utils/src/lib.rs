//! Shared test utilities for TuneBox workspace
//!
//! This crate provides mock implementations of the music server's two
//! surfaces for testing without a real server. The mocks can be used
//! across every crate's test suite.
//!
//! # Mock Services
//!
//! - [`MockMusicServer`] - WebSocket push endpoint, scripted frame by frame
//! - [`MockMusicApi`] - HTTP control API backed by wiremock
//! - [`fixtures`] - JSON payload builders matching the wire format
//!
//! # Example
//!
//! ```rust,ignore
//! use tunebox_test_utils::{fixtures, MockMusicServer};
//!
//! #[tokio::test]
//! async fn test_with_mock_server() {
//!     let mut server = MockMusicServer::start().await;
//!
//!     // Point your client at server.ws_url(), then:
//!     let connection = server.next_connection().await.unwrap();
//!     connection.send_frame(fixtures::track_update(
//!         "Roundabout", "Yes", 506.0, 506.0, "playing",
//!     ));
//! }
//! ```

pub mod fixtures;
mod music_api;
mod music_server;

pub use music_api::MockMusicApi;
pub use music_server::{MockMusicServer, ServerConnection};

//! HTTP client for the music server's REST API
//!
//! Covers the request/response side of the music server: library browsing,
//! search, queue editing and playback commands. Live playback state is not
//! polled through this crate; the push connection in `tunebox-sync-client`
//! carries it.
//!
//! Queries (GET endpoints) retry transient failures with exponential
//! backoff. Commands are sent exactly once.
//!
//! # Example
//!
//! ```rust,no_run
//! use tunebox_api_client::ApiClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("http://localhost:8000/api/music")?;
//!
//! for artist in client.artists().await? {
//!     println!("{} (#{})", artist.name, artist.artist_id);
//! }
//!
//! if let Some(track) = client.now_playing().await? {
//!     println!("playing: {} - {}", track.artist, track.title);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use models::{
    Album, AlbumTrack, AlbumTracks, Artist, NowPlaying, QueueItem, SearchResult,
};

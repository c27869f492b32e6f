//! Music server HTTP API client implementation

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, instrument, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Album, AlbumTracks, Artist, ErrorBody, MessageResponse, NowPlaying, NowPlayingResponse,
    QueueItem, SearchResult,
};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default number of retry attempts for transient failures
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;

/// Cap on error body text kept for diagnostics
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Music server HTTP API client
///
/// Queries retry transient failures with exponential backoff. Commands
/// (queueing, playback control) are sent exactly once: they are not
/// idempotent, and a rejection like an already-queued song would only be
/// rejected again.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl ApiClient {
    /// Create a new client for a music API base URL, such as
    /// `http://localhost:8000/api/music`
    ///
    /// # Errors
    /// Returns `ApiError::Http` if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent("TuneBox/1.0")
            .build()?;

        Ok(Self::with_client(base_url, http_client))
    }

    /// Create a client with a custom HTTP client (useful for testing)
    pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }

    /// Configure retry behavior
    pub fn with_retry_config(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// List all artists in the library
    ///
    /// # Errors
    /// - `ApiError::Http` - If the HTTP request fails
    /// - `ApiError::Parse` - If the response is not the expected shape
    #[instrument(skip(self))]
    pub async fn artists(&self) -> ApiResult<Vec<Artist>> {
        let text = self.with_retry(|| self.fetch_text("/artists", &[])).await?;
        let artists: Vec<Artist> = serde_json::from_str(&text)?;
        debug!(count = artists.len(), "fetched artist list");
        Ok(artists)
    }

    /// List one artist's albums
    ///
    /// # Errors
    /// - `ApiError::NotFound` - If the artist does not exist
    /// - `ApiError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub async fn artist_albums(&self, artist_id: i64) -> ApiResult<Vec<Album>> {
        let path = format!("/artists/{artist_id}/albums");
        let text = self.with_retry(|| self.fetch_text(&path, &[])).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// List one album's tracks
    ///
    /// # Errors
    /// - `ApiError::NotFound` - If the album does not exist
    /// - `ApiError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub async fn album_tracks(&self, album_id: i64) -> ApiResult<AlbumTracks> {
        let path = format!("/albums/{album_id}/tracks");
        let text = self.with_retry(|| self.fetch_text(&path, &[])).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Search the library for artists, albums and tracks
    ///
    /// # Errors
    /// - `ApiError::Http` - If the HTTP request fails
    /// - `ApiError::Parse` - If the response is not the expected shape
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> ApiResult<Vec<SearchResult>> {
        let query_params = [("query", query)];
        let text = self
            .with_retry(|| self.fetch_text("/search", &query_params))
            .await?;
        let results: Vec<SearchResult> = serde_json::from_str(&text)?;
        debug!(query, result_count = results.len(), "library search finished");
        Ok(results)
    }

    /// The currently playing track, or `None` when nothing plays
    ///
    /// The server reports the idle state as a 404; that is an answer,
    /// not an error.
    ///
    /// # Errors
    /// - `ApiError::Http` - If the HTTP request fails
    /// - `ApiError::Parse` - If the response is not the expected shape
    #[instrument(skip(self))]
    pub async fn now_playing(&self) -> ApiResult<Option<NowPlaying>> {
        let fetched = self
            .with_retry(|| self.fetch_text("/now-playing", &[]))
            .await;
        match fetched {
            Ok(text) => {
                let response: NowPlayingResponse = serde_json::from_str(&text)?;
                Ok(Some(response.current_track))
            }
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The current play queue, in play order
    ///
    /// # Errors
    /// - `ApiError::Http` - If the HTTP request fails
    /// - `ApiError::Parse` - If the response is not the expected shape
    #[instrument(skip(self))]
    pub async fn queue(&self) -> ApiResult<Vec<QueueItem>> {
        let text = self.with_retry(|| self.fetch_text("/queue", &[])).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Add a library item to the queue
    ///
    /// # Errors
    /// - `ApiError::Conflict` - If the item is already queued
    /// - `ApiError::NotFound` - If the item does not exist
    /// - `ApiError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub async fn add_to_queue(&self, item_id: i64) -> ApiResult<()> {
        let url = self.url_for(&format!("/queue/{item_id}"));
        let message = self.send_command(self.http_client.post(url)).await?;
        debug!(item_id, message = %message, "queued item");
        Ok(())
    }

    /// Remove a queued item
    ///
    /// # Errors
    /// - `ApiError::NotFound` - If the item is not queued
    /// - `ApiError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub async fn remove_from_queue(&self, item_id: i64) -> ApiResult<()> {
        let url = self.url_for(&format!("/queue/{item_id}"));
        let message = self.send_command(self.http_client.delete(url)).await?;
        debug!(item_id, message = %message, "removed queued item");
        Ok(())
    }

    /// Empty the queue
    ///
    /// # Errors
    /// - `ApiError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub async fn clear_queue(&self) -> ApiResult<()> {
        let url = self.url_for("/clear-queue");
        let message = self.send_command(self.http_client.post(url)).await?;
        debug!(message = %message, "cleared queue");
        Ok(())
    }

    /// Start playing the queue
    ///
    /// The server starts playback in the background; the state change
    /// arrives through the push connection.
    ///
    /// # Errors
    /// - `ApiError::Server` - If the server cannot start playback
    /// - `ApiError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub async fn play_queue(&self) -> ApiResult<()> {
        let url = self.url_for("/play-queue");
        let message = self.send_command(self.http_client.post(url)).await?;
        debug!(message = %message, "queue playback requested");
        Ok(())
    }

    /// Stop playback
    ///
    /// # Errors
    /// - `ApiError::Server` - If the server cannot stop playback
    /// - `ApiError::Http` - If the HTTP request fails
    #[instrument(skip(self))]
    pub async fn stop_queue(&self) -> ApiResult<()> {
        let url = self.url_for("/stop-queue");
        let message = self.send_command(self.http_client.post(url)).await?;
        debug!(message = %message, "playback stop requested");
        Ok(())
    }

    /// URL of an album's cover image, served by the API as a JPEG stream
    pub fn album_art_url(&self, album_id: i64) -> String {
        self.url_for(&format!("/album-art/{album_id}"))
    }

    /// URL of an artist's image, served by the API as a JPEG stream
    pub fn artist_image_url(&self, artist_id: i64) -> String {
        self.url_for(&format!("/artist-image/{artist_id}"))
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run a query, retrying transient failures with exponential backoff
    async fn with_retry<T, F, Fut>(&self, operation: F) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay_ms = self.retry_base_delay_ms * 2u64.pow(attempt);
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "music API request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// GET a path and return the response body text
    async fn fetch_text(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<String> {
        let response = self
            .http_client
            .get(self.url_for(path))
            .query(query)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let response = Self::check_status(response).await?;
        response.text().await.map_err(ApiError::Http)
    }

    /// Send a command request exactly once and return its message
    async fn send_command(&self, request: RequestBuilder) -> ApiResult<String> {
        let response = request.send().await.map_err(Self::map_transport)?;
        let response = Self::check_status(response).await?;
        let text = response.text().await.map_err(ApiError::Http)?;
        let body: MessageResponse = serde_json::from_str(&text)?;
        Ok(body.message)
    }

    fn map_transport(e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(e)
        }
    }

    /// Turn non-success statuses into typed errors carrying the server's
    /// `detail` message
    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = Self::error_detail(response).await;
        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(detail)),
            StatusCode::BAD_REQUEST => Err(ApiError::Conflict(detail)),
            _ => Err(ApiError::Server {
                status: status.as_u16(),
                detail,
            }),
        }
    }

    async fn error_detail(response: Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(body) => match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => parsed.detail,
                Err(_) => body.chars().take(MAX_ERROR_BODY_SIZE).collect(),
            },
            Err(_) => format!("status {status} with unreadable body"),
        }
    }
}

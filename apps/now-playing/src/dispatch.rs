//! Bridges playback actions to the music server's HTTP API
//!
//! The push connection is receive-only; playback control goes through
//! the REST endpoints. Failures travel back to subscribers as
//! `ActionFailed` events, so dispatch itself stays fire-and-forget.

use futures_util::future::BoxFuture;
use tunebox_api_client::ApiClient;
use tunebox_sync_client::{ActionDispatcher, ActionError, ActionKind};

/// Sends playback actions to the server's control endpoints
#[derive(Debug, Clone)]
pub struct HttpActionDispatcher {
    api: ApiClient,
}

impl HttpActionDispatcher {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl ActionDispatcher for HttpActionDispatcher {
    fn dispatch(&self, action: ActionKind) -> BoxFuture<'static, Result<(), ActionError>> {
        let api = self.api.clone();
        Box::pin(async move {
            let sent = match action {
                ActionKind::Play => api.play_queue().await,
                ActionKind::Stop => api.stop_queue().await,
            };
            sent.map_err(|e| ActionError::new(e.to_string()))
        })
    }
}

//! Mock music server WebSocket endpoint
//!
//! Provides a [`MockMusicServer`] that accepts the same `/ws` upgrade as
//! a real server and hands each accepted socket to the test as a
//! [`ServerConnection`], so tests script the server side frame by frame.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

enum Outgoing {
    Text(String),
    Close,
}

/// Mock music server for connection-level tests
///
/// Listens on an ephemeral local port. Every client that connects shows
/// up in [`next_connection`](MockMusicServer::next_connection), in
/// order, so tests can observe reconnects as new connections arriving.
pub struct MockMusicServer {
    address: SocketAddr,
    connections: mpsc::UnboundedReceiver<ServerConnection>,
}

impl MockMusicServer {
    /// Start the server on an ephemeral port
    pub async fn start() -> Self {
        let (connections_tx, connections_rx) = mpsc::unbounded_channel();
        let app = Router::new()
            .route("/ws", get(upgrade_handler))
            .with_state(connections_tx);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock music server");
        let address = listener.local_addr().expect("mock music server address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            address,
            connections: connections_rx,
        }
    }

    /// The WebSocket URL clients should connect to
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.address)
    }

    /// Wait for the next client connection
    ///
    /// Tests asserting that no connection happens should wrap this in a
    /// timeout.
    pub async fn next_connection(&mut self) -> Option<ServerConnection> {
        self.connections.recv().await
    }
}

/// The server half of one accepted WebSocket connection
///
/// Dropping it closes the connection from the server side.
pub struct ServerConnection {
    frames: mpsc::UnboundedReceiver<String>,
    outgoing: mpsc::UnboundedSender<Outgoing>,
}

impl ServerConnection {
    /// Wait for the next text frame from the client, parsed as JSON
    ///
    /// Returns `None` once the client has closed the connection.
    pub async fn recv_frame(&mut self) -> Option<Value> {
        let text = self.frames.recv().await?;
        Some(serde_json::from_str(&text).expect("client frames are JSON"))
    }

    /// Push a JSON frame to the client
    pub fn send_frame(&self, frame: Value) {
        let _ = self.outgoing.send(Outgoing::Text(frame.to_string()));
    }

    /// Push a raw text frame, for scripting malformed payloads
    pub fn send_raw(&self, text: impl Into<String>) {
        let _ = self.outgoing.send(Outgoing::Text(text.into()));
    }

    /// Close the connection from the server side
    pub fn close(&self) {
        let _ = self.outgoing.send(Outgoing::Close);
    }
}

async fn upgrade_handler(
    ws: WebSocketUpgrade,
    State(connections): State<mpsc::UnboundedSender<ServerConnection>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| register(socket, connections))
}

async fn register(socket: WebSocket, connections: mpsc::UnboundedSender<ServerConnection>) {
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
    let connection = ServerConnection {
        frames: frames_rx,
        outgoing: outgoing_tx,
    };
    if connections.send(connection).is_err() {
        // The MockMusicServer itself was dropped.
        return;
    }
    drive(socket, frames_tx, outgoing_rx).await;
}

async fn drive(
    mut socket: WebSocket,
    frames: mpsc::UnboundedSender<String>,
    mut outgoing: mpsc::UnboundedReceiver<Outgoing>,
) {
    loop {
        tokio::select! {
            command = outgoing.recv() => match command {
                Some(Outgoing::Text(text)) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        return;
                    }
                }
                // None means the test dropped its ServerConnection.
                Some(Outgoing::Close) | None => {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if frames.send(text).is_err() {
                        return;
                    }
                }
                Some(Ok(Message::Close(_))) | None => return,
                Some(Ok(_)) => {}
                Some(Err(_)) => return,
            },
        }
    }
}

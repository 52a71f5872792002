//! Event-channel connection to the backend
//!
//! One persistent WebSocket carries the streamed chat exchange. Socket
//! I/O runs on a background task; the app talks to it through a pair of
//! bounded channels. There is no reconnect policy: when the channel
//! drops, chat streaming stays offline until the client restarts.

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use url::Url;

use aria_protocol::{decode_event, encode_event, ClientEvent, ServerEvent};
use aria_utils::{AriaError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Client connection to the backend's event channel
pub struct Connection {
    /// WebSocket URL (ws://host:port/ws)
    url: Url,
    /// Current state
    state: ConnectionState,
    /// Channel for outgoing events
    tx: mpsc::Sender<ClientEvent>,
    /// Channel for receiving events
    rx: mpsc::Receiver<ServerEvent>,
    /// Handle to the connection task
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Connection {
    /// Create a new connection (not yet connected)
    pub fn new(url: Url) -> Self {
        let (tx, _) = mpsc::channel(100);
        let (_, rx) = mpsc::channel(100);

        Self {
            url,
            state: ConnectionState::Disconnected,
            tx,
            rx,
            task_handle: None,
        }
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Connect to the backend
    pub async fn connect(&mut self) -> Result<()> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;

        let (stream, _) = connect_async(self.url.as_str()).await.map_err(|e| {
            self.state = ConnectionState::Disconnected;
            AriaError::Connection(format!("Failed to connect to {}: {}", self.url, e))
        })?;

        // Set up channels
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<ClientEvent>(100);
        let (incoming_tx, incoming_rx) = mpsc::channel::<ServerEvent>(100);

        self.tx = outgoing_tx;
        self.rx = incoming_rx;

        // Spawn connection task
        let handle = tokio::spawn(Self::connection_task(stream, outgoing_rx, incoming_tx));
        self.task_handle = Some(handle);

        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Disconnect from the backend
    pub async fn disconnect(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Send an event to the backend
    pub async fn send(&self, event: ClientEvent) -> Result<()> {
        if self.state != ConnectionState::Connected {
            return Err(AriaError::connection("Not connected"));
        }

        self.tx
            .send(event)
            .await
            .map_err(|_| AriaError::ConnectionClosed)?;

        Ok(())
    }

    /// Receive next event from the backend (blocking)
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.rx.recv().await
    }

    /// Try to receive without blocking
    pub fn try_recv(&mut self) -> Option<ServerEvent> {
        self.rx.try_recv().ok()
    }

    /// Background task that handles the actual socket I/O
    async fn connection_task(
        mut stream: WsStream,
        mut outgoing: mpsc::Receiver<ClientEvent>,
        incoming: mpsc::Sender<ServerEvent>,
    ) {
        loop {
            tokio::select! {
                // Handle outgoing events
                Some(event) = outgoing.recv() => {
                    let frame = match encode_event(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!("Failed to encode event: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = stream.send(Message::Text(frame)).await {
                        tracing::error!("Failed to send event: {}", e);
                        break;
                    }
                }

                // Handle incoming frames
                result = stream.next() => {
                    match result {
                        Some(Ok(Message::Text(text))) => {
                            match decode_event::<ServerEvent>(&text) {
                                Ok(event) => {
                                    tracing::debug!(
                                        event_type = ?std::mem::discriminant(&event),
                                        "Received event from channel"
                                    );
                                    if incoming.send(event).await.is_err() {
                                        // Receiver dropped
                                        tracing::debug!("Incoming channel closed, receiver dropped");
                                        break;
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!("Dropping undecodable frame: {}", e);
                                }
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            if stream.send(Message::Pong(payload)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Backend closed the event channel");
                            break;
                        }
                        Some(Ok(_)) => {
                            // Binary/pong frames are not part of the protocol
                        }
                        Some(Err(e)) => {
                            tracing::error!("Event channel error: {}", e);
                            break;
                        }
                        None => {
                            tracing::info!("Event channel stream ended");
                            break;
                        }
                    }
                }
            }
        }
    }
}

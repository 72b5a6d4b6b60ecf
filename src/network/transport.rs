//! Duplex Transport
//!
//! The byte-level seam under the connection manager. A [`Connector`]
//! opens a [`Transport`]; the manager only ever moves JSON text frames
//! through it. Tests plug in in-memory transports here.

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// Connection errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// No channel is active.
    #[error("not connected")]
    NotConnected,

    /// The channel task has exited.
    #[error("channel closed")]
    ChannelClosed,

    /// Could not open the channel.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// Frame could not be written.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Frame could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// An open duplex text channel.
pub trait Transport: Send + 'static {
    /// Write one text frame.
    fn send(&mut self, frame: String) -> impl Future<Output = Result<(), ConnectionError>> + Send;

    /// Read the next text frame. `None` once the peer has closed.
    fn recv(&mut self) -> impl Future<Output = Option<Result<String, ConnectionError>>> + Send;

    /// Close the channel. Errors are swallowed.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Opens transports. Called again for every reconnection attempt.
pub trait Connector: Send + Sync + 'static {
    /// Transport this connector produces.
    type Transport: Transport;

    /// Open a new channel.
    fn connect(&self) -> impl Future<Output = Result<Self::Transport, ConnectionError>> + Send;
}

// =============================================================================
// WEBSOCKET
// =============================================================================

/// Connects to a WebSocket URL.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    /// Create a connector for `url` (`ws://` or `wss://`).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self) -> Result<WebSocketTransport, ConnectionError> {
        let (stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| ConnectionError::ConnectFailed(e.to_string()))?;
        Ok(WebSocketTransport { stream })
    }
}

/// A connected WebSocket.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Transport for WebSocketTransport {
    async fn send(&mut self, frame: String) -> Result<(), ConnectionError> {
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| ConnectionError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, ConnectionError>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(Message::Binary(_))) => {
                    debug!("Ignoring binary frame");
                }
                // tungstenite answers pings itself
                Some(Ok(_)) => {}
                Some(Err(e)) => return Some(Err(ConnectionError::ReceiveFailed(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

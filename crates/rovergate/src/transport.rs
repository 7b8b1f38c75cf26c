//! WebSocket plumbing for the gateway server, built on `tokio-tungstenite`.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Errors from the WebSocket layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener or accepting a TCP connection failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// The WebSocket upgrade failed.
    #[error("handshake failed: {0}")]
    Handshake(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] tokio_tungstenite::tungstenite::Error),
}

/// Opaque per-process connection number, for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts WebSocket connections on a TCP port.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds to `addr`. Use port 0 to let the OS pick one.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::Bind)?;
        tracing::info!(addr, "websocket listener bound");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next TCP connection and performs the WebSocket upgrade.
    pub async fn accept(&self) -> Result<WsConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Bind)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(TransportError::Handshake)?;

        let id = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted websocket connection");

        Ok(WsConnection { id, ws })
    }
}

/// One client connection. Owned by its handler task, so no lock is needed.
pub struct WsConnection {
    id: ConnectionId,
    ws: WebSocketStream<TcpStream>,
}

impl WsConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Receives the next data frame.
    ///
    /// Text and binary frames both come back as bytes. Control frames are
    /// skipped. Returns `Ok(None)` once the peer closes.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::Receive(e)),
            }
        }
    }

    /// Sends `data` as a text frame when it is valid UTF-8 (JSON always is),
    /// otherwise as a binary frame.
    pub async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        let msg = match String::from_utf8(data) {
            Ok(text) => Message::Text(text.into()),
            Err(e) => Message::Binary(e.into_bytes().into()),
        };
        self.ws.send(msg).await.map_err(TransportError::Send)
    }

    /// Starts the closing handshake. Errors are ignored: the peer may
    /// already be gone.
    pub async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}

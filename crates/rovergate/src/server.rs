//! `GatewayServer` builder and accept loop.
//!
//! Puts the [`Gateway`] behind a WebSocket listener: one task per
//! connection, JSON envelopes in and out.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rovergate_protocol::JsonCodec;

use crate::GateError;
use crate::gateway::Gateway;
use crate::handler::handle_connection;
use crate::observer::{Observer, TracingObserver};
use crate::transport::WsListener;

/// Shared state handed to every connection task.
pub(crate) struct ServerState<O: Observer> {
    pub(crate) gateway: Arc<Gateway<O>>,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Duration,
}

/// Builder for a [`GatewayServer`].
///
/// ```rust,ignore
/// let server = GatewayServer::builder()
///     .bind("0.0.0.0:8080")
///     .idle_timeout(Duration::from_secs(60))
///     .build(gateway)
///     .await?;
/// server.run().await
/// ```
pub struct GatewayServerBuilder {
    bind_addr: String,
    idle_timeout: Duration,
}

impl GatewayServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(30),
        }
    }

    /// Address to listen on. Port 0 picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// How long a connection may sit without sending a frame before it is
    /// closed.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener. Connections are not accepted until
    /// [`GatewayServer::run`] is called.
    pub async fn build<O: Observer>(
        self,
        gateway: Arc<Gateway<O>>,
    ) -> Result<GatewayServer<O>, GateError> {
        let listener = WsListener::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState {
            gateway,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });
        Ok(GatewayServer { listener, state })
    }
}

impl Default for GatewayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound gateway server.
///
/// The observer type comes from the [`Gateway`] passed to
/// [`GatewayServerBuilder::build`].
pub struct GatewayServer<O: Observer = TracingObserver> {
    listener: WsListener,
    state: Arc<ServerState<O>>,
}

impl GatewayServer {
    /// Creates a new builder. Same as [`GatewayServerBuilder::new`].
    pub fn builder() -> GatewayServerBuilder {
        GatewayServerBuilder::new()
    }
}

impl<O: Observer> GatewayServer<O> {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever.
    pub async fn run(self) -> Result<(), GateError> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves. Connections already
    /// being served keep running on their own tasks.
    pub async fn run_until(
        self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), GateError> {
        tokio::pin!(shutdown);
        tracing::info!(addr = ?self.local_addr().ok(), "gateway server running");

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("gateway server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let conn_id = conn.id();
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    %conn_id,
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}

//! `GeochainServer` builder and server loop.
//!
//! This is the entry point for running a Geochain server. It ties the
//! layers together: transport → protocol → rooms.

use std::net::SocketAddr;
use std::sync::Arc;

use geochain_protocol::JsonCodec;
use geochain_room::{Dictionary, RoomManager};
use geochain_stats::StatsRecorder;
use geochain_transport::{Handshake, IncomingWebSocket, Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{GeochainError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Geochain server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use geochain::prelude::*;
///
/// # async fn run() -> Result<(), GeochainError> {
/// let dictionary = PlaceDictionary::load("places.json")?;
/// let server = GeochainServer::builder()
///     .bind("127.0.0.1:8080")
///     .build(Arc::new(dictionary), Arc::new(InMemoryStats::new()))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GeochainServerBuilder {
    config: ServerConfig,
}

impl GeochainServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration, bind address included.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener. Rooms check words against `dictionary` and
    /// report finished games to `stats`.
    pub async fn build(
        self,
        dictionary: Arc<dyn Dictionary>,
        stats: Arc<dyn StatsRecorder>,
    ) -> Result<GeochainServer, GeochainError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let rooms = RoomManager::new(dictionary, stats, self.config.room.clone());
        let state = Arc::new(ServerState {
            rooms: Mutex::new(rooms),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(GeochainServer { transport, state })
    }
}

impl Default for GeochainServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Geochain server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GeochainServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl GeochainServer {
    pub fn builder() -> GeochainServerBuilder {
        GeochainServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, GeochainError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop, spawning one task per connection. The
    /// WebSocket upgrade happens on that task, so a peer that stalls
    /// mid-handshake never holds up the next accept.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), GeochainError> {
        tracing::info!(addr = %self.state.config.bind_addr, "geochain server running");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(serve(incoming, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

async fn serve(incoming: IncomingWebSocket, state: Arc<ServerState>) {
    let peer = incoming.peer_addr();
    let conn = match tokio::time::timeout(state.config.handshake_timeout, incoming.handshake()).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            tracing::debug!(%peer, error = %e, "handshake failed");
            return;
        }
        Err(_) => {
            tracing::debug!(%peer, "handshake timed out");
            return;
        }
    };

    if let Err(e) = handle_connection(conn, state).await {
        tracing::debug!(%peer, error = %e, "connection ended with error");
    }
}

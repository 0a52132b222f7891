//! # Geochain
//!
//! Server for a multiplayer word-chain game played with place names.
//! Each accepted word must start with the last letter of the previous
//! one, may not repeat, and must be a known place. Misses cost lives,
//! and the last player standing wins.
//!
//! Players connect over WebSocket, choosing a name and a room in the
//! query string (`ws://host/?name=Ada&room=f00d42`), and exchange JSON
//! `{type, payload}` envelopes with their room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use geochain::prelude::*;
//!
//! # async fn run() -> Result<(), GeochainError> {
//! let config = ServerConfig::from_env()?;
//! let dictionary = PlaceDictionary::load(&config.dictionary_path)?;
//! let server = GeochainServer::builder()
//!     .config(config)
//!     .build(Arc::new(dictionary), Arc::new(InMemoryStats::new()))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::GeochainError;
pub use handler::DEFAULT_PLAYER_NAME;
pub use server::{GeochainServer, GeochainServerBuilder};

/// Everything needed to stand up a server.
pub mod prelude {
    pub use crate::{GeochainError, GeochainServer, GeochainServerBuilder, ServerConfig};
    pub use geochain_protocol::{
        ClientMessage, GameMode, GameSnapshot, GameState, PlayerId, RoomId, ServerMessage,
    };
    pub use geochain_room::{Dictionary, PlaceDictionary, PlaceInfo, RoomConfig};
    pub use geochain_stats::{InMemoryStats, JsonStatsStore, StatsRecorder};
}

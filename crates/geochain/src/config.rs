//! Server settings.

use std::path::PathBuf;
use std::time::Duration;

use geochain_room::RoomConfig;

use crate::GeochainError;

/// Configuration for a [`GeochainServer`](crate::GeochainServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// JSON file of known places.
    pub dictionary_path: PathBuf,
    /// JSON file for per-player totals. `None` keeps stats in memory only.
    pub stats_path: Option<PathBuf>,
    /// Messages a connection may fall behind before its room drops it.
    pub outbound_buffer: usize,
    /// A connection that sends nothing for this long is closed. `None`
    /// keeps quiet connections (spectators) open indefinitely.
    pub idle_timeout: Option<Duration>,
    /// Time a freshly accepted socket gets to finish the WebSocket upgrade.
    pub handshake_timeout: Duration,
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            dictionary_path: PathBuf::from("places.json"),
            stats_path: None,
            outbound_buffer: 256,
            idle_timeout: None,
            handshake_timeout: Duration::from_secs(10),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `GEOCHAIN_ADDR`, `GEOCHAIN_DICTIONARY`,
    /// `GEOCHAIN_STATS` and `GEOCHAIN_IDLE_TIMEOUT_SECS`. An idle timeout
    /// of `0` turns it off.
    pub fn from_env() -> Result<Self, GeochainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GeochainError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("GEOCHAIN_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(path) = lookup("GEOCHAIN_DICTIONARY") {
            config.dictionary_path = PathBuf::from(path);
        }
        config.stats_path = lookup("GEOCHAIN_STATS")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        if let Some(secs) = lookup("GEOCHAIN_IDLE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                GeochainError::Config(format!(
                    "GEOCHAIN_IDLE_TIMEOUT_SECS must be whole seconds, got {secs:?}"
                ))
            })?;
            config.idle_timeout = (secs > 0).then_some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

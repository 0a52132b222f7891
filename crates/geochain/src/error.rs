//! Unified error type for the Geochain server.

use geochain_protocol::ProtocolError;
use geochain_room::{DictionaryError, RoomError};
use geochain_stats::StatsError;
use geochain_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so `?`
/// converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GeochainError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, already seated, room stopped).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The place dictionary could not be loaded.
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    /// The stats store could not be opened.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// A setting from the environment could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use geochain_protocol::{PlayerId, RoomId};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let geochain_err: GeochainError = err.into();
        assert!(matches!(geochain_err, GeochainError::Transport(_)));
        assert!(geochain_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let geochain_err: GeochainError = err.into();
        assert!(matches!(geochain_err, GeochainError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::AlreadyInRoom(PlayerId(1), RoomId::new("abc123"));
        let geochain_err: GeochainError = err.into();
        assert!(matches!(geochain_err, GeochainError::Room(_)));
        assert!(geochain_err.to_string().contains("abc123"));
    }

    #[test]
    fn test_from_stats_error() {
        let err = StatsError::Io(std::io::Error::other("disk full"));
        let geochain_err: GeochainError = err.into();
        assert!(matches!(geochain_err, GeochainError::Stats(_)));
    }

    #[test]
    fn test_config_error_message() {
        let err = GeochainError::Config("GEOCHAIN_ADDR is empty".into());
        assert_eq!(err.to_string(), "invalid configuration: GEOCHAIN_ADDR is empty");
    }
}

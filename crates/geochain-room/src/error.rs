//! Error types for the room layer.

use geochain_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The player is already in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player is not in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The player has not joined any room.
    #[error("player {0} is not in any room")]
    NoRoom(PlayerId),

    /// The room's actor has stopped and no longer takes commands.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

/// Errors from building a place dictionary.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// The dictionary file could not be read.
    #[error("dictionary file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file is neither a list of `{name, type}` objects nor a list of
    /// names.
    #[error("dictionary is not a list of places: {0}")]
    Parse(#[from] serde_json::Error),
}

//! Wire protocol for Geochain.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`PlayerId`], [`GameMode`], [`GameSnapshot`], ...): the
//!   values carried inside messages.
//! - **Messages** ([`Envelope`], [`ClientMessage`], [`ServerMessage`]):
//!   the `{type, payload}` frames themselves.
//! - **Codec** ([`Codec`], [`JsonCodec`]): bytes ↔ values.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (actions)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{ClientMessage, Envelope, ServerMessage};
pub use types::{
    GameMode, GameSnapshot, GameState, MoveRecord, PlayerId, PlayerKind, PlayerView, RoomId,
};

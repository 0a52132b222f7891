//! Inbound and outbound messages.
//!
//! Clients send an [`Envelope`] `{ "type": ..., "payload": ... }`. The
//! `type` string picks the [`ClientMessage`] variant and the payload is
//! decoded against that variant's shape. Types the server does not know
//! become [`ClientMessage::Unrecognized`] instead of an error, so a newer
//! client never gets disconnected for talking ahead of the server.
//!
//! Server messages use the same envelope layout via serde's adjacent
//! tagging.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{GameSnapshot, PlayerId, ProtocolError, RoomId};

/// The raw inbound frame before its payload is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    /// Missing payloads read as `null`.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { kind: kind.into(), payload }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `START_GAME`. Both fields are optional; the mode name is kept as
    /// text so the room can decide what an unknown name means.
    StartGame {
        mode: Option<String>,
        settings: BTreeMap<String, i64>,
    },
    /// `ADD_BOT`
    AddBot,
    /// `SUBMIT_WORD`
    SubmitWord { word: String },
    /// `GET_STATUS`
    GetStatus,
    /// `JOIN_ROOM`, handled by the session layer rather than a room.
    JoinRoom { room_id: RoomId },
    /// Any other `type`.
    Unrecognized(String),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct StartGamePayload {
    mode: Option<String>,
    settings: Option<BTreeMap<String, i64>>,
}

#[derive(Deserialize)]
struct SubmitWordPayload {
    word: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomPayload {
    room_id: RoomId,
}

fn payload<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(ProtocolError::Decode)
}

impl TryFrom<Envelope> for ClientMessage {
    type Error = ProtocolError;

    /// # Errors
    /// Returns [`ProtocolError::Decode`] when a known type carries a
    /// payload of the wrong shape.
    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let message = match envelope.kind.as_str() {
            "START_GAME" => {
                let p: StartGamePayload = if envelope.payload.is_null() {
                    StartGamePayload::default()
                } else {
                    payload(envelope.payload)?
                };
                Self::StartGame {
                    mode: p.mode,
                    settings: p.settings.unwrap_or_default(),
                }
            }
            "ADD_BOT" => Self::AddBot,
            "SUBMIT_WORD" => {
                let p: SubmitWordPayload = payload(envelope.payload)?;
                Self::SubmitWord { word: p.word }
            }
            "GET_STATUS" => Self::GetStatus,
            "JOIN_ROOM" => {
                let p: JoinRoomPayload = payload(envelope.payload)?;
                Self::JoinRoom { room_id: p.room_id }
            }
            _ => Self::Unrecognized(envelope.kind),
        };
        Ok(message)
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Everything the server pushes to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Sent once per room a connection enters.
    Welcome {
        id: PlayerId,
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// Full room projection after a change.
    GameState(GameSnapshot),
    /// A rejected submission, sent only to the player who made it.
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}

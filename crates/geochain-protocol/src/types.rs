//! Core wire types: identities, game enums, and the `GAME_STATE` projection.
//!
//! Everything here is what a client sees. The room engine keeps its own
//! richer state and projects it into a [`GameSnapshot`] after each change.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique identifier for a participant, human or bot.
///
/// Serialized as a plain number. Map keys keyed by `PlayerId` (such as
/// `players` in a snapshot) come out as numeric strings, which is how
/// JSON objects carry integer keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Allocates a fresh id. Humans and bots share the same sequence so
    /// ids never collide inside a room.
    pub fn next() -> Self {
        Self(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The name of a room, chosen by the first client to ask for it or
/// generated by the server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Game enums
// ---------------------------------------------------------------------------

/// How accepted words are scored and how many lives players start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    /// Flat 10 points per word, three lives.
    #[default]
    Classic,
    /// Faster answers and longer words score more.
    PointRush,
    /// One life each; any mistake eliminates.
    SuddenDeath,
}

impl GameMode {
    /// The wire name, e.g. `"POINT_RUSH"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "CLASSIC",
            Self::PointRush => "POINT_RUSH",
            Self::SuddenDeath => "SUDDEN_DEATH",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ProtocolError;

    /// Parses a wire name. Matching ignores ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Classic, Self::PointRush, Self::SuddenDeath]
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProtocolError::InvalidMessage(format!("unknown game mode {s:?}")))
    }
}

/// Lifecycle of a room's game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    #[default]
    Waiting,
    Playing,
    Ended,
}

/// Whether a participant is a connected person or a server-driven bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerKind {
    Human,
    Bot,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One participant as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PlayerKind,
    pub score: u32,
    pub lives: u32,
    pub is_turn: bool,
    /// Accepted words (lower-cased) and how often this player used each.
    pub most_used_places: BTreeMap<String, u32>,
}

/// An accepted move in the game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Canonical spelling from the dictionary.
    pub word: String,
    /// Dictionary category, e.g. `"City"` or `"Country"`.
    #[serde(rename = "type")]
    pub category: String,
    /// Unix seconds.
    pub timestamp: i64,
}

/// The full `GAME_STATE` payload broadcast after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub players: BTreeMap<PlayerId, PlayerView>,
    pub state: GameState,
    /// Empty before the first accepted word.
    pub last_word: String,
    pub turn_order: Vec<PlayerId>,
    /// `None` when the room is empty.
    pub current_turn: Option<PlayerId>,
    pub history: Vec<MoveRecord>,
    pub round: u32,
    pub mode: GameMode,
    pub settings: BTreeMap<String, i64>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
        let pid: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PlayerId(42));
    }

    #[test]
    fn test_player_id_next_is_unique_and_increasing() {
        let a = PlayerId::next();
        let b = PlayerId::next();
        assert!(b > a);
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&RoomId::new("lobby")).unwrap(), "\"lobby\"");
        assert_eq!(RoomId::new("lobby").to_string(), "lobby");
    }

    // =====================================================================
    // Game enums
    // =====================================================================

    #[test]
    fn test_game_mode_wire_names() {
        assert_eq!(serde_json::to_string(&GameMode::PointRush).unwrap(), "\"POINT_RUSH\"");
        assert_eq!(serde_json::to_string(&GameMode::SuddenDeath).unwrap(), "\"SUDDEN_DEATH\"");
        assert_eq!(GameMode::default(), GameMode::Classic);
    }

    #[test]
    fn test_game_mode_parse_ignores_case() {
        assert_eq!("sudden_death".parse::<GameMode>().unwrap(), GameMode::SuddenDeath);
        assert_eq!("CLASSIC".parse::<GameMode>().unwrap(), GameMode::Classic);
    }

    #[test]
    fn test_game_mode_parse_unknown_fails() {
        let err = "BLITZ".parse::<GameMode>().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_game_state_wire_names() {
        assert_eq!(serde_json::to_string(&GameState::Waiting).unwrap(), "\"WAITING\"");
        assert_eq!(serde_json::to_string(&GameState::Ended).unwrap(), "\"ENDED\"");
    }

    // =====================================================================
    // Snapshot shape
    // =====================================================================

    fn sample_snapshot() -> GameSnapshot {
        let alice = PlayerId(1);
        let mut players = BTreeMap::new();
        players.insert(
            alice,
            PlayerView {
                id: alice,
                name: "alice".into(),
                kind: PlayerKind::Human,
                score: 10,
                lives: 3,
                is_turn: true,
                most_used_places: BTreeMap::from([("india".to_string(), 1)]),
            },
        );
        GameSnapshot {
            players,
            state: GameState::Playing,
            last_word: "India".into(),
            turn_order: vec![alice],
            current_turn: Some(alice),
            history: vec![MoveRecord {
                player_id: alice,
                player_name: "alice".into(),
                word: "India".into(),
                category: "Country".into(),
                timestamp: 1_700_000_000,
            }],
            round: 1,
            mode: GameMode::Classic,
            settings: BTreeMap::new(),
        }
    }

    #[test]
    fn test_snapshot_uses_camel_case_fields() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();

        assert_eq!(json["state"], "PLAYING");
        assert_eq!(json["lastWord"], "India");
        assert_eq!(json["turnOrder"][0], 1);
        assert_eq!(json["currentTurn"], 1);
        assert_eq!(json["round"], 1);
        assert_eq!(json["mode"], "CLASSIC");
        assert!(json["settings"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_players_keyed_by_string_id() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();
        let alice = &json["players"]["1"];

        assert_eq!(alice["type"], "HUMAN");
        assert_eq!(alice["isTurn"], true);
        assert_eq!(alice["mostUsedPlaces"]["india"], 1);
    }

    #[test]
    fn test_history_entry_shape() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();
        let entry = &json["history"][0];

        assert_eq!(entry["playerId"], 1);
        assert_eq!(entry["playerName"], "alice");
        assert_eq!(entry["type"], "Country");
        assert_eq!(entry["timestamp"], 1_700_000_000);
    }

    #[test]
    fn test_snapshot_survives_json_trip() {
        let snapshot = sample_snapshot();
        let text = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_empty_room_has_null_current_turn() {
        let mut snapshot = sample_snapshot();
        snapshot.current_turn = None;
        let json = serde_json::to_value(snapshot).unwrap();
        assert!(json["currentTurn"].is_null());
    }
}

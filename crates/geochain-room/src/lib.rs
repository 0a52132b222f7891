//! Word-chain rooms for Geochain.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! game: who is seated, whose turn it is, which places have been used.
//!
//! # Key types
//!
//! - [`RoomEngine`]: the rules as a pure state machine
//! - [`RoomManager`]: creates/destroys rooms, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Dictionary`]: the place-name lookup rooms validate against
//! - [`RoomConfig`]: lives, bot delays, queue sizes

mod bot;
mod config;
mod dictionary;
mod engine;
mod error;
mod manager;
mod room;
mod rules;
pub mod scoring;
mod turn;

pub use bot::BotAgent;
pub use config::RoomConfig;
pub use dictionary::{DEFAULT_CATEGORY, Dictionary, PlaceDictionary, PlaceInfo};
pub use engine::{Action, Effect, RoomEngine};
pub use error::{DictionaryError, RoomError};
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
pub use rules::{AcceptedWord, RuleViolation, WordValidator, required_letter, starts_with_letter};
pub use turn::{Removal, TurnScheduler};

//! Game statistics for Geochain.
//!
//! When a game ends, the room reports one [`GameResult`] per human
//! participant to a [`StatsRecorder`]. The room doesn't know or care where
//! the numbers go:
//!
//! - [`JsonStatsStore`] keeps running totals per player name in a JSON file.
//! - [`InMemoryStats`] just remembers every result (tests, or servers
//!   started without a stats file).
//!
//! ```text
//! Room Layer (above)  ← reports finished games
//!     ↕
//! Stats Layer (this crate)  ← aggregates and persists
//! ```

mod error;
mod recorder;
mod store;

pub use error::StatsError;
pub use recorder::{GameResult, InMemoryStats, StatsRecorder};
pub use store::{JsonStatsStore, PlayerStats};

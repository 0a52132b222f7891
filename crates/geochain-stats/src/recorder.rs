//! The recording hook rooms call when a game ends.

use std::sync::Mutex;

use crate::StatsError;

/// The outcome of one finished game for one human player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub player_name: String,
    pub score: u32,
    pub is_win: bool,
}

impl GameResult {
    pub fn new(player_name: impl Into<String>, score: u32, is_win: bool) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            is_win,
        }
    }
}

/// Somewhere to send finished-game results.
///
/// Recording is synchronous and may touch the disk. Callers on an async
/// runtime should run it inside `tokio::task::spawn_blocking`.
///
/// # Example
///
/// ```rust
/// use geochain_stats::{GameResult, StatsError, StatsRecorder};
///
/// /// Prints results instead of storing them.
/// struct LogOnly;
///
/// impl StatsRecorder for LogOnly {
///     fn record_game_result(&self, result: &GameResult) -> Result<(), StatsError> {
///         println!("{} scored {}", result.player_name, result.score);
///         Ok(())
///     }
/// }
/// ```
pub trait StatsRecorder: Send + Sync + 'static {
    /// Adds one finished game to the player's totals.
    fn record_game_result(&self, result: &GameResult) -> Result<(), StatsError>;
}

// ---------------------------------------------------------------------------
// InMemoryStats
// ---------------------------------------------------------------------------

/// Keeps every reported result in memory, in order.
#[derive(Debug, Default)]
pub struct InMemoryStats {
    results: Mutex<Vec<GameResult>>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn results(&self) -> Vec<GameResult> {
        match self.results.lock() {
            Ok(results) => results.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StatsRecorder for InMemoryStats {
    fn record_game_result(&self, result: &GameResult) -> Result<(), StatsError> {
        self.results
            .lock()
            .map_err(|_| StatsError::Poisoned)?
            .push(result.clone());
        Ok(())
    }
}

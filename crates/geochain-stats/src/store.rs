//! File-backed running totals per player name.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{GameResult, StatsError, StatsRecorder};

/// Lifetime totals for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub games_played: u32,
    pub total_score: u64,
    pub wins: u32,
}

impl PlayerStats {
    fn apply(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_score += u64::from(result.score);
        if result.is_win {
            self.wins += 1;
        }
    }
}

/// A [`StatsRecorder`] that keeps a JSON object of
/// `{ "<name>": {gamesPlayed, totalScore, wins} }` on disk.
///
/// The whole document is held in memory and rewritten after every
/// result. Writes go through one mutex, so concurrent rooms finishing at
/// the same moment cannot interleave their updates.
pub struct JsonStatsStore {
    path: PathBuf,
    players: Mutex<BTreeMap<String, PlayerStats>>,
}

impl JsonStatsStore {
    /// Loads the store from `path`. A missing or empty file is an empty
    /// store; the file is created on the first recorded result.
    ///
    /// # Errors
    /// [`StatsError::Io`] if the file exists but cannot be read, and
    /// [`StatsError::Parse`] if its contents are not a stats document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StatsError> {
        let path = path.as_ref().to_path_buf();
        let players = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), players = players.len(), "stats store opened");
        Ok(Self {
            path,
            players: Mutex::new(players),
        })
    }

    /// Current totals for `name`, if they have finished a game.
    pub fn stats_for(&self, name: &str) -> Option<PlayerStats> {
        self.players.lock().ok()?.get(name).copied()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsRecorder for JsonStatsStore {
    fn record_game_result(&self, result: &GameResult) -> Result<(), StatsError> {
        let mut players = self.players.lock().map_err(|_| StatsError::Poisoned)?;
        let entry = players.entry(result.player_name.clone()).or_default();
        entry.apply(result);
        debug!(
            player = %result.player_name,
            games = entry.games_played,
            total = entry.total_score,
            wins = entry.wins,
            "stats updated"
        );

        let json = serde_json::to_vec_pretty(&*players)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

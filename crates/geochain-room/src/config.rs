//! Room configuration.

use std::time::Duration;

use geochain_protocol::GameMode;

/// Tunables shared by every room a manager spawns.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Lives per player in `Classic` and `PointRush`.
    pub starting_lives: u32,

    /// Lives per player in `SuddenDeath`.
    pub sudden_death_lives: u32,

    /// Delay before a bot takes the opening turn of a game.
    pub bot_start_delay: Duration,

    /// Delay before a bot answers once the turn passes to it.
    pub bot_turn_delay: Duration,

    /// Random extra delay added to each bot turn. Zero keeps bot timing
    /// deterministic.
    pub bot_jitter: Duration,

    /// Capacity of each room's command queue.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            sudden_death_lives: 1,
            bot_start_delay: Duration::from_secs(1),
            bot_turn_delay: Duration::from_secs(2),
            bot_jitter: Duration::ZERO,
            command_buffer: 64,
        }
    }
}

impl RoomConfig {
    /// Lives a player gets when a game in `mode` starts, or when they
    /// join a room currently set to `mode`.
    pub fn lives_for(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::SuddenDeath => self.sudden_death_lives,
            GameMode::Classic | GameMode::PointRush => self.starting_lives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.bot_start_delay, Duration::from_secs(1));
        assert_eq!(config.bot_turn_delay, Duration::from_secs(2));
        assert_eq!(config.bot_jitter, Duration::ZERO);
    }

    #[test]
    fn test_lives_follow_mode() {
        let config = RoomConfig::default();
        assert_eq!(config.lives_for(GameMode::Classic), 3);
        assert_eq!(config.lives_for(GameMode::PointRush), 3);
        assert_eq!(config.lives_for(GameMode::SuddenDeath), 1);
    }
}

//! Points for accepted words.

use std::time::Duration;

use geochain_protocol::GameMode;

/// Flat award in `Classic` and `SuddenDeath`.
pub const FLAT_POINTS: u32 = 10;

/// Points for `word` accepted `elapsed` after the turn began.
///
/// `PointRush` pays `floor(100 / seconds) + 5 per character`, with
/// anything under a second counted as one second.
pub fn points_for(mode: GameMode, word: &str, elapsed: Duration) -> u32 {
    match mode {
        GameMode::Classic | GameMode::SuddenDeath => FLAT_POINTS,
        GameMode::PointRush => {
            let seconds = elapsed.as_secs_f64().max(1.0);
            let speed = (100.0 / seconds).floor() as u32;
            let length = word.chars().count() as u32;
            speed + 5 * length
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_modes_ignore_time_and_length() {
        assert_eq!(points_for(GameMode::Classic, "Aruba", Duration::from_secs(30)), 10);
        assert_eq!(points_for(GameMode::SuddenDeath, "Vatican City", Duration::ZERO), 10);
    }

    #[test]
    fn test_point_rush_two_seconds_five_letters() {
        assert_eq!(points_for(GameMode::PointRush, "Aruba", Duration::from_secs(2)), 75);
    }

    #[test]
    fn test_point_rush_sub_second_counts_as_one() {
        assert_eq!(points_for(GameMode::PointRush, "Peru", Duration::from_millis(200)), 120);
    }

    #[test]
    fn test_point_rush_floors_speed_bonus() {
        // 100 / 3 = 33.3
        assert_eq!(points_for(GameMode::PointRush, "Oslo", Duration::from_secs(3)), 53);
        // very slow answers still earn the length bonus
        assert_eq!(points_for(GameMode::PointRush, "Oslo", Duration::from_secs(500)), 20);
    }
}

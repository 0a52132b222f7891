//! Integration tests for the JSON-file stats store.

use std::sync::Arc;

use geochain_stats::{GameResult, JsonStatsStore, PlayerStats, StatsError, StatsRecorder};

// =========================================================================
// Opening
// =========================================================================

#[test]
fn test_missing_file_opens_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonStatsStore::open(dir.path().join("stats.json")).unwrap();

    assert_eq!(store.stats_for("anyone"), None);
    assert!(!store.path().exists(), "opening must not create the file");
}

#[test]
fn test_empty_file_opens_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    std::fs::write(&path, "  \n").unwrap();

    let store = JsonStatsStore::open(&path).unwrap();
    assert_eq!(store.stats_for("anyone"), None);
}

#[test]
fn test_corrupt_file_is_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let result = JsonStatsStore::open(&path);
    assert!(matches!(result, Err(StatsError::Parse(_))));
}

#[test]
fn test_existing_totals_are_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    std::fs::write(
        &path,
        r#"{"alice": {"gamesPlayed": 4, "totalScore": 120, "wins": 3}}"#,
    )
    .unwrap();

    let store = JsonStatsStore::open(&path).unwrap();
    assert_eq!(
        store.stats_for("alice"),
        Some(PlayerStats {
            games_played: 4,
            total_score: 120,
            wins: 3
        })
    );
}

// =========================================================================
// Recording
// =========================================================================

#[test]
fn test_first_result_creates_entry_and_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    let store = JsonStatsStore::open(&path).unwrap();

    store.record_game_result(&GameResult::new("bob", 30, true)).unwrap();

    assert_eq!(
        store.stats_for("bob"),
        Some(PlayerStats {
            games_played: 1,
            total_score: 30,
            wins: 1
        })
    );
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["bob"]["gamesPlayed"], 1);
}

#[test]
fn test_totals_persist_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");

    {
        let store = JsonStatsStore::open(&path).unwrap();
        store.record_game_result(&GameResult::new("carol", 10, false)).unwrap();
        store.record_game_result(&GameResult::new("carol", 25, true)).unwrap();
    }

    let store = JsonStatsStore::open(&path).unwrap();
    assert_eq!(
        store.stats_for("carol"),
        Some(PlayerStats {
            games_played: 2,
            total_score: 35,
            wins: 1
        })
    );
}

#[test]
fn test_concurrent_writers_do_not_lose_updates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    let store = Arc::new(JsonStatsStore::open(&path).unwrap());

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..5 {
                    store.record_game_result(&GameResult::new("dave", 1, false)).unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(store.stats_for("dave").unwrap().games_played, 40);
    let reopened = JsonStatsStore::open(&path).unwrap();
    assert_eq!(reopened.stats_for("dave").unwrap().total_score, 40);
}

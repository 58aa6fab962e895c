//! Scenario files on disk: loading, error reporting, and full runs.
//!
//! Run with: cargo test --release scenario_files

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::io::Write;

use conquest::{GameSession, Scenario, ScenarioError, run_scenario};
use tempfile::NamedTempFile;

const SKIRMISH: &str = r#"{
    "map": { "width": 30, "height": 12 },
    "max_ticks": 300,
    "players": [
        { "name": "west", "spawn": { "x": 4, "y": 6 } },
        { "name": "east", "spawn": { "x": 25, "y": 6 } },
        { "name": "middle", "spawn": { "x": 15, "y": 6 }, "radius": 0 }
    ],
    "actions": [
        { "tick": 0, "player": 0, "target": null, "percentage": 0.5 },
        { "tick": 0, "player": 1, "target": null, "percentage": 0.5 },
        { "tick": 60, "player": 0, "target": 2, "percentage": 1.0 },
        { "tick": 60, "player": 1, "target": 2, "percentage": 1.0 }
    ]
}"#;

fn write_scenario(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_scenario(SKIRMISH);
    let scenario = Scenario::load(file.path()).unwrap();
    assert_eq!(scenario.players.len(), 3);
    assert_eq!(scenario.max_ticks, 300);
    assert_eq!(scenario.actions.len(), 4);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = Scenario::load(&path).unwrap_err();
    match &err {
        ScenarioError::Io { path: reported, .. } => assert_eq!(reported, &path),
        other => panic!("expected I/O error, got {other:?}"),
    }
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_malformed_file() {
    let file = write_scenario("{ \"map\": { \"width\": 4 ");
    let err = Scenario::load(file.path()).unwrap_err();
    assert!(matches!(err, ScenarioError::Parse(_)));
}

#[test]
fn test_invalid_file_is_rejected_on_load() {
    let file = write_scenario(
        r#"{
            "map": { "width": 10, "height": 10 },
            "players": [ { "name": "alone", "spawn": { "x": 1, "y": 1 } } ]
        }"#,
    );
    let err = Scenario::load(file.path()).unwrap_err();
    assert!(matches!(err, ScenarioError::TooFewPlayers(1)));
}

#[test]
fn test_saved_scenario_reloads() {
    let scenario = Scenario::from_json(SKIRMISH).unwrap();
    let file = write_scenario(&scenario.to_json().unwrap());
    assert_eq!(Scenario::load(file.path()).unwrap(), scenario);
}

#[test]
fn test_run_is_deterministic() {
    let scenario = Scenario::from_json(SKIRMISH).unwrap();
    let first = run_scenario(&scenario, None).unwrap();
    let second = run_scenario(&scenario, None).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

/// A one-row lane: west must cross a gap of unclaimed land to reach the
/// single-tile middle player.
const LANE: &str = r#"{
    "map": { "width": 15, "height": 1 },
    "max_ticks": 50,
    "players": [
        { "name": "west", "spawn": { "x": 1, "y": 0 }, "radius": 1 },
        { "name": "middle", "spawn": { "x": 4, "y": 0 }, "radius": 0 },
        { "name": "east", "spawn": { "x": 12, "y": 0 }, "radius": 1 }
    ],
    "actions": [
        { "tick": 0, "player": 0, "target": null, "percentage": 0.5 },
        { "tick": 5, "player": 0, "target": 1, "percentage": 1.0 }
    ]
}"#;

#[test]
fn test_run_expands() {
    let scenario = Scenario::from_json(SKIRMISH).unwrap();
    let result = run_scenario(&scenario, None).unwrap();

    assert!(result.ticks_played <= 300);
    assert!(result.players[0].territory > 13);
    assert!(result.players[1].territory > 13);
    assert!(result.events.total() > 0);
}

#[test]
fn test_lane_elimination() {
    let file = write_scenario(LANE);
    let scenario = Scenario::load(file.path()).unwrap();
    let result = run_scenario(&scenario, None).unwrap();

    // Runs to the limit: two players survive.
    assert_eq!(result.ticks_played, 50);
    assert_eq!(result.elimination_order, vec![1]);

    let middle = &result.players[1];
    assert!(!middle.alive);
    assert_eq!(middle.territory, 0);
    assert_eq!(middle.eliminated_tick, Some(5));

    // The gap tile plus the middle tile.
    assert_eq!(result.players[0].territory, 5);
    assert_eq!(result.winner, Some(0));
}

#[test]
fn test_tick_override() {
    let scenario = Scenario::from_json(SKIRMISH).unwrap();
    let result = run_scenario(&scenario, Some(10)).unwrap();
    assert_eq!(result.ticks_played, 10);
    assert!(result.elimination_order.is_empty());
}

#[test]
fn test_session_from_file_matches_runner() {
    let file = write_scenario(SKIRMISH);
    let scenario = Scenario::load(file.path()).unwrap();

    let mut session = GameSession::from_scenario(&scenario).unwrap();
    let stepped = session.run();
    let direct = run_scenario(&scenario, None).unwrap();

    assert_eq!(stepped.ticks_played, direct.ticks_played);
    assert_eq!(stepped.winner, direct.winner);
    assert_eq!(stepped.elimination_order, direct.elimination_order);
}

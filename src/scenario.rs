//! Scenario files: the JSON description of one session.
//!
//! A scenario fixes the map size, the players and their spawns, the rules,
//! and a timeline of attack orders. Loading always validates, so a
//! [`Scenario`] obtained through [`Scenario::load`] or
//! [`Scenario::from_json`] can be handed to a session without further checks.
//!
//! ```json
//! {
//!   "map": { "width": 40, "height": 30 },
//!   "max_ticks": 500,
//!   "mode": { "type": "teams", "teams": [0, 0, 1] },
//!   "players": [
//!     { "name": "north", "spawn": { "x": 5, "y": 5 } },
//!     { "name": "south", "spawn": { "x": 5, "y": 25 }, "radius": 3 },
//!     { "name": "east",  "spawn": { "x": 35, "y": 15 } }
//!   ],
//!   "actions": [
//!     { "tick": 0, "player": 0, "target": null, "percentage": 0.5 },
//!     { "tick": 40, "player": 2, "target": 0, "percentage": 0.8 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::game::{Coord, EconomyConfig, MAX_LOOP_STEPS, PlayerId, Ruleset, TerritoryMap};

/// Default session length in ticks.
pub const DEFAULT_MAX_TICKS: u64 = 1000;

/// Default spawn radius (Manhattan distance).
pub const DEFAULT_SPAWN_RADIUS: u16 = 2;

/// Most player slots a scenario may request.
///
/// The attack registry keeps a `max_players²` pair matrix.
pub const MAX_PLAYERS: usize = 1024;

/// Map dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Width in tiles.
    pub width: u16,
    /// Height in tiles.
    pub height: u16,
}

/// Attack permission rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModeConfig {
    /// Everyone may attack everyone.
    #[default]
    FreeForAll,
    /// Fixed teams; `teams[i]` is the team of player `i`.
    Teams {
        /// Team per player.
        teams: Vec<u8>,
    },
}

/// One player entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Display name.
    pub name: String,
    /// Centre of the starting territory.
    pub spawn: Coord,
    /// Manhattan radius of the starting diamond.
    #[serde(default = "default_spawn_radius")]
    pub radius: u16,
}

/// One timed attack order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Tick at which the order is issued.
    pub tick: u64,
    /// Attacking player.
    pub player: PlayerId,
    /// Target player, or `null` for unclaimed land.
    #[serde(default)]
    pub target: Option<PlayerId>,
    /// Fraction of current troops to commit, in `(0, 1]`.
    pub percentage: f64,
}

/// A complete session description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Map dimensions.
    pub map: MapConfig,
    /// Player slots in the attack indices. Defaults to the player count.
    #[serde(default)]
    pub max_players: Option<usize>,
    /// Tick limit.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Permission rules.
    #[serde(default)]
    pub mode: ModeConfig,
    /// Whether attackers must touch their target.
    #[serde(default)]
    pub require_shared_border: bool,
    /// Income tuning.
    #[serde(default)]
    pub economy: EconomyConfig,
    /// Players in id order.
    pub players: Vec<PlayerConfig>,
    /// Timed attack orders.
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

const fn default_max_ticks() -> u64 {
    DEFAULT_MAX_TICKS
}

const fn default_spawn_radius() -> u16 {
    DEFAULT_SPAWN_RADIUS
}

impl Scenario {
    /// Read and validate a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// the scenario schema, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| ScenarioError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the scenario is invalid.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serialize the scenario as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Player slots the attack registry is sized for.
    #[must_use]
    pub fn effective_max_players(&self) -> usize {
        self.max_players.unwrap_or(self.players.len())
    }

    /// Build the permission rules this scenario describes.
    #[must_use]
    pub fn ruleset(&self) -> Ruleset {
        let rules = match &self.mode {
            ModeConfig::FreeForAll => Ruleset::free_for_all(),
            ModeConfig::Teams { teams } => Ruleset::teams(teams.clone()),
        };
        rules.with_shared_border(self.require_shared_border)
    }

    /// Check the scenario for consistency.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let MapConfig { width, height } = self.map;
        let Some(map) = TerritoryMap::new(width, height) else {
            return Err(ScenarioError::InvalidMap { width, height });
        };

        let count = self.players.len();
        if count < 2 {
            return Err(ScenarioError::TooFewPlayers(count));
        }
        let max = self.effective_max_players();
        if count > max || max > MAX_PLAYERS {
            return Err(ScenarioError::TooManyPlayers { count, max });
        }

        let steps = self.economy.loop_steps();
        if steps > MAX_LOOP_STEPS {
            return Err(ScenarioError::IncomeLoopTooLong {
                steps,
                max: MAX_LOOP_STEPS,
            });
        }

        // A diamond this wide already covers the whole map from any spawn.
        let span = u32::from(width) + u32::from(height);
        for (index, player) in self.players.iter().enumerate() {
            let Coord { x, y } = player.spawn;
            if !map.in_bounds(player.spawn) {
                return Err(ScenarioError::SpawnOutOfBounds {
                    player: index,
                    x,
                    y,
                });
            }
            if u32::from(player.radius) > span {
                return Err(ScenarioError::SpawnRadiusTooLarge {
                    player: index,
                    radius: player.radius,
                    max: span,
                });
            }
            // Earlier players claim first; a later spawn point must stay free.
            let earlier = self.players[..index]
                .iter()
                .position(|e| e.spawn.manhattan(player.spawn) <= u32::from(e.radius));
            if let Some(first) = earlier {
                return Err(ScenarioError::SpawnOverlap {
                    first,
                    second: index,
                });
            }
        }

        match &self.mode {
            ModeConfig::Teams { teams } if teams.len() != count => {
                return Err(ScenarioError::TeamsMismatch {
                    teams: teams.len(),
                    players: count,
                });
            }
            _ => {}
        }

        for (index, action) in self.actions.iter().enumerate() {
            for player in std::iter::once(action.player).chain(action.target) {
                if usize::from(player) >= count {
                    return Err(ScenarioError::UnknownPlayer {
                        action: index,
                        player,
                    });
                }
            }
            if action.target == Some(action.player) {
                return Err(ScenarioError::SelfAttack { action: index });
            }
            if !(action.percentage > 0.0 && action.percentage <= 1.0) {
                return Err(ScenarioError::InvalidPercentage {
                    action: index,
                    percentage: action.percentage,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUEL: &str = r#"{
        "map": { "width": 20, "height": 10 },
        "players": [
            { "name": "west", "spawn": { "x": 3, "y": 5 } },
            { "name": "east", "spawn": { "x": 16, "y": 5 }, "radius": 1 }
        ],
        "actions": [
            { "tick": 0, "player": 0, "target": null, "percentage": 0.5 },
            { "tick": 5, "player": 1, "target": 0, "percentage": 1.0 }
        ]
    }"#;

    #[test]
    fn test_parse_with_defaults() {
        let scenario = Scenario::from_json(DUEL).unwrap();
        assert_eq!(scenario.max_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(scenario.mode, ModeConfig::FreeForAll);
        assert_eq!(scenario.economy, EconomyConfig::default());
        assert_eq!(scenario.effective_max_players(), 2);
        assert_eq!(scenario.players[0].radius, DEFAULT_SPAWN_RADIUS);
        assert_eq!(scenario.players[1].radius, 1);
        assert_eq!(scenario.actions[0].target, None);
        assert_eq!(scenario.actions[1].target, Some(0));
    }

    #[test]
    fn test_parse_teams_and_economy() {
        let json = r#"{
            "map": { "width": 8, "height": 8 },
            "max_players": 4,
            "mode": { "type": "teams", "teams": [1, 2] },
            "require_shared_border": true,
            "economy": { "income_interval": 5 },
            "players": [
                { "name": "a", "spawn": { "x": 1, "y": 1 } },
                { "name": "b", "spawn": { "x": 6, "y": 6 } }
            ]
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert_eq!(scenario.effective_max_players(), 4);
        assert_eq!(scenario.economy.income_interval, 5);
        assert_eq!(scenario.economy.tick_ms, 500);
        assert!(scenario.require_shared_border);
        assert!(!scenario.ruleset().are_teammates(0, 1));
    }

    #[test]
    fn test_json_round_trip_preserves_scenario() {
        let scenario = Scenario::from_json(DUEL).unwrap();
        let again = Scenario::from_json(&scenario.to_json().unwrap()).unwrap();
        assert_eq!(scenario, again);
    }

    #[test]
    fn test_malformed_json() {
        let err = Scenario::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_zero_sized_map_rejected() {
        let mut scenario = Scenario::from_json(DUEL).unwrap();
        scenario.map.height = 0;
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::InvalidMap { height: 0, .. })
        ));
    }

    #[test]
    fn test_player_count_limits() {
        let mut scenario = Scenario::from_json(DUEL).unwrap();
        scenario.max_players = Some(1);
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::TooManyPlayers { count: 2, max: 1 })
        ));

        scenario.max_players = Some(MAX_PLAYERS);
        assert!(scenario.validate().is_ok());

        // The pair matrix would need 65535² cells.
        scenario.max_players = Some(usize::from(PlayerId::MAX));
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::TooManyPlayers { count: 2, max: 65535 })
        ));

        scenario.max_players = None;
        scenario.players.pop();
        scenario.actions.clear();
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::TooFewPlayers(1))
        ));
    }

    #[test]
    fn test_spawn_checks() {
        let mut scenario = Scenario::from_json(DUEL).unwrap();
        scenario.players[1].spawn = Coord::new(20, 5);
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::SpawnOutOfBounds { player: 1, .. })
        ));

        scenario.players[1].spawn = Coord::new(16, 5);
        scenario.players[1].radius = 30;
        assert!(scenario.validate().is_ok());
        scenario.players[1].radius = u16::MAX;
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::SpawnRadiusTooLarge {
                player: 1,
                radius: u16::MAX,
                max: 30
            })
        ));
        scenario.players[1].radius = 1;

        scenario.players[1].spawn = Coord::new(3, 5);
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::SpawnOverlap {
                first: 0,
                second: 1
            })
        ));
    }

    #[test]
    fn test_income_loop_bounded() {
        let json = r#"{
            "map": { "width": 8, "height": 8 },
            "economy": { "income_loop_ms": 10000000000, "tick_ms": 1 },
            "players": [
                { "name": "a", "spawn": { "x": 1, "y": 1 } },
                { "name": "b", "spawn": { "x": 6, "y": 6 } }
            ]
        }"#;
        assert!(matches!(
            Scenario::from_json(json),
            Err(ScenarioError::IncomeLoopTooLong {
                steps: 10_000_000_000,
                max: MAX_LOOP_STEPS
            })
        ));

        let mut scenario = Scenario::from_json(DUEL).unwrap();
        scenario.economy.income_loop_ms = MAX_LOOP_STEPS;
        scenario.economy.tick_ms = 1;
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_action_checks() {
        let base = Scenario::from_json(DUEL).unwrap();

        let mut scenario = base.clone();
        scenario.actions[1].target = Some(9);
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::UnknownPlayer {
                action: 1,
                player: 9
            })
        ));

        let mut scenario = base.clone();
        scenario.actions[1].target = Some(1);
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::SelfAttack { action: 1 })
        ));

        for bad in [0.0, -0.5, 1.01, f64::NAN] {
            let mut scenario = base.clone();
            scenario.actions[0].percentage = bad;
            assert!(
                matches!(
                    scenario.validate(),
                    Err(ScenarioError::InvalidPercentage { action: 0, .. })
                ),
                "percentage {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_teams_must_cover_players() {
        let mut scenario = Scenario::from_json(DUEL).unwrap();
        scenario.mode = ModeConfig::Teams { teams: vec![0] };
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::TeamsMismatch {
                teams: 1,
                players: 2
            })
        ));
    }
}

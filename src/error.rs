//! Error types for scenario loading and validation.
//!
//! The simulation core never fails: illegal attack requests are dropped and
//! troop counts clamp. Only the configuration boundary returns errors.

use std::fmt;
use std::path::PathBuf;

/// Error type for scenario operations.
#[derive(Debug)]
pub enum ScenarioError {
    /// Reading the scenario file failed.
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        error: std::io::Error,
    },
    /// The scenario is not valid JSON for the expected schema.
    Parse(serde_json::Error),
    /// Map dimensions are zero or overflow the tile index.
    InvalidMap {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },
    /// Not enough players (minimum 2).
    TooFewPlayers(usize),
    /// More players than `max_players` allows.
    TooManyPlayers {
        /// Players listed.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A spawn coordinate lies outside the map.
    SpawnOutOfBounds {
        /// Player index (0-based).
        player: usize,
        /// Spawn x.
        x: u16,
        /// Spawn y.
        y: u16,
    },
    /// A spawn point falls inside an earlier player's starting territory.
    SpawnOverlap {
        /// First player index.
        first: usize,
        /// Second player index.
        second: usize,
    },
    /// A spawn radius reaches further than the map itself.
    SpawnRadiusTooLarge {
        /// Player index (0-based).
        player: usize,
        /// Requested radius.
        radius: u16,
        /// Largest useful radius on this map.
        max: u32,
    },
    /// The income ramp has more pulses than the engine supports.
    IncomeLoopTooLong {
        /// Pulses per ramp (`income_loop_ms / tick_ms`).
        steps: u64,
        /// Supported maximum.
        max: u64,
    },
    /// An action references a player that does not exist.
    UnknownPlayer {
        /// Action index in the file.
        action: usize,
        /// Referenced player id.
        player: u16,
    },
    /// An action's percentage is outside `(0, 1]`.
    InvalidPercentage {
        /// Action index in the file.
        action: usize,
        /// Offending value.
        percentage: f64,
    },
    /// An action has a player attack itself.
    SelfAttack {
        /// Action index in the file.
        action: usize,
    },
    /// Teams mode needs exactly one team per player.
    TeamsMismatch {
        /// Teams listed.
        teams: usize,
        /// Players listed.
        players: usize,
    },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, error } => {
                write!(f, "Failed to read scenario {}: {error}", path.display())
            }
            Self::Parse(e) => write!(f, "Failed to parse scenario: {e}"),
            Self::InvalidMap { width, height } => {
                write!(f, "Invalid map size: {width}x{height}")
            }
            Self::TooFewPlayers(n) => write!(f, "Too few players: {n} (minimum 2)"),
            Self::TooManyPlayers { count, max } => {
                write!(f, "Too many players: {count} (maximum {max})")
            }
            Self::SpawnOutOfBounds { player, x, y } => {
                write!(f, "Spawn of player {player} at ({x}, {y}) is off the map")
            }
            Self::SpawnOverlap { first, second } => {
                write!(f, "Spawn of player {second} lies inside player {first}'s start")
            }
            Self::SpawnRadiusTooLarge {
                player,
                radius,
                max,
            } => {
                write!(
                    f,
                    "Spawn radius {radius} of player {player} exceeds map span {max}"
                )
            }
            Self::IncomeLoopTooLong { steps, max } => {
                write!(f, "Income loop has {steps} steps (maximum {max})")
            }
            Self::UnknownPlayer { action, player } => {
                write!(f, "Action {action} references unknown player {player}")
            }
            Self::InvalidPercentage { action, percentage } => {
                write!(
                    f,
                    "Action {action} has percentage {percentage} (must be in (0, 1])"
                )
            }
            Self::SelfAttack { action } => write!(f, "Action {action} attacks its own player"),
            Self::TeamsMismatch { teams, players } => {
                write!(f, "Teams mode lists {teams} teams for {players} players")
            }
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        let e = ScenarioError::TooFewPlayers(1);
        assert_eq!(e.to_string(), "Too few players: 1 (minimum 2)");

        let e = ScenarioError::InvalidPercentage {
            action: 3,
            percentage: 1.5,
        };
        assert!(e.to_string().contains("1.5"));

        let e = ScenarioError::IncomeLoopTooLong {
            steps: 10_000_000_000,
            max: 1_000_000,
        };
        assert_eq!(
            e.to_string(),
            "Income loop has 10000000000 steps (maximum 1000000)"
        );
    }

    #[test]
    fn test_parse_error_has_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e = ScenarioError::from(json_err);
        assert!(e.source().is_some());
        assert!(ScenarioError::SelfAttack { action: 0 }.source().is_none());
    }
}

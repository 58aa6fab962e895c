//! Income system: periodic troop growth.
//!
//! Income pulses every `income_interval` ticks. The territory share follows a
//! quadratic ramp that resets every `income_loop_ms / tick_ms` pulses, so a
//! player's land pays out slowly at the start of each loop and peaks at the
//! end. The troop share is a small interest on troops already held.
//!
//! # Income Model
//!
//! ```text
//! step                 = (tick / income_interval) mod (income_loop_ms / tick_ms)
//! territory_multiplier = step² / Σ_{k=1..steps} k²
//! troop_multiplier     = (1 + e^(−tick / income_loop_ms)) / 40
//! income               = max(1, ⌊territory × tm + ⌊troops × trm⌋⌋)
//! ```
//!
//! Income is always clamped by the per-tile troop cap.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::game::World;

/// Longest territory ramp, in pulses, a scenario may configure.
pub const MAX_LOOP_STEPS: u64 = 1_000_000;

/// Tunable income parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Ticks between income pulses.
    pub income_interval: u64,
    /// Length of one territory ramp, in milliseconds.
    pub income_loop_ms: u64,
    /// Simulated duration of one tick, in milliseconds.
    pub tick_ms: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            income_interval: 10,
            income_loop_ms: 10_000,
            tick_ms: 500,
        }
    }
}

impl EconomyConfig {
    /// Number of pulses in one territory ramp.
    #[must_use]
    pub const fn loop_steps(&self) -> u64 {
        if self.tick_ms == 0 {
            0
        } else {
            self.income_loop_ms / self.tick_ms
        }
    }

    /// Whether income is paid on `tick`.
    #[must_use]
    pub const fn is_income_tick(&self, tick: u64) -> bool {
        self.income_interval != 0 && tick % self.income_interval == 0
    }
}

/// Multipliers applied to every player on an income tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeRates {
    /// Troops per owned tile.
    pub territory: f64,
    /// Troops per troop already held.
    pub troops: f64,
}

/// Sum of `k²` for `k` in `1..=n`, or `None` if it overflows `u64`.
#[must_use]
pub fn sum_of_squares_up_to(n: u64) -> Option<u64> {
    let product = n
        .checked_mul(n.checked_add(1)?)?
        .checked_mul(n.checked_mul(2)?.checked_add(1)?)?;
    Some(product / 6)
}

/// Income multipliers for `tick`, or `None` when no income is paid.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn income_rates(config: &EconomyConfig, tick: u64) -> Option<IncomeRates> {
    if !config.is_income_tick(tick) {
        return None;
    }
    let steps = config.loop_steps();
    if steps == 0 || config.income_loop_ms == 0 {
        return None;
    }

    let step = ((tick / config.income_interval) % steps) as f64;
    let total = sum_of_squares_up_to(steps).map_or_else(
        || {
            let n = steps as f64;
            n * (n + 1.0) * (2.0 * n + 1.0) / 6.0
        },
        |sum| sum as f64,
    );
    let territory = step * step / total;
    let troops = (1.0 + (-(tick as f64) / config.income_loop_ms as f64).exp()) / 40.0;

    Some(IncomeRates { territory, troops })
}

/// Pay income to every living player if `tick` is an income tick.
///
/// Returns `true` if income was paid.
pub fn apply_income(world: &mut World, config: &EconomyConfig, tick: u64) -> bool {
    let Some(rates) = income_rates(config, tick) else {
        return false;
    };

    for player in world.alive_players_mut() {
        player.income(rates.territory, rates.troops);
    }

    trace!(
        tick,
        territory = rates.territory,
        troops = rates.troops,
        "income paid"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Coord, TerritoryMap};

    fn create_test_world() -> World {
        let map = TerritoryMap::new(10, 10).unwrap();
        let mut world = World::new(map);
        for name in ["a", "b"] {
            world.add_player(name);
        }
        for x in 0..5 {
            let tile = world.map.index_of(Coord::new(x, 0)).unwrap();
            world.transfer_tile(tile, 0);
        }
        let lone = world.map.index_of(Coord::new(9, 9)).unwrap();
        world.transfer_tile(lone, 1);
        world.player_mut(0).unwrap().remove_troops(u32::MAX);
        world.player_mut(1).unwrap().remove_troops(u32::MAX);
        world
    }

    #[test]
    fn test_sum_of_squares() {
        assert_eq!(sum_of_squares_up_to(0), Some(0));
        assert_eq!(sum_of_squares_up_to(1), Some(1));
        assert_eq!(sum_of_squares_up_to(3), Some(14));
        assert_eq!(sum_of_squares_up_to(20), Some(2870));
        assert!(sum_of_squares_up_to(MAX_LOOP_STEPS).is_some());
        assert_eq!(sum_of_squares_up_to(10_000_000_000), None);
        assert_eq!(sum_of_squares_up_to(u64::MAX), None);
    }

    #[test]
    fn test_huge_loop_rates_stay_finite() {
        let config = EconomyConfig {
            income_interval: 1,
            income_loop_ms: 10_000_000_000,
            tick_ms: 1,
        };
        for tick in [0, 1, 3, 9_999_999_999] {
            let rates = income_rates(&config, tick).unwrap();
            assert!(rates.territory.is_finite());
            assert!((0.0..1.0).contains(&rates.territory));
        }

        let config = EconomyConfig {
            income_interval: 1,
            income_loop_ms: u64::MAX,
            tick_ms: 1,
        };
        let rates = income_rates(&config, u64::MAX - 1).unwrap();
        assert!(rates.territory.is_finite());
    }

    #[test]
    fn test_default_config_loop() {
        let config = EconomyConfig::default();
        assert_eq!(config.loop_steps(), 20);
        assert!(config.is_income_tick(0));
        assert!(config.is_income_tick(30));
        assert!(!config.is_income_tick(31));
    }

    #[test]
    fn test_rates_off_tick() {
        let config = EconomyConfig::default();
        assert!(income_rates(&config, 7).is_none());
    }

    #[test]
    fn test_territory_ramp() {
        let config = EconomyConfig::default();

        let start = income_rates(&config, 0).unwrap();
        assert!(start.territory.abs() < f64::EPSILON);

        // Pulse 19 is the last step of the ramp.
        let peak = income_rates(&config, 190).unwrap();
        assert!((peak.territory - 361.0 / 2870.0).abs() < 1e-12);

        // Pulse 20 wraps back to the start.
        let wrapped = income_rates(&config, 200).unwrap();
        assert!(wrapped.territory.abs() < f64::EPSILON);
    }

    #[test]
    fn test_troop_rate_decays_towards_floor() {
        let config = EconomyConfig::default();
        let early = income_rates(&config, 0).unwrap();
        assert!((early.troops - 0.05).abs() < 1e-12);

        let late = income_rates(&config, 1_000_000).unwrap();
        assert!((late.troops - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_config_pays_nothing() {
        let config = EconomyConfig {
            income_interval: 0,
            ..EconomyConfig::default()
        };
        assert!(income_rates(&config, 0).is_none());

        let config = EconomyConfig {
            tick_ms: 0,
            ..EconomyConfig::default()
        };
        assert!(income_rates(&config, 0).is_none());
    }

    #[test]
    fn test_apply_income_minimum_one() {
        let mut world = create_test_world();
        let config = EconomyConfig::default();

        assert!(apply_income(&mut world, &config, 0));
        assert_eq!(world.player(0).unwrap().troops(), 1);
        assert_eq!(world.player(1).unwrap().troops(), 1);

        assert!(!apply_income(&mut world, &config, 1));
        assert_eq!(world.player(0).unwrap().troops(), 1);
    }

    #[test]
    fn test_apply_income_respects_cap() {
        let mut world = create_test_world();
        world.player_mut(1).unwrap().add_troops(u32::MAX);
        assert_eq!(world.player(1).unwrap().troops(), 100);

        apply_income(&mut world, &EconomyConfig::default(), 190);
        assert_eq!(world.player(1).unwrap().troops(), 100);
    }

    #[test]
    fn test_apply_income_skips_dead_players() {
        let mut world = create_test_world();
        let lone = world.map.index_of(Coord::new(9, 9)).unwrap();
        world.transfer_tile(lone, 0);
        assert!(!world.player(1).unwrap().is_alive());

        apply_income(&mut world, &EconomyConfig::default(), 0);
        assert_eq!(world.player(1).unwrap().troops(), 0);
    }
}

//! Game layer for Conquest.
//!
//! Implements the attack lifecycle on top of a tile grid:
//! - Territory map with ownership and grid adjacency
//! - Players with troops and an incremental border tracker
//! - Attacks, their per-tile costs, and the registry that indexes them
//! - Income and attack permission rules
//! - Invariant checks over all of the above

mod attack;
mod combat;
mod economy;
mod invariants;
mod map;
mod mode;
mod observer;
mod player;
mod registry;
mod state;

pub use attack::AttackExecutor;
pub use combat::{
    BASE_TILE_COST, DEFENDER_BONUS, TileCost, UNCLAIMED_TILE_COST, defender_density, tile_cost,
};
pub use economy::{
    EconomyConfig, IncomeRates, MAX_LOOP_STEPS, apply_income, income_rates, sum_of_squares_up_to,
};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use map::{Coord, TerritoryMap};
pub use mode::{GameMode, Ruleset};
pub use observer::{EventTally, NullObserver, TerritoryObserver, TileEvent};
pub use player::{Player, PlayerId, STARTING_TROOPS, TROOPS_PER_TILE};
pub use registry::{AttackId, AttackRegistry, ScheduleOutcome};
pub use state::World;

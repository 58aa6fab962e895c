// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Conquest: a deterministic attack lifecycle engine for tile-grid territory games.
//!
//! Players hold territory on a grid, accumulate troops, and commit them to
//! attacks that take tiles over many ticks. This crate provides:
//! - Incremental border tracking per player
//! - An attack registry with O(1) pair lookup, merging, and opposition
//! - A fixed-order tick scheduler with income and permission rules
//! - JSON scenarios for reproducible sessions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Scenario / Batch Runner         │
//! ├─────────────────────────────────────┤
//! │   GameSession (tick scheduler)      │
//! ├─────────────────────────────────────┤
//! │  AttackRegistry  │  World (map,     │
//! │  AttackExecutor  │  players, border)│
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod scenario;
pub mod session;

pub use error::ScenarioError;

// Re-export key types at crate root for convenience
pub use game::{AttackRegistry, Coord, Player, PlayerId, TerritoryMap, World};
pub use scenario::Scenario;
pub use session::{AttackOrder, GameResult, GameSession, run_scenario};

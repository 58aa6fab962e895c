//! Presentation notifications raised by the border tracker.
//!
//! These are fire-and-forget: nothing in the simulation depends on them.
//! A renderer would implement [`TerritoryObserver`] to repaint tiles.

use serde::Serialize;

/// A tile reclassification event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileEvent {
    /// Tile became a border tile of its owner (gained on the frontier).
    PlayerBorder(usize),
    /// Tile became solid interior territory.
    Territory(usize),
    /// Tile became a border tile because a neighbour was lost.
    TargetBorder(usize),
    /// An interior tile was lost outright.
    InteriorLost(usize),
}

impl TileEvent {
    /// Tile index the event refers to.
    #[must_use]
    pub const fn tile(self) -> usize {
        match self {
            Self::PlayerBorder(tile)
            | Self::Territory(tile)
            | Self::TargetBorder(tile)
            | Self::InteriorLost(tile) => tile,
        }
    }
}

/// Receiver for tile reclassification events.
pub trait TerritoryObserver {
    /// Called once per reclassified tile.
    fn on_tile_event(&mut self, event: TileEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl TerritoryObserver for NullObserver {
    fn on_tile_event(&mut self, _event: TileEvent) {}
}

/// Observer that counts events by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventTally {
    /// `PlayerBorder` events.
    pub player_border: u64,
    /// `Territory` events.
    pub territory: u64,
    /// `TargetBorder` events.
    pub target_border: u64,
    /// `InteriorLost` events.
    pub interior_lost: u64,
}

impl EventTally {
    /// Total number of events seen.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.player_border + self.territory + self.target_border + self.interior_lost
    }
}

impl TerritoryObserver for EventTally {
    fn on_tile_event(&mut self, event: TileEvent) {
        match event {
            TileEvent::PlayerBorder(_) => self.player_border += 1,
            TileEvent::Territory(_) => self.territory += 1,
            TileEvent::TargetBorder(_) => self.target_border += 1,
            TileEvent::InteriorLost(_) => self.interior_lost += 1,
        }
    }
}

/// Recording observer, handy for tests and debugging tools.
impl TerritoryObserver for Vec<TileEvent> {
    fn on_tile_event(&mut self, event: TileEvent) {
        self.push(event);
    }
}

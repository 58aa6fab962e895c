//! Player state and the incremental border tracker.
//!
//! A player's border set is a cache over the territory map: a tile is in
//! `border_tiles` iff the player owns it and at least one of its four grid
//! neighbours is owned by someone else, unclaimed, or off the map. Every
//! ownership change updates the cache in constant time, so the set never has
//! to be rebuilt from the whole territory.

use indexmap::IndexSet;

use crate::game::{TerritoryMap, TerritoryObserver, TileEvent};

/// Unique identifier for a player. Dense, used as an array index.
pub type PlayerId = u16;

/// Troops every player starts with before the cap is applied.
pub const STARTING_TROOPS: u32 = 500;

/// Troop cap per owned tile.
pub const TROOPS_PER_TILE: u32 = 100;

/// State for a single player.
#[derive(Debug, Clone)]
pub struct Player {
    /// Unique identifier for this player.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Troops available for new attacks.
    troops: u32,
    /// Number of owned tiles.
    territory_size: u32,
    /// Whether the player is still alive.
    alive: bool,
    /// Owned tiles adjacent to foreign, unclaimed, or off-grid space.
    border_tiles: IndexSet<usize>,
}

impl Player {
    /// Create a new player with no territory.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            troops: STARTING_TROOPS,
            territory_size: 0,
            alive: true,
            border_tiles: IndexSet::new(),
        }
    }

    /// Troops available to the player.
    #[must_use]
    pub const fn troops(&self) -> u32 {
        self.troops
    }

    /// Number of tiles the player owns.
    #[must_use]
    pub const fn territory_size(&self) -> u32 {
        self.territory_size
    }

    /// Whether the player is still in the game.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Current border tiles, in insertion order.
    #[must_use]
    pub fn border_tiles(&self) -> &IndexSet<usize> {
        &self.border_tiles
    }

    /// Check whether a tile is tracked as a border tile.
    #[must_use]
    pub fn is_border_tile(&self, tile: usize) -> bool {
        self.border_tiles.contains(&tile)
    }

    /// Maximum troops the current territory supports.
    #[must_use]
    pub const fn troop_cap(&self) -> u32 {
        self.territory_size.saturating_mul(TROOPS_PER_TILE)
    }

    /// Add troops, capped at 100 times the territory size.
    pub fn add_troops(&mut self, amount: u32) {
        self.troops = self.troops.saturating_add(amount).min(self.troop_cap());
    }

    /// Remove troops, never going below zero.
    pub fn remove_troops(&mut self, amount: u32) {
        self.troops = self.troops.saturating_sub(amount);
    }

    /// Bring troops back under the territory cap.
    pub fn clamp_troops(&mut self) {
        self.troops = self.troops.min(self.troop_cap());
    }

    /// Process one round of income.
    ///
    /// Grants `max(1, floor(territory × territory_multiplier + floor(troops ×
    /// troop_multiplier)))`, subject to the cap.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn income(&mut self, territory_multiplier: f64, troop_multiplier: f64) {
        let from_troops = (f64::from(self.troops) * troop_multiplier).floor();
        let raw = (f64::from(self.territory_size) * territory_multiplier + from_troops).floor();
        let amount = if raw >= 1.0 { raw as u32 } else { 1 };
        self.add_troops(amount);
    }

    /// Add a tile to the player's territory.
    ///
    /// Must be called AFTER the map already records this player as owner.
    /// The caller is responsible for forwarding the gain to the attack
    /// registry.
    pub fn add_tile(
        &mut self,
        tile: usize,
        map: &TerritoryMap,
        observer: &mut dyn TerritoryObserver,
    ) {
        debug_assert!(map.is_owner(tile, self.id), "map must be updated first");

        self.territory_size += 1;
        if map.is_border(tile) {
            self.border_tiles.insert(tile);
            observer.on_tile_event(TileEvent::PlayerBorder(tile));
        } else {
            observer.on_tile_event(TileEvent::Territory(tile));
        }

        let (neighbors, count) = map.neighbors(tile);
        for &neighbor in &neighbors[..usize::from(count)] {
            if map.is_owner(neighbor, self.id)
                && !map.is_border(neighbor)
                && self.border_tiles.swap_remove(&neighbor)
            {
                observer.on_tile_event(TileEvent::Territory(neighbor));
            }
        }
    }

    /// Remove a tile from the player's territory.
    ///
    /// Must be called AFTER the map no longer records this player as owner.
    pub fn remove_tile(
        &mut self,
        tile: usize,
        map: &TerritoryMap,
        observer: &mut dyn TerritoryObserver,
    ) {
        debug_assert!(!map.is_owner(tile, self.id), "map must be updated first");
        debug_assert!(self.territory_size > 0, "player {} owns no tiles", self.id);

        self.territory_size = self.territory_size.saturating_sub(1);
        if !self.border_tiles.swap_remove(&tile) {
            observer.on_tile_event(TileEvent::InteriorLost(tile));
        }

        let (neighbors, count) = map.neighbors(tile);
        for &neighbor in &neighbors[..usize::from(count)] {
            if map.is_owner(neighbor, self.id) && self.border_tiles.insert(neighbor) {
                observer.on_tile_event(TileEvent::TargetBorder(neighbor));
            }
        }

        if self.territory_size == 0 {
            self.alive = false;
        }
        self.clamp_troops();
    }
}

/// Kani formal verification proofs.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    /// Prove that capped troop addition never exceeds the cap.
    #[kani::proof]
    fn prove_add_troops_respects_cap() {
        let troops: u32 = kani::any();
        let amount: u32 = kani::any();
        let territory: u32 = kani::any();

        let cap = territory.saturating_mul(super::TROOPS_PER_TILE);
        let result = troops.saturating_add(amount).min(cap);

        assert!(result <= cap);
    }
}

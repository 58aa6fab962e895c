//! A single in-flight attack.
//!
//! An attack owns the troops committed to it and a frontier: the target-side
//! tiles (or unclaimed tiles) that touch the attacker's territory. Each tick
//! it tries to capture the whole current frontier as one wave. Tiles gained
//! by either side are fed back in through the `handle_*_tile_add` hooks, so
//! the frontier never has to be rebuilt by scanning the territory.

use indexmap::IndexSet;
use tracing::trace;

use crate::game::{PlayerId, TerritoryMap, World, tile_cost};

/// One directed attack, player against player or player against unclaimed land.
#[derive(Debug, Clone)]
pub struct AttackExecutor {
    /// Attacking player.
    source: PlayerId,
    /// Defending player (None = unclaimed territory).
    target: Option<PlayerId>,
    /// Troops committed to this attack.
    troops: u32,
    /// Capturable tiles adjacent to the source's territory.
    frontier: IndexSet<usize>,
}

impl AttackExecutor {
    /// Create an attack expanding from `origin` tiles.
    ///
    /// When `origin` is `None` the source's current border tiles are used.
    #[must_use]
    pub fn new(
        source: PlayerId,
        target: Option<PlayerId>,
        troops: u32,
        origin: Option<&[usize]>,
        world: &World,
    ) -> Self {
        let mut attack = Self {
            source,
            target,
            troops,
            frontier: IndexSet::new(),
        };

        match origin {
            Some(tiles) => {
                for &tile in tiles {
                    attack.seed_from(tile, &world.map);
                }
            }
            None => {
                if let Some(player) = world.player(source) {
                    for &tile in player.border_tiles() {
                        attack.seed_from(tile, &world.map);
                    }
                }
            }
        }

        attack
    }

    /// Attacking player.
    #[must_use]
    pub const fn source(&self) -> PlayerId {
        self.source
    }

    /// Defending player, `None` for unclaimed territory.
    #[must_use]
    pub const fn target(&self) -> Option<PlayerId> {
        self.target
    }

    /// Troops currently committed.
    #[must_use]
    pub const fn troops(&self) -> u32 {
        self.troops
    }

    /// Tiles the next wave will try to capture.
    #[must_use]
    pub fn frontier(&self) -> &IndexSet<usize> {
        &self.frontier
    }

    /// Add troops to the attack (merge).
    pub fn modify_troops(&mut self, delta: u32) {
        self.troops = self.troops.saturating_add(delta);
    }

    /// Absorb an opposing push of `incoming` troops.
    ///
    /// Returns `true` if this attack survives with `incoming` subtracted.
    /// Returns `false`, leaving the troop count untouched, when `incoming`
    /// is enough to cancel the attack entirely; the caller takes the excess.
    pub fn oppose(&mut self, incoming: u32) -> bool {
        if incoming < self.troops {
            self.troops -= incoming;
            true
        } else {
            false
        }
    }

    /// Advance the attack by one tick.
    ///
    /// Returns `false` once the attack has run out of troops or frontier.
    pub fn tick(&mut self, world: &mut World) -> bool {
        if self.troops == 0 || self.frontier.is_empty() {
            return false;
        }

        let wave: Vec<usize> = self.frontier.drain(..).collect();
        let mut captured = 0u32;

        for tile in wave {
            if !self.is_capturable(tile, &world.map) || !self.touches_source(tile, &world.map) {
                continue;
            }

            let cost = tile_cost(self.target.and_then(|t| world.player(t)));
            if cost.attacker > self.troops {
                trace!(
                    attacker = self.source,
                    defender = ?self.target,
                    troops = self.troops,
                    needed = cost.attacker,
                    "attack exhausted"
                );
                return false;
            }

            self.troops -= cost.attacker;
            if let Some(defender) = self.target.and_then(|t| world.player_mut(t)) {
                defender.remove_troops(cost.defender);
            }
            world.transfer_tile(tile, self.source);
            captured += 1;
        }

        trace!(
            attacker = self.source,
            defender = ?self.target,
            captured,
            troops = self.troops,
            "attack wave"
        );

        self.troops > 0
    }

    /// The source gained `tile`; its capturable neighbours join the frontier.
    pub fn handle_player_tile_add(&mut self, tile: usize, map: &TerritoryMap) {
        self.seed_from(tile, map);
    }

    /// The target gained `tile`; it joins the frontier if it touches the source.
    pub fn handle_target_tile_add(&mut self, tile: usize, map: &TerritoryMap) {
        if self.is_capturable(tile, map) && self.touches_source(tile, map) {
            self.frontier.insert(tile);
        }
    }

    /// Add every capturable neighbour of an owned tile to the frontier.
    fn seed_from(&mut self, tile: usize, map: &TerritoryMap) {
        if !map.is_owner(tile, self.source) {
            return;
        }
        let (neighbors, count) = map.neighbors(tile);
        for &neighbor in &neighbors[..usize::from(count)] {
            if self.is_capturable(neighbor, map) {
                self.frontier.insert(neighbor);
            }
        }
    }

    /// Whether the tile currently belongs to this attack's target.
    fn is_capturable(&self, tile: usize, map: &TerritoryMap) -> bool {
        tile < map.tile_count() && map.owner(tile) == self.target
    }

    /// Whether any neighbour of the tile is owned by the source.
    fn touches_source(&self, tile: usize, map: &TerritoryMap) -> bool {
        let (neighbors, count) = map.neighbors(tile);
        neighbors[..usize::from(count)]
            .iter()
            .any(|&n| map.is_owner(n, self.source))
    }
}

//! Simulation world: the territory map plus every player's state.
//!
//! A `World` belongs to one session; nothing here is global. All ownership
//! changes go through [`World::transfer_tile`] so the map, both players'
//! border trackers and the pending territory notifications stay in lockstep.

use std::fmt;

use crate::game::{
    EventTally, Player, PlayerId, TerritoryMap, TerritoryObserver, TileEvent,
};

/// Complete per-session world state.
pub struct World {
    /// The territory map (ownership truth).
    pub map: TerritoryMap,
    /// All players, indexed by id.
    players: Vec<Player>,
    /// Tiles gained since the last drain, with their new owner.
    territory_adds: Vec<(usize, PlayerId)>,
    /// Running count of presentation events.
    tally: EventTally,
    /// Optional external presentation observer.
    observer: Option<Box<dyn TerritoryObserver + Send>>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("map", &self.map)
            .field("players", &self.players)
            .field("territory_adds", &self.territory_adds)
            .field("tally", &self.tally)
            .finish_non_exhaustive()
    }
}

/// Forwards events to the tally and the optional external observer.
struct Fanout<'a> {
    tally: &'a mut EventTally,
    extra: Option<&'a mut Box<dyn TerritoryObserver + Send>>,
}

impl TerritoryObserver for Fanout<'_> {
    fn on_tile_event(&mut self, event: TileEvent) {
        self.tally.on_tile_event(event);
        if let Some(extra) = self.extra.as_mut() {
            extra.on_tile_event(event);
        }
    }
}

impl World {
    /// Create a world over the given map with no players.
    #[must_use]
    pub fn new(map: TerritoryMap) -> Self {
        Self {
            map,
            players: Vec::new(),
            territory_adds: Vec::new(),
            tally: EventTally::default(),
            observer: None,
        }
    }

    /// Register a new player and return its id.
    ///
    /// Ids are handed out densely in registration order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = self.players.len() as PlayerId;
        self.players.push(Player::new(id, name));
        id
    }

    /// Install an external presentation observer.
    pub fn set_observer(&mut self, observer: Box<dyn TerritoryObserver + Send>) {
        self.observer = Some(observer);
    }

    /// All players in id order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Get a player by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(usize::from(id))
    }

    /// Get a mutable reference to a player by id.
    #[must_use]
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(usize::from(id))
    }

    /// Get all alive players.
    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    /// Get all alive players, mutably.
    pub fn alive_players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut().filter(|p| p.is_alive())
    }

    /// Presentation events counted so far.
    #[must_use]
    pub const fn tally(&self) -> EventTally {
        self.tally
    }

    /// Hand `tile` to `new_owner`.
    ///
    /// Updates the map first, then the losing and gaining players' border
    /// trackers, then queues the gain for the attack registry. Returns the
    /// previous owner.
    pub fn transfer_tile(&mut self, tile: usize, new_owner: PlayerId) -> Option<PlayerId> {
        let previous = self.map.set_owner(tile, Some(new_owner));
        if previous == Some(new_owner) {
            return previous;
        }

        let mut sink = Fanout {
            tally: &mut self.tally,
            extra: self.observer.as_mut(),
        };

        if let Some(loser) = previous.and_then(|p| self.players.get_mut(usize::from(p))) {
            loser.remove_tile(tile, &self.map, &mut sink);
        }
        if let Some(gainer) = self.players.get_mut(usize::from(new_owner)) {
            gainer.add_tile(tile, &self.map, &mut sink);
        }

        self.territory_adds.push((tile, new_owner));
        previous
    }

    /// Take the territory gains queued since the last call.
    pub fn take_territory_adds(&mut self) -> Vec<(usize, PlayerId)> {
        std::mem::take(&mut self.territory_adds)
    }

    /// Check whether `player` has a border tile touching `target`'s
    /// territory (or unclaimed land when `target` is `None`).
    #[must_use]
    pub fn shares_border(&self, player: PlayerId, target: Option<PlayerId>) -> bool {
        let Some(player) = self.player(player) else {
            return false;
        };

        player.border_tiles().iter().any(|&tile| {
            let (neighbors, count) = self.map.neighbors(tile);
            neighbors[..usize::from(count)]
                .iter()
                .any(|&n| self.map.owner(n) == target)
        })
    }
}

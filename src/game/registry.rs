//! Attack registry: owns every live attack and the indices over them.
//!
//! Four index structures are kept in lockstep with the attack storage:
//!
//! - a flat `max_players²` matrix mapping `(source, target)` to an attack,
//! - per-player outgoing lists (attacks the player is fighting as source),
//! - per-player incoming lists (attacks targeting the player),
//! - a per-player unclaimed slot plus a flat list of unclaimed attacks.
//!
//! Lookups, merges and opposition checks are O(1) through the matrix and the
//! unclaimed slot. Removal touches exactly the entries the attack occupies.
//!
//! # Tick safety
//!
//! [`AttackRegistry::tick`] walks a snapshot of the live list, so removing
//! a finished attack never skips or revisits another one. Slots freed during
//! a pass are only reused by scheduling, which never runs inside a pass.

use tracing::debug;

use crate::game::{AttackExecutor, PlayerId, TerritoryMap, World};

/// Handle to an attack stored in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttackId(usize);

impl AttackId {
    /// Raw slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a scheduling call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A new attack was created.
    Created(AttackId),
    /// Troops were merged into an existing attack on the same pair.
    Merged(AttackId),
    /// The opposing attack absorbed all incoming troops and survives.
    Absorbed(AttackId),
    /// The opposing attack and the incoming troops cancelled exactly.
    Cancelled,
}

/// Owner of all live attacks.
#[derive(Debug, Clone)]
pub struct AttackRegistry {
    /// Number of player slots in every index.
    max_players: usize,
    /// Attack storage; `None` marks a free slot.
    slots: Vec<Option<AttackExecutor>>,
    /// Free slot indices available for reuse.
    free_slots: Vec<usize>,
    /// Live attacks in resolution order.
    live: Vec<AttackId>,
    /// `(source, target)` matrix, row-major by source.
    pair_index: Vec<Option<AttackId>>,
    /// Unclaimed attack per source.
    unclaimed_index: Vec<Option<AttackId>>,
    /// Attacks each player is fighting as source.
    outgoing: Vec<Vec<AttackId>>,
    /// Attacks targeting each player.
    incoming: Vec<Vec<AttackId>>,
    /// All attacks on unclaimed territory.
    unclaimed: Vec<AttackId>,
}

impl AttackRegistry {
    /// Create an empty registry sized for `max_players`.
    #[must_use]
    pub fn new(max_players: usize) -> Self {
        Self {
            max_players,
            slots: Vec::new(),
            free_slots: Vec::new(),
            live: Vec::new(),
            pair_index: vec![None; max_players * max_players],
            unclaimed_index: vec![None; max_players],
            outgoing: vec![Vec::new(); max_players],
            incoming: vec![Vec::new(); max_players],
            unclaimed: Vec::new(),
        }
    }

    /// Number of player slots.
    #[must_use]
    pub const fn max_players(&self) -> usize {
        self.max_players
    }

    /// Number of live attacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no attacks are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live attack ids in resolution order.
    #[must_use]
    pub fn live(&self) -> &[AttackId] {
        &self.live
    }

    /// Iterate over live attacks in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (AttackId, &AttackExecutor)> {
        self.live
            .iter()
            .filter_map(|&id| self.get(id).map(|attack| (id, attack)))
    }

    /// Look up an attack by id.
    #[must_use]
    pub fn get(&self, id: AttackId) -> Option<&AttackExecutor> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Number of occupied storage slots.
    #[must_use]
    pub fn occupied_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Id of the attack from `source` on `target`, if any.
    #[must_use]
    pub fn attack_id_between(&self, source: PlayerId, target: PlayerId) -> Option<AttackId> {
        self.pair_index
            .get(self.pair_slot(source, target))
            .copied()
            .flatten()
    }

    /// The attack from `source` on `target`, if any.
    #[must_use]
    pub fn attack_between(&self, source: PlayerId, target: PlayerId) -> Option<&AttackExecutor> {
        self.attack_id_between(source, target)
            .and_then(|id| self.get(id))
    }

    /// Id of `source`'s attack on unclaimed territory, if any.
    #[must_use]
    pub fn unclaimed_id(&self, source: PlayerId) -> Option<AttackId> {
        self.unclaimed_index
            .get(usize::from(source))
            .copied()
            .flatten()
    }

    /// `source`'s attack on unclaimed territory, if any.
    #[must_use]
    pub fn unclaimed_attack(&self, source: PlayerId) -> Option<&AttackExecutor> {
        self.unclaimed_id(source).and_then(|id| self.get(id))
    }

    /// Attacks `player` is fighting as source.
    #[must_use]
    pub fn outgoing(&self, player: PlayerId) -> &[AttackId] {
        self.outgoing
            .get(usize::from(player))
            .map_or(&[], Vec::as_slice)
    }

    /// Attacks targeting `player`.
    #[must_use]
    pub fn incoming(&self, player: PlayerId) -> &[AttackId] {
        self.incoming
            .get(usize::from(player))
            .map_or(&[], Vec::as_slice)
    }

    /// All attacks on unclaimed territory.
    #[must_use]
    pub fn unclaimed_attacks(&self) -> &[AttackId] {
        &self.unclaimed
    }

    /// Troops committed across every live attack by `player`.
    #[must_use]
    pub fn committed_troops(&self, player: PlayerId) -> u64 {
        self.outgoing(player)
            .iter()
            .filter_map(|&id| self.get(id))
            .map(|attack| u64::from(attack.troops()))
            .sum()
    }

    /// Schedule an attack on unclaimed territory.
    ///
    /// Merges into the source's existing unclaimed attack when there is one.
    /// `origin` overrides the tiles the attack expands from; `None` uses the
    /// source's current border.
    pub fn schedule_unclaimed_attack(
        &mut self,
        world: &World,
        source: PlayerId,
        troops: u32,
        origin: Option<&[usize]>,
    ) -> ScheduleOutcome {
        if let Some(id) = self.unclaimed_id(source) {
            self.attack_mut(id).modify_troops(troops);
            debug!(source, troops, "merged unclaimed attack");
            return ScheduleOutcome::Merged(id);
        }

        let attack = AttackExecutor::new(source, None, troops, origin, world);
        let id = self.insert(attack);
        self.unclaimed_index[usize::from(source)] = Some(id);
        self.outgoing[usize::from(source)].push(id);
        self.unclaimed.push(id);
        debug!(source, troops, "created unclaimed attack");
        ScheduleOutcome::Created(id)
    }

    /// Schedule an attack from `source` on `target`.
    ///
    /// 1. An existing `source → target` attack absorbs the troops (merge).
    /// 2. An opposing `target → source` attack is fought first: if it
    ///    survives, nothing new is created; otherwise it is removed and its
    ///    troops are subtracted from the incoming ones.
    /// 3. Whatever remains becomes a new `source → target` attack.
    pub fn schedule_attack(
        &mut self,
        world: &World,
        source: PlayerId,
        target: PlayerId,
        troops: u32,
        origin: Option<&[usize]>,
    ) -> ScheduleOutcome {
        debug_assert_ne!(source, target, "players cannot attack themselves");

        if let Some(id) = self.attack_id_between(source, target) {
            self.attack_mut(id).modify_troops(troops);
            debug!(source, defender = target, troops, "merged attack");
            return ScheduleOutcome::Merged(id);
        }

        let mut troops = troops;
        if let Some(opposing) = self.attack_id_between(target, source) {
            if self.attack_mut(opposing).oppose(troops) {
                debug!(source, defender = target, troops, "opposing attack absorbed push");
                return ScheduleOutcome::Absorbed(opposing);
            }
            let cancelled = self.remove_attack(opposing);
            troops -= cancelled.troops();
            debug!(
                source,
                defender = target,
                cancelled = cancelled.troops(),
                remaining = troops,
                "opposing attack cancelled"
            );
            if troops == 0 {
                return ScheduleOutcome::Cancelled;
            }
        }

        let attack = AttackExecutor::new(source, Some(target), troops, origin, world);
        let id = self.insert(attack);
        let slot = self.pair_slot(source, target);
        self.pair_index[slot] = Some(id);
        self.outgoing[usize::from(source)].push(id);
        self.incoming[usize::from(target)].push(id);
        debug!(source, defender = target, troops, "created attack");
        ScheduleOutcome::Created(id)
    }

    /// Advance every live attack by one tick.
    ///
    /// Finished attacks refund their unspent troops to the source and are
    /// dropped from every index. Territory gained during a step is forwarded
    /// to the affected attacks before the next attack steps.
    pub fn tick(&mut self, world: &mut World) {
        let pass = self.live.clone();

        for id in pass {
            let Some(attack) = self.slots.get_mut(id.0).and_then(Option::as_mut) else {
                continue;
            };

            if !attack.tick(world) {
                let finished = self.remove_attack(id);
                if let Some(player) = world.player_mut(finished.source()) {
                    player.add_troops(finished.troops());
                }
                debug!(
                    source = finished.source(),
                    defender = ?finished.target(),
                    refunded = finished.troops(),
                    "attack finished"
                );
            }

            self.dispatch_territory_adds(world);
        }
    }

    /// Forward queued territory gains from the world to the attacks.
    pub fn dispatch_territory_adds(&mut self, world: &mut World) {
        for (tile, player) in world.take_territory_adds() {
            self.handle_territory_add(tile, player, &world.map);
        }
    }

    /// Tell every attack involving `player` that it gained `tile`.
    pub fn handle_territory_add(&mut self, tile: usize, player: PlayerId, map: &TerritoryMap) {
        let index = usize::from(player);

        if let Some(ids) = self.outgoing.get(index) {
            for &id in ids {
                if let Some(attack) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
                    attack.handle_player_tile_add(tile, map);
                }
            }
        }

        if let Some(ids) = self.incoming.get(index) {
            for &id in ids {
                if let Some(attack) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
                    attack.handle_target_tile_add(tile, map);
                }
            }
        }
    }

    /// Matrix cell for a `(source, target)` pair.
    fn pair_slot(&self, source: PlayerId, target: PlayerId) -> usize {
        usize::from(source) * self.max_players + usize::from(target)
    }

    /// Mutable access to a tracked attack.
    fn attack_mut(&mut self, id: AttackId) -> &mut AttackExecutor {
        let Some(attack) = self.slots.get_mut(id.0).and_then(Option::as_mut) else {
            unreachable!("attack {id:?} is indexed but not stored");
        };
        attack
    }

    /// Store an attack and append it to the live list.
    fn insert(&mut self, attack: AttackExecutor) -> AttackId {
        debug_assert!(usize::from(attack.source()) < self.max_players);
        debug_assert!(
            attack
                .target()
                .is_none_or(|t| usize::from(t) < self.max_players)
        );

        let id = if let Some(slot) = self.free_slots.pop() {
            self.slots[slot] = Some(attack);
            AttackId(slot)
        } else {
            self.slots.push(Some(attack));
            AttackId(self.slots.len() - 1)
        };
        self.live.push(id);
        id
    }

    /// Remove an attack from storage and from every index it occupies.
    fn remove_attack(&mut self, id: AttackId) -> AttackExecutor {
        let Some(attack) = self.slots.get_mut(id.0).and_then(Option::take) else {
            unreachable!("attack {id:?} is not tracked");
        };
        let source = usize::from(attack.source());

        remove_entry(&mut self.live, id);
        remove_entry(&mut self.outgoing[source], id);
        match attack.target() {
            Some(target) => {
                let slot = self.pair_slot(attack.source(), target);
                self.pair_index[slot] = None;
                remove_entry(&mut self.incoming[usize::from(target)], id);
            }
            None => {
                self.unclaimed_index[source] = None;
                remove_entry(&mut self.unclaimed, id);
            }
        }

        self.free_slots.push(id.0);
        attack
    }
}

/// Remove `id` from an index list, preserving the order of the rest.
fn remove_entry(list: &mut Vec<AttackId>, id: AttackId) {
    let Some(position) = list.iter().position(|&entry| entry == id) else {
        unreachable!("attack {id:?} missing from index");
    };
    list.remove(position);
}

//! Game session: the tick scheduler and everything it drives.
//!
//! A session owns the [`World`], the [`AttackRegistry`], the permission
//! rules, and the income settings. Each call to [`GameSession::tick`] runs
//! the systems in [`TICK_ORDER`]:
//!
//! 1. **Actions** - queued attack orders are checked, paid for, and scheduled
//! 2. **Income** - periodic troop growth
//! 3. **Attacks** - every live attack advances one step
//!
//! Sessions share nothing, so many can run in parallel on separate threads.

mod spawn;

pub use spawn::{claim_spawn, spawn_diamond};

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::ScenarioError;
use crate::game::{
    AttackRegistry, Coord, EconomyConfig, EventTally, GameMode, PlayerId, ScheduleOutcome,
    TerritoryMap, TerritoryObserver, World, apply_income, assert_invariants,
};
use crate::scenario::Scenario;

/// One system in the per-tick schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKind {
    /// Queued attack orders.
    Actions,
    /// Periodic income.
    Income,
    /// Attack resolution.
    Attacks,
}

/// Systems in the order they run each tick.
pub const TICK_ORDER: [SystemKind; 3] = [SystemKind::Actions, SystemKind::Income, SystemKind::Attacks];

/// A request to commit a share of a player's troops to an attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOrder {
    /// Attacking player.
    pub player: PlayerId,
    /// Target player, `None` for unclaimed land.
    pub target: Option<PlayerId>,
    /// Fraction of current troops to commit. Clamped to `[0, 1]`.
    pub percentage: f64,
}

impl AttackOrder {
    /// Order against unclaimed land.
    #[must_use]
    pub const fn unclaimed(player: PlayerId, percentage: f64) -> Self {
        Self {
            player,
            target: None,
            percentage,
        }
    }

    /// Order against another player.
    #[must_use]
    pub const fn against(player: PlayerId, target: PlayerId, percentage: f64) -> Self {
        Self {
            player,
            target: Some(target),
            percentage,
        }
    }
}

/// End-of-session statistics for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Tiles owned at the end.
    pub territory: u32,
    /// Troops held at the end (excluding troops still in attacks).
    pub troops: u32,
    /// Whether the player survived.
    pub alive: bool,
    /// Tick the player was eliminated (None if survived).
    pub eliminated_tick: Option<u64>,
}

/// Final result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// Ticks played.
    pub ticks_played: u64,
    /// Surviving player with the most territory (lowest id breaks ties).
    pub winner: Option<PlayerId>,
    /// Per-player statistics in id order.
    pub players: Vec<PlayerSummary>,
    /// Elimination order (first eliminated is index 0).
    pub elimination_order: Vec<PlayerId>,
    /// Border tracker events raised during the session.
    pub events: EventTally,
    /// Attacks still in flight when the session ended.
    pub live_attacks: usize,
}

/// One running game.
pub struct GameSession {
    /// Map and players.
    world: World,
    /// All live attacks.
    attacks: AttackRegistry,
    /// Attack permission rules.
    mode: Box<dyn GameMode + Send>,
    /// Income settings.
    economy: EconomyConfig,
    /// Current tick (number of completed ticks).
    tick: u64,
    /// Tick limit.
    max_ticks: u64,
    /// Orders submitted for the next tick.
    pending: Vec<AttackOrder>,
    /// Orders scheduled for specific ticks.
    timeline: BTreeMap<u64, Vec<AttackOrder>>,
    /// Elimination tick per player.
    eliminated_at: Vec<Option<u64>>,
    /// Elimination order tracking.
    elimination_order: Vec<PlayerId>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("world", &self.world)
            .field("attacks", &self.attacks)
            .field("economy", &self.economy)
            .field("tick", &self.tick)
            .field("max_ticks", &self.max_ticks)
            .field("pending", &self.pending)
            .field("timeline", &self.timeline)
            .field("elimination_order", &self.elimination_order)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Create an empty session over `map`.
    ///
    /// `max_players` sizes the attack indices and cannot change afterwards.
    #[must_use]
    pub fn new(
        map: TerritoryMap,
        max_players: usize,
        mode: Box<dyn GameMode + Send>,
        economy: EconomyConfig,
        max_ticks: u64,
    ) -> Self {
        Self {
            world: World::new(map),
            attacks: AttackRegistry::new(max_players),
            mode,
            economy,
            tick: 0,
            max_ticks,
            pending: Vec::new(),
            timeline: BTreeMap::new(),
            eliminated_at: Vec::new(),
            elimination_order: Vec::new(),
        }
    }

    /// Build a session from a scenario, including its timed orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario fails validation.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let Some(map) = TerritoryMap::new(scenario.map.width, scenario.map.height) else {
            return Err(ScenarioError::InvalidMap {
                width: scenario.map.width,
                height: scenario.map.height,
            });
        };

        let mut session = Self::new(
            map,
            scenario.effective_max_players(),
            Box::new(scenario.ruleset()),
            scenario.economy,
            scenario.max_ticks,
        );

        for player in &scenario.players {
            if session
                .add_player(player.name.clone(), player.spawn, player.radius)
                .is_none()
            {
                return Err(ScenarioError::TooManyPlayers {
                    count: scenario.players.len(),
                    max: scenario.effective_max_players(),
                });
            }
        }

        for action in &scenario.actions {
            session.schedule_order_at(
                action.tick,
                AttackOrder {
                    player: action.player,
                    target: action.target,
                    percentage: action.percentage,
                },
            );
        }

        Ok(session)
    }

    /// Register a player and claim their spawn diamond.
    ///
    /// Returns `None` once every player slot is taken, or when the spawn
    /// tile is off the map or already owned.
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        spawn: Coord,
        radius: u16,
    ) -> Option<PlayerId> {
        if self.world.players().len() >= self.attacks.max_players() {
            return None;
        }
        let centre = self.world.map.index_of(spawn)?;
        if !self.world.map.is_unclaimed(centre) {
            return None;
        }

        let id = self.world.add_player(name);
        let claimed = claim_spawn(&mut self.world, id, spawn, radius);
        self.attacks.dispatch_territory_adds(&mut self.world);
        self.eliminated_at.push(None);

        debug!(player = id, claimed, "player spawned");
        Some(id)
    }

    /// Install an external presentation observer.
    pub fn set_observer(&mut self, observer: Box<dyn TerritoryObserver + Send>) {
        self.world.set_observer(observer);
    }

    /// Map and players.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Live attacks.
    #[must_use]
    pub fn attacks(&self) -> &AttackRegistry {
        &self.attacks
    }

    /// Completed ticks.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Tick limit.
    #[must_use]
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Override the tick limit.
    pub fn set_max_ticks(&mut self, max_ticks: u64) {
        self.max_ticks = max_ticks;
    }

    /// Check, pay for, and schedule an attack order immediately.
    ///
    /// Commits `floor(troops × percentage)` troops, deducting them from the
    /// player before scheduling. Orders the rules deny, orders naming a
    /// player that does not exist or targeting the attacker itself, and
    /// orders that would commit nothing are dropped and return `None`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn preprocess_attack(&mut self, order: AttackOrder) -> Option<ScheduleOutcome> {
        let AttackOrder {
            player,
            target,
            percentage,
        } = order;

        if !self.mode.can_attack(&self.world, player, target) {
            debug!(player, defender = ?target, "attack denied");
            return None;
        }

        if target.is_some_and(|t| t == player || self.world.player(t).is_none()) {
            debug!(player, defender = ?target, "attack on invalid target");
            return None;
        }

        let source = self.world.player_mut(player)?;
        let fraction = if percentage.is_nan() {
            0.0
        } else {
            percentage.clamp(0.0, 1.0)
        };
        let troops = (f64::from(source.troops()) * fraction).floor() as u32;
        if troops == 0 {
            debug!(player, defender = ?target, "attack commits no troops");
            return None;
        }
        source.remove_troops(troops);

        let outcome = match target {
            Some(target) => self
                .attacks
                .schedule_attack(&self.world, player, target, troops, None),
            None => self
                .attacks
                .schedule_unclaimed_attack(&self.world, player, troops, None),
        };
        debug!(player, defender = ?target, troops, ?outcome, "attack scheduled");
        Some(outcome)
    }

    /// Queue an order for the next tick's action phase.
    pub fn submit(&mut self, order: AttackOrder) {
        self.pending.push(order);
    }

    /// Queue an order for the action phase of a specific tick.
    ///
    /// Orders for ticks already played run on the next tick.
    pub fn schedule_order_at(&mut self, tick: u64, order: AttackOrder) {
        self.timeline.entry(tick).or_default().push(order);
    }

    /// Run one simulation tick.
    pub fn tick(&mut self) {
        for system in TICK_ORDER {
            match system {
                SystemKind::Actions => self.run_actions(),
                SystemKind::Income => {
                    apply_income(&mut self.world, &self.economy, self.tick);
                }
                SystemKind::Attacks => self.attacks.tick(&mut self.world),
            }
        }

        self.record_eliminations();
        assert_invariants(&self.world, &self.attacks);

        trace!(
            tick = self.tick,
            attacks = self.attacks.len(),
            alive = self.world.alive_players().count(),
            "tick complete"
        );
        self.tick += 1;
    }

    /// Whether the session has ended.
    ///
    /// Ends at the tick limit or when at most one player remains.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.tick >= self.max_ticks || self.world.alive_players().count() <= 1
    }

    /// Run ticks until the session ends and return the result.
    pub fn run(&mut self) -> GameResult {
        while !self.is_game_over() {
            self.tick();
        }
        let result = self.result();
        info!(
            ticks = result.ticks_played,
            winner = ?result.winner,
            "game over"
        );
        result
    }

    /// Snapshot the current standings.
    #[must_use]
    pub fn result(&self) -> GameResult {
        let players = self
            .world
            .players()
            .iter()
            .map(|p| PlayerSummary {
                id: p.id,
                name: p.name.clone(),
                territory: p.territory_size(),
                troops: p.troops(),
                alive: p.is_alive(),
                eliminated_tick: self
                    .eliminated_at
                    .get(usize::from(p.id))
                    .copied()
                    .flatten(),
            })
            .collect();

        // Largest territory wins; min_by_key keeps the first (lowest id) on ties.
        let winner = self
            .world
            .alive_players()
            .min_by_key(|p| std::cmp::Reverse(p.territory_size()))
            .map(|p| p.id);

        GameResult {
            ticks_played: self.tick,
            winner,
            players,
            elimination_order: self.elimination_order.clone(),
            events: self.world.tally(),
            live_attacks: self.attacks.len(),
        }
    }

    /// Drain this tick's timed orders and the submitted queue.
    fn run_actions(&mut self) {
        let mut orders = Vec::new();
        while let Some(entry) = self.timeline.first_entry() {
            if *entry.key() > self.tick {
                break;
            }
            orders.extend(entry.remove());
        }
        orders.append(&mut self.pending);

        for order in orders {
            self.preprocess_attack(order);
        }
    }

    /// Note players who died this tick.
    fn record_eliminations(&mut self) {
        for player in self.world.players() {
            let slot = &mut self.eliminated_at[usize::from(player.id)];
            if !player.is_alive() && slot.is_none() {
                *slot = Some(self.tick);
                self.elimination_order.push(player.id);
                info!(player = player.id, name = %player.name, tick = self.tick, "player eliminated");
            }
        }
    }
}

/// Run a scenario to completion.
///
/// `max_ticks` overrides the scenario's tick limit when given.
///
/// # Errors
///
/// Returns an error if the scenario fails validation.
pub fn run_scenario(
    scenario: &Scenario,
    max_ticks: Option<u64>,
) -> Result<GameResult, ScenarioError> {
    let mut session = GameSession::from_scenario(scenario)?;
    if let Some(limit) = max_ticks {
        session.set_max_ticks(limit);
    }
    Ok(session.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Ruleset;

    /// Three players on a 30x10 map, spaced well apart.
    fn create_test_session() -> GameSession {
        let map = TerritoryMap::new(30, 10).unwrap();
        let mut session = GameSession::new(
            map,
            3,
            Box::new(Ruleset::free_for_all()),
            EconomyConfig::default(),
            100,
        );
        session.add_player("a", Coord::new(3, 5), 2);
        session.add_player("b", Coord::new(15, 5), 2);
        session.add_player("c", Coord::new(26, 5), 2);
        session
    }

    #[test]
    fn test_add_player_respects_slots() {
        let mut session = create_test_session();
        assert!(session.add_player("d", Coord::new(10, 1), 0).is_none());
        assert_eq!(session.world().players().len(), 3);
    }

    #[test]
    fn test_add_player_rejects_taken_spawn() {
        let map = TerritoryMap::new(10, 10).unwrap();
        let mut session = GameSession::new(
            map,
            4,
            Box::new(Ruleset::free_for_all()),
            EconomyConfig::default(),
            10,
        );
        session.add_player("a", Coord::new(5, 5), 2);
        assert!(session.add_player("b", Coord::new(5, 6), 1).is_none());
        assert!(session.add_player("c", Coord::new(50, 6), 1).is_none());
        assert_eq!(session.world().players().len(), 1);
    }

    #[test]
    fn test_preprocess_deducts_floor_share() {
        let mut session = create_test_session();
        let before = session.world().player(1).unwrap().troops();
        assert_eq!(before, 500);

        let outcome = session.preprocess_attack(AttackOrder::unclaimed(1, 0.333));
        assert!(matches!(outcome, Some(ScheduleOutcome::Created(_))));
        assert_eq!(session.world().player(1).unwrap().troops(), 500 - 166);
        assert_eq!(session.attacks().unclaimed_attack(1).unwrap().troops(), 166);
    }

    #[test]
    fn test_preprocess_denied_is_noop() {
        let mut session = create_test_session();
        assert!(session.preprocess_attack(AttackOrder::against(0, 0, 0.5)).is_none());
        assert!(session.preprocess_attack(AttackOrder::against(0, 9, 0.5)).is_none());
        assert_eq!(session.world().player(0).unwrap().troops(), 500);
        assert!(session.attacks().is_empty());
    }

    #[test]
    fn test_preprocess_rejects_unknown_target_under_permissive_mode() {
        let map = TerritoryMap::new(30, 10).unwrap();
        let anything = |_: &World, _: PlayerId, _: Option<PlayerId>| true;
        let mut session =
            GameSession::new(map, 2, Box::new(anything), EconomyConfig::default(), 10);
        session.add_player("a", Coord::new(3, 5), 2);
        session.add_player("b", Coord::new(26, 5), 2);

        assert!(session.preprocess_attack(AttackOrder::against(0, 5, 0.5)).is_none());
        assert!(session.preprocess_attack(AttackOrder::against(0, 0, 0.5)).is_none());
        assert!(session.preprocess_attack(AttackOrder::against(7, 1, 0.5)).is_none());
        assert_eq!(session.world().player(0).unwrap().troops(), 500);
        assert!(session.attacks().is_empty());

        assert!(session.preprocess_attack(AttackOrder::against(0, 1, 0.5)).is_some());
    }

    #[test]
    fn test_preprocess_zero_share_is_noop() {
        let mut session = create_test_session();
        assert!(session.preprocess_attack(AttackOrder::unclaimed(0, 0.0)).is_none());
        assert!(session.preprocess_attack(AttackOrder::unclaimed(0, f64::NAN)).is_none());
        assert_eq!(session.world().player(0).unwrap().troops(), 500);
    }

    #[test]
    fn test_submitted_orders_run_next_tick() {
        let mut session = create_test_session();
        session.submit(AttackOrder::unclaimed(0, 0.5));
        assert!(session.attacks().is_empty());

        session.tick();
        assert_eq!(session.tick_count(), 1);
        assert!(session.world().player(0).unwrap().territory_size() > 13);
    }

    #[test]
    fn test_timeline_orders_fire_on_their_tick() {
        let mut session = create_test_session();
        session.schedule_order_at(2, AttackOrder::unclaimed(2, 0.5));

        session.tick();
        session.tick();
        assert!(session.attacks().unclaimed_attack(2).is_none());
        assert_eq!(session.world().player(2).unwrap().territory_size(), 13);

        session.tick();
        assert!(session.world().player(2).unwrap().territory_size() > 13);
    }

    #[test]
    fn test_game_over_at_tick_limit() {
        let mut session = create_test_session();
        session.set_max_ticks(5);
        let result = session.run();
        assert_eq!(result.ticks_played, 5);
        assert_eq!(result.players.len(), 3);
        assert!(result.elimination_order.is_empty());
        // Equal territory: lowest id wins.
        assert_eq!(result.winner, Some(0));
    }

    #[test]
    fn test_elimination_recorded() {
        let map = TerritoryMap::new(6, 1).unwrap();
        let mut session = GameSession::new(
            map,
            2,
            Box::new(Ruleset::free_for_all()),
            EconomyConfig::default(),
            50,
        );
        session.add_player("big", Coord::new(1, 0), 1);
        session.add_player("small", Coord::new(3, 0), 0);
        session.submit(AttackOrder::against(0, 1, 1.0));

        let result = session.run();
        assert_eq!(result.elimination_order, vec![1]);
        assert_eq!(result.winner, Some(0));
        assert!(!result.players[1].alive);
        assert_eq!(result.players[1].eliminated_tick, Some(0));
    }
}

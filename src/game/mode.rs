//! Attack permission rules.
//!
//! The session asks a [`GameMode`] before every attack it schedules. Denied
//! requests are dropped without touching any state.

use crate::game::{PlayerId, World};

/// Decides whether an attack request is legal.
pub trait GameMode {
    /// Whether `source` may attack `target` (`None` = unclaimed land).
    fn can_attack(&self, world: &World, source: PlayerId, target: Option<PlayerId>) -> bool;
}

impl<F> GameMode for F
where
    F: Fn(&World, PlayerId, Option<PlayerId>) -> bool,
{
    fn can_attack(&self, world: &World, source: PlayerId, target: Option<PlayerId>) -> bool {
        self(world, source, target)
    }
}

/// Standard rules: free-for-all or fixed teams, optionally requiring a
/// shared border with the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset {
    /// Team of each player by id. `None` means free-for-all.
    teams: Option<Vec<u8>>,
    /// Whether the attacker must already touch the target's land.
    require_shared_border: bool,
}

impl Ruleset {
    /// Every player against every other player.
    #[must_use]
    pub const fn free_for_all() -> Self {
        Self {
            teams: None,
            require_shared_border: false,
        }
    }

    /// Fixed teams; `teams[id]` is the team of player `id`.
    #[must_use]
    pub const fn teams(teams: Vec<u8>) -> Self {
        Self {
            teams: Some(teams),
            require_shared_border: false,
        }
    }

    /// Require attackers to share a border with their target.
    #[must_use]
    pub fn with_shared_border(mut self, required: bool) -> Self {
        self.require_shared_border = required;
        self
    }

    /// Whether two players are on the same team.
    #[must_use]
    pub fn are_teammates(&self, a: PlayerId, b: PlayerId) -> bool {
        let Some(teams) = &self.teams else {
            return false;
        };
        match (teams.get(usize::from(a)), teams.get(usize::from(b))) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

impl GameMode for Ruleset {
    fn can_attack(&self, world: &World, source: PlayerId, target: Option<PlayerId>) -> bool {
        if !world.player(source).is_some_and(|p| p.is_alive()) {
            return false;
        }

        if let Some(target) = target {
            if target == source || self.are_teammates(source, target) {
                return false;
            }
            if !world.player(target).is_some_and(|p| p.is_alive()) {
                return false;
            }
        }

        !self.require_shared_border || world.shares_border(source, target)
    }
}

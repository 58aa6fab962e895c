//! Engine invariants - consistency checks that detect bugs.
//!
//! Every check here compares a cached or indexed view against the territory
//! map or against another index. None of them should ever trigger; a
//! violation means an ownership change or attack removal skipped a step.

use std::collections::HashSet;

use crate::game::{AttackRegistry, TROOPS_PER_TILE, World};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all engine invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &World, attacks: &AttackRegistry) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    check_players(world, &mut violations);
    check_indices(attacks, &mut violations);
    violations
}

/// Territory counts, border sets, troop bounds, and death terminality.
fn check_players(world: &World, violations: &mut Vec<InvariantViolation>) {
    for player in world.players() {
        let owned = world.map.count_owned_by(player.id);
        if owned != player.territory_size() {
            violations.push(InvariantViolation {
                message: format!(
                    "Player {} territory {} but map shows {}",
                    player.id,
                    player.territory_size(),
                    owned
                ),
            });
        }

        let expected: HashSet<usize> = world
            .map
            .tiles_owned_by(player.id)
            .filter(|&tile| world.map.is_border(tile))
            .collect();
        let tracked: HashSet<usize> = player.border_tiles().iter().copied().collect();
        if expected != tracked {
            let missing = expected.difference(&tracked).count();
            let stale = tracked.difference(&expected).count();
            violations.push(InvariantViolation {
                message: format!(
                    "Player {} border set drifted: {missing} missing, {stale} stale",
                    player.id
                ),
            });
        }

        let cap = player.territory_size().saturating_mul(TROOPS_PER_TILE);
        if player.troops() > cap {
            violations.push(InvariantViolation {
                message: format!(
                    "Player {} has {} troops > cap {}",
                    player.id,
                    player.troops(),
                    cap
                ),
            });
        }

        if !player.is_alive() && owned > 0 {
            violations.push(InvariantViolation {
                message: format!("Dead player {} still owns {} tiles", player.id, owned),
            });
        }
        if player.is_alive() && player.territory_size() == 0 {
            violations.push(InvariantViolation {
                message: format!("Player {} owns no tiles but is alive", player.id),
            });
        }
    }
}

/// Every live attack appears exactly where its source and target say.
#[allow(clippy::cast_possible_truncation)]
fn check_indices(attacks: &AttackRegistry, violations: &mut Vec<InvariantViolation>) {
    let mut unclaimed_seen = 0usize;

    for (id, attack) in attacks.iter() {
        let source = attack.source();
        if !attacks.outgoing(source).contains(&id) {
            violations.push(InvariantViolation {
                message: format!("Attack {id:?} missing from outgoing list of {source}"),
            });
        }

        match attack.target() {
            Some(target) => {
                if attacks.attack_id_between(source, target) != Some(id) {
                    violations.push(InvariantViolation {
                        message: format!("Attack {id:?} not in matrix cell ({source}, {target})"),
                    });
                }
                if !attacks.incoming(target).contains(&id) {
                    violations.push(InvariantViolation {
                        message: format!("Attack {id:?} missing from incoming list of {target}"),
                    });
                }
                if attacks.attack_id_between(target, source).is_some() {
                    violations.push(InvariantViolation {
                        message: format!("Opposing attacks coexist between {source} and {target}"),
                    });
                }
            }
            None => {
                unclaimed_seen += 1;
                if attacks.unclaimed_id(source) != Some(id) {
                    violations.push(InvariantViolation {
                        message: format!("Attack {id:?} not in unclaimed slot of {source}"),
                    });
                }
                if !attacks.unclaimed_attacks().contains(&id) {
                    violations.push(InvariantViolation {
                        message: format!("Attack {id:?} missing from unclaimed list"),
                    });
                }
            }
        }
    }

    if unclaimed_seen != attacks.unclaimed_attacks().len() {
        violations.push(InvariantViolation {
            message: format!(
                "Unclaimed list holds {} entries for {} unclaimed attacks",
                attacks.unclaimed_attacks().len(),
                unclaimed_seen
            ),
        });
    }

    let listed: usize = (0..attacks.max_players())
        .map(|p| attacks.outgoing(p as u16).len())
        .sum();
    if listed != attacks.len() || attacks.occupied_slots() != attacks.len() {
        violations.push(InvariantViolation {
            message: format!(
                "{} live attacks, {} outgoing entries, {} stored",
                attacks.len(),
                listed,
                attacks.occupied_slots()
            ),
        });
    }
}

/// Assert all engine invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(world: &World, attacks: &AttackRegistry) {
    let violations = check_invariants(world, attacks);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Engine invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_world: &World, _attacks: &AttackRegistry) {}

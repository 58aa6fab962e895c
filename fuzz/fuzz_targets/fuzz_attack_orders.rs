#![no_main]

use arbitrary::Arbitrary;
use conquest::game::{check_invariants, EconomyConfig, Ruleset};
use conquest::{AttackOrder, Coord, GameSession, TerritoryMap};
use libfuzzer_sys::fuzz_target;

/// One fuzzed step.
#[derive(Arbitrary, Debug)]
enum Step {
    /// Issue an attack order right away.
    Order {
        player: u8,
        target: Option<u8>,
        percentage: f64,
    },
    /// Advance a few ticks.
    Tick(u8),
}

/// Structured input for attack lifecycle fuzzing.
#[derive(Arbitrary, Debug)]
struct OrdersInput {
    /// Map width (clamped to 4..=48).
    width: u8,
    /// Map height (clamped to 4..=48).
    height: u8,
    /// Spawn points; at most six are used.
    spawns: Vec<(u8, u8, u8)>,
    /// Whether teams are on (players alternate between two teams).
    teams: bool,
    /// Whether attacks need a shared border.
    shared_border: bool,
    /// The order and tick sequence.
    steps: Vec<Step>,
}

fuzz_target!(|input: OrdersInput| {
    let width = u16::from(input.width.clamp(4, 48));
    let height = u16::from(input.height.clamp(4, 48));
    let Some(map) = TerritoryMap::new(width, height) else {
        return;
    };

    let spawns: Vec<_> = input.spawns.iter().take(6).collect();
    let players = spawns.len();
    let rules = if input.teams {
        Ruleset::teams((0..players).map(|i| (i % 2) as u8).collect())
    } else {
        Ruleset::free_for_all()
    }
    .with_shared_border(input.shared_border);

    let mut session = GameSession::new(
        map,
        players.max(1),
        Box::new(rules),
        EconomyConfig::default(),
        10_000,
    );
    for (i, &&(x, y, radius)) in spawns.iter().enumerate() {
        let spawn = Coord::new(u16::from(x) % width, u16::from(y) % height);
        // Spawns on owned tiles are rejected, which is fine.
        let _ = session.add_player(format!("p{i}"), spawn, u16::from(radius % 4));
    }
    let joined = session.world().players().len() as u8;
    if joined == 0 {
        return;
    }

    for step in input.steps.into_iter().take(200) {
        match step {
            Step::Order {
                player,
                target,
                percentage,
            } => {
                let order = AttackOrder {
                    player: u16::from(player % joined),
                    target: target.map(|t| u16::from(t % joined)),
                    percentage,
                };
                // Must not panic, whatever the percentage.
                let before = session
                    .world()
                    .player(order.player)
                    .map(|p| p.troops())
                    .unwrap_or(0);
                session.preprocess_attack(order);
                let after = session
                    .world()
                    .player(order.player)
                    .map(|p| p.troops())
                    .unwrap_or(0);
                assert!(after <= before, "orders never add troops");
            }
            Step::Tick(n) => {
                for _ in 0..(n % 8) {
                    session.tick();
                }
            }
        }

        let violations = check_invariants(session.world(), session.attacks());
        assert!(
            violations.is_empty(),
            "Invariants violated: {:?}",
            violations
        );
    }
});

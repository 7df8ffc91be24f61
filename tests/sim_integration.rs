//! Multi-turn integration tests over the simulation harness.
//!
//! These tests verify that full games run without panicking, that every
//! planned tick passes the plan checks, and that the fleet actually harvests.
//!
//! Run with: cargo test --release sim_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::io::Write;

use forager::game::{Command, Snapshot, TickPlan};
use forager::sim::{SimConfig, check_turn, generate_world, run_simulation};
use forager::strategy::{Brain, StrategyConfig};

fn sim(seed: u64, players: usize) -> SimConfig {
    SimConfig {
        width: 24,
        height: 24,
        players,
        max_turns: 200,
        starting_budget: 5000,
        seed,
    }
}

#[test]
fn test_200_turn_game_no_violations() {
    let result = run_simulation(&sim(42, 2), &StrategyConfig::default()).unwrap();
    assert_eq!(result.turns_played, 200);
    assert!(result.violations.is_empty(), "{:?}", result.violations);
}

#[test]
fn test_fleet_harvests_and_delivers() {
    let result = run_simulation(&sim(3, 2), &StrategyConfig::default()).unwrap();
    for player in &result.players {
        assert!(player.spawned >= 5, "player {} spawned {}", player.id, player.spawned);
        assert!(player.deposited > 0, "player {} delivered nothing", player.id);
    }
}

#[test]
fn test_four_players_crowded_map() {
    let config = SimConfig {
        width: 12,
        height: 12,
        max_turns: 120,
        ..sim(17, 4)
    };
    let result = run_simulation(&config, &StrategyConfig::default()).unwrap();
    assert_eq!(result.players.len(), 4);
    assert!(result.violations.is_empty(), "{:?}", result.violations);
}

#[test]
fn test_single_player_game() {
    let result = run_simulation(&sim(8, 1), &StrategyConfig::default()).unwrap();
    assert_eq!(result.winner, Some(1));
    assert!(result.violations.is_empty());
}

#[test]
fn test_many_seeds_no_violations() {
    for seed in 0..8 {
        let config = SimConfig {
            width: 16,
            height: 16,
            max_turns: 80,
            ..sim(seed, 2)
        };
        let result = run_simulation(&config, &StrategyConfig::default()).unwrap();
        assert!(
            result.violations.is_empty(),
            "seed {seed}: {:?}",
            result.violations
        );
    }
}

#[test]
fn test_dropoffs_enabled_game() {
    let strategy = StrategyConfig {
        dropoffs_enabled: true,
        ..StrategyConfig::default()
    };
    let config = SimConfig {
        width: 40,
        height: 40,
        max_turns: 150,
        starting_budget: 10_000,
        ..sim(5, 2)
    };
    let result = run_simulation(&config, &strategy).unwrap();
    assert!(result.violations.is_empty(), "{:?}", result.violations);
}

#[test]
fn test_game_is_deterministic() {
    let a = run_simulation(&sim(99, 2), &StrategyConfig::default()).unwrap();
    let b = run_simulation(&sim(99, 2), &StrategyConfig::default()).unwrap();
    assert_eq!(a.players, b.players);
    assert_eq!(a.winner, b.winner);
}

#[test]
fn test_manual_loop_matches_plan_checks() {
    let mut world = generate_world(&sim(21, 2), &StrategyConfig::default()).unwrap();
    let mut brains = [
        (1, Brain::new(StrategyConfig::default())),
        (2, Brain::new(StrategyConfig::default())),
    ];

    for _ in 0..50 {
        let mut plans: Vec<(u8, TickPlan)> = Vec::new();
        for (id, brain) in &mut brains {
            let snapshot: Snapshot = world.snapshot(*id);
            let report = brain.plan_turn(&snapshot).unwrap();
            assert!(check_turn(&report, &snapshot).is_empty());

            let live = snapshot.player(*id).unwrap().agents.len();
            let commanded = report
                .plan
                .commands
                .iter()
                .filter(|c| !matches!(c, Command::Spawn))
                .count();
            assert_eq!(commanded, live);
            plans.push((*id, report.plan));
        }
        world.apply(&plans);
    }
    assert_eq!(world.turn(), 50);
}

#[test]
fn test_config_file_round_trip() {
    let strategy = StrategyConfig {
        scan_radius: 6,
        return_fraction: 0.6,
        ..StrategyConfig::default()
    };
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&strategy).unwrap().as_bytes())
        .unwrap();

    let loaded = StrategyConfig::load(file.path()).unwrap();
    assert_eq!(loaded, strategy);

    let config = SimConfig {
        max_turns: 60,
        ..sim(4, 2)
    };
    let result = run_simulation(&config, &loaded).unwrap();
    assert_eq!(result.turns_played, 60);
}

#![no_main]
//! Fuzz target for tick planning.
//!
//! Builds an arbitrary small world, plans one tick and checks that the plan
//! commands every agent once without unaccepted destination conflicts.

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use forager::game::{AgentSnapshot, PlayerSnapshot, Position, Snapshot};
use forager::sim::check_turn;
use forager::strategy::{Brain, StrategyConfig};

#[derive(Arbitrary, Debug)]
struct TickInput {
    width: u8,
    height: u8,
    resource: Vec<u16>,
    mine: Vec<(u8, u8, u16)>,
    theirs: Vec<(u8, u8)>,
    budget: u16,
    turn: u8,
    max_turns: u8,
    dropoffs_enabled: bool,
    seed: u64,
}

fuzz_target!(|input: TickInput| {
    let width = u16::from(input.width % 23) + 2;
    let height = u16::from(input.height % 23) + 2;
    let size = usize::from(width) * usize::from(height);

    let resource: Vec<u32> = (0..size)
        .map(|i| input.resource.get(i).map_or(0, |&r| u32::from(r % 1000)))
        .collect();

    // One agent per cell, as the host guarantees.
    let mut taken = HashSet::new();
    let mut cell = |x: u8, y: u8| {
        let position = Position::new(
            i32::from(u16::from(x) % width),
            i32::from(u16::from(y) % height),
        );
        taken.insert(position).then_some(position)
    };

    let mut next_id = 0u32;
    let mut mine = Vec::new();
    for &(x, y, carried) in input.mine.iter().take(32) {
        if let Some(position) = cell(x, y) {
            mine.push(AgentSnapshot {
                id: next_id,
                position,
                carried: u32::from(carried % 1000),
            });
            next_id += 1;
        }
    }
    let mut theirs = Vec::new();
    for &(x, y) in input.theirs.iter().take(16) {
        if let Some(position) = cell(x, y) {
            theirs.push(AgentSnapshot {
                id: next_id,
                position,
                carried: 0,
            });
            next_id += 1;
        }
    }

    let snapshot = Snapshot {
        width,
        height,
        resource,
        me: 1,
        turn: u32::from(input.turn),
        max_turns: u32::from(input.max_turns),
        players: vec![
            PlayerSnapshot {
                id: 1,
                budget: u32::from(input.budget),
                shipyard: Position::new(0, 0),
                dropoffs: Vec::new(),
                agents: mine,
            },
            PlayerSnapshot {
                id: 2,
                budget: 0,
                shipyard: Position::new(i32::from(width) / 2, i32::from(height) / 2),
                dropoffs: Vec::new(),
                agents: theirs,
            },
        ],
    };

    let config = StrategyConfig {
        dropoffs_enabled: input.dropoffs_enabled,
        seed: input.seed,
        ..StrategyConfig::default()
    };
    let Ok(report) = Brain::new(config).plan_turn(&snapshot) else {
        return;
    };

    let violations = check_turn(&report, &snapshot);
    assert!(violations.is_empty(), "{violations:?}");
});

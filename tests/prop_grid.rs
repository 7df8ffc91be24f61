//! Property-based tests for the grid and the tick planner.
//!
//! Run with: cargo test --release prop_grid

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use proptest::prelude::*;

use forager::game::{AgentSnapshot, Grid, PlayerSnapshot, Position, Snapshot};
use forager::sim::check_turn;
use forager::strategy::{Brain, StrategyConfig};

/// Distinct cell indices on a `width x height` board.
fn distinct_cells(raw: &[u16], width: u16, height: u16, skip: &HashSet<usize>) -> Vec<Position> {
    let size = usize::from(width) * usize::from(height);
    let mut seen = skip.clone();
    let mut cells = Vec::new();
    for &r in raw {
        let idx = usize::from(r) % size;
        if seen.insert(idx) {
            let x = i32::try_from(idx % usize::from(width)).unwrap();
            let y = i32::try_from(idx / usize::from(width)).unwrap();
            cells.push(Position::new(x, y));
        }
    }
    cells
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Distance is symmetric and zero only on the same cell.
    #[test]
    fn prop_distance_symmetric(
        width in 1u16..64,
        height in 1u16..64,
        ax in -200i32..200, ay in -200i32..200,
        bx in -200i32..200, by in -200i32..200,
    ) {
        let grid = Grid::new(width, height).unwrap();
        let a = Position::new(ax, ay);
        let b = Position::new(bx, by);

        prop_assert_eq!(grid.distance(a, b), grid.distance(b, a));
        prop_assert_eq!(grid.distance(a, b) == 0, grid.normalize(a) == grid.normalize(b));
        prop_assert!(grid.distance(a, b) <= u32::from(width / 2 + height / 2));
    }

    /// Distance satisfies the triangle inequality.
    #[test]
    fn prop_distance_triangle(
        width in 1u16..64,
        height in 1u16..64,
        ax in 0i32..64, ay in 0i32..64,
        bx in 0i32..64, by in 0i32..64,
        cx in 0i32..64, cy in 0i32..64,
    ) {
        let grid = Grid::new(width, height).unwrap();
        let a = Position::new(ax, ay);
        let b = Position::new(bx, by);
        let c = Position::new(cx, cy);

        prop_assert!(grid.distance(a, c) <= grid.distance(a, b) + grid.distance(b, c));
    }

    /// Every approach move brings the target one step closer.
    #[test]
    fn prop_approach_moves_reduce_distance(
        width in 1u16..40,
        height in 1u16..40,
        ax in 0i32..40, ay in 0i32..40,
        bx in 0i32..40, by in 0i32..40,
    ) {
        let grid = Grid::new(width, height).unwrap();
        let from = grid.normalize(Position::new(ax, ay));
        let to = grid.normalize(Position::new(bx, by));
        let before = grid.distance(from, to);

        let (moves, count) = grid.approach_moves(from, to);
        prop_assert_eq!(count == 0, before == 0);
        for &direction in &moves[..usize::from(count)] {
            let next = grid.normalize(from.offset(direction));
            prop_assert_eq!(grid.distance(next, to) + 1, before);
        }
    }

    /// Reserving a cell twice is the same as reserving it once.
    #[test]
    fn prop_mark_unsafe_idempotent(
        width in 1u16..32,
        height in 1u16..32,
        x in -100i32..100,
        y in -100i32..100,
    ) {
        let mut once = Grid::new(width, height).unwrap();
        let mut twice = once.clone();
        let position = Position::new(x, y);

        once.mark_unsafe(position);
        twice.mark_unsafe(position);
        twice.mark_unsafe(position);

        prop_assert_eq!(once.cells(), twice.cells());
        prop_assert!(!once.is_safe(position));
        prop_assert_eq!(once.cells().iter().filter(|c| c.is_reserved()).count(), 1);
    }

    /// The square window never visits a cell twice.
    #[test]
    fn prop_window_unique(width in 1u16..30, height in 1u16..30, radius in 0u16..20) {
        let grid = Grid::new(width, height).unwrap();
        let mut seen = HashSet::new();
        for (dx, dy) in grid.window(radius) {
            prop_assert!(seen.insert(grid.normalize(Position::new(dx, dy))));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every agent gets exactly one command and no two agents share a
    /// destination outside the accepted cases.
    #[test]
    fn prop_plan_one_command_per_agent(
        width in 3u16..16,
        height in 3u16..16,
        resource in prop::collection::vec(0u32..1000, 256),
        mine in prop::collection::vec(any::<u16>(), 0..16),
        theirs in prop::collection::vec(any::<u16>(), 0..8),
        carried in prop::collection::vec(0u32..1000, 16),
        turn in 0u32..100,
        budget in 0u32..3000,
        seed in any::<u64>(),
    ) {
        let size = usize::from(width) * usize::from(height);
        let home = Position::new(0, 0);
        let mut taken = HashSet::new();
        taken.insert(size - 1); // opponent shipyard

        let mine = distinct_cells(&mine, width, height, &taken);
        for p in &mine {
            taken.insert(usize::try_from(p.y).unwrap() * usize::from(width) + usize::try_from(p.x).unwrap());
        }
        let theirs = distinct_cells(&theirs, width, height, &taken);

        let snapshot = Snapshot {
            width,
            height,
            resource: resource[..size].to_vec(),
            me: 0,
            turn,
            max_turns: 100,
            players: vec![
                PlayerSnapshot {
                    id: 0,
                    budget,
                    shipyard: home,
                    dropoffs: Vec::new(),
                    agents: (0u32..).zip(&mine).map(|(id, &position)| AgentSnapshot {
                        id,
                        position,
                        carried: carried[usize::try_from(id).unwrap()],
                    }).collect(),
                },
                PlayerSnapshot {
                    id: 1,
                    budget: 0,
                    shipyard: Position::new(i32::from(width) - 1, i32::from(height) - 1),
                    dropoffs: Vec::new(),
                    agents: (100u32..).zip(&theirs).map(|(id, &position)| AgentSnapshot {
                        id,
                        position,
                        carried: 0,
                    }).collect(),
                },
            ],
        };

        let config = StrategyConfig { seed, ..StrategyConfig::default() };
        let report = Brain::new(config).plan_turn(&snapshot).unwrap();

        prop_assert_eq!(report.assignments.len(), mine.len());
        prop_assert_eq!(report.plan.agent_commands().count(), mine.len());
        let violations = check_turn(&report, &snapshot);
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }
}

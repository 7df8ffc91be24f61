//! Resource-gradient direction scoring and inspiration marking.
//!
//! The scorer is a discretized attractive field: every cell in a square
//! window around the agent pulls with `resource / distance²`, and the pull is
//! credited to the first leg of the shortest toroidal path toward that cell.
//! Distant clusters therefore bias the move even when the four immediate
//! neighbours are empty.

use std::collections::HashMap;

use crate::error::{MoveResult, NoSafeMove};
use crate::game::{Direction, Grid, Position};
use crate::strategy::StrategyConfig;

/// Directional preference from local resource density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceFieldScorer {
    scan_radius: u16,
    inspiration_enabled: bool,
    inspiration_radius: u16,
    inspiration_ship_count: u16,
    inspiration_factor: f64,
}

impl ResourceFieldScorer {
    /// Create a scorer from the strategy config.
    #[must_use]
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            scan_radius: config.scan_radius,
            inspiration_enabled: config.inspiration_enabled,
            inspiration_radius: config.inspiration_radius,
            inspiration_ship_count: config.inspiration_ship_count,
            inspiration_factor: config.inspiration_factor(),
        }
    }

    /// Flag every cell with enough opponents within the inspiration radius.
    ///
    /// Returns the number of inspired cells.
    pub fn mark_inspiration(&self, grid: &mut Grid, opponents: &[Position]) -> usize {
        if !self.inspiration_enabled || self.inspiration_ship_count == 0 {
            return 0;
        }

        let radius = u32::from(self.inspiration_radius);
        let mut counts: HashMap<Position, u16> = HashMap::new();
        for &opponent in opponents {
            let opponent = grid.normalize(opponent);
            for (dx, dy) in grid.window(self.inspiration_radius) {
                let cell = Position::new(opponent.x + dx, opponent.y + dy);
                if grid.distance(opponent, cell) <= radius {
                    *counts.entry(grid.normalize(cell)).or_insert(0) += 1;
                }
            }
        }

        let mut inspired = 0;
        for (position, count) in counts {
            if count >= self.inspiration_ship_count {
                grid.mark_inspired(position);
                inspired += 1;
            }
        }
        inspired
    }

    /// Resource on a cell, scaled by the inspiration bonus when inspired.
    #[must_use]
    pub fn cell_value(&self, grid: &Grid, position: Position) -> f64 {
        let cell = grid.cell_at(position);
        let amount = f64::from(cell.resource);
        if cell.is_inspired() {
            amount * self.inspiration_factor
        } else {
            amount
        }
    }

    /// Accumulated pull per cardinal direction, indexed N, S, E, W.
    #[must_use]
    pub fn directional_pull(&self, grid: &Grid, origin: Position) -> [f64; 4] {
        let mut pull = [0.0; 4];

        for (dx, dy) in grid.window(self.scan_radius) {
            if dx == 0 && dy == 0 {
                continue;
            }
            let target = Position::new(origin.x + dx, origin.y + dy);
            let distance = grid.distance(origin, target);
            if distance == 0 {
                continue;
            }

            let (moves, count) = grid.approach_moves(origin, target);
            if count == 0 {
                continue;
            }
            if let Some(idx) = moves[0].cardinal_index() {
                let d = f64::from(distance);
                pull[idx] += self.cell_value(grid, target) / (d * d);
            }
        }

        pull
    }

    /// Highest-pull cardinal direction whose destination is unreserved.
    ///
    /// # Errors
    ///
    /// Returns [`NoSafeMove`] if all four destinations are reserved.
    pub fn best_direction(&self, grid: &Grid, origin: Position) -> MoveResult<(Direction, Position)> {
        let pull = self.directional_pull(grid, origin);
        let mut ranked: Vec<(Direction, f64)> =
            Direction::CARDINALS.iter().copied().zip(pull).collect();
        // Stable: equal pulls keep N, S, E, W order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .map(|(direction, _)| (direction, grid.normalize(origin.offset(direction))))
            .find(|&(_, destination)| grid.is_safe(destination))
            .ok_or(NoSafeMove { position: origin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> ResourceFieldScorer {
        ResourceFieldScorer::new(&StrategyConfig::default())
    }

    #[test]
    fn test_pull_toward_distant_cluster() {
        let mut grid = Grid::new(21, 21).unwrap();
        grid.cell_at_mut(Position::new(15, 10)).resource = 900;

        let pull = scorer().directional_pull(&grid, Position::new(10, 10));
        assert!(pull[2] > 0.0);
        assert!((pull[2] - 900.0 / 25.0).abs() < 1e-9);
        assert!(pull[3].abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_direction_skips_reserved() {
        let mut grid = Grid::new(11, 11).unwrap();
        let origin = Position::new(5, 5);
        grid.cell_at_mut(Position::new(6, 5)).resource = 500;
        grid.cell_at_mut(Position::new(5, 3)).resource = 100;
        grid.mark_unsafe(Position::new(6, 5));

        let (direction, destination) = scorer().best_direction(&grid, origin).unwrap();
        assert_eq!(direction, Direction::North);
        assert_eq!(destination, Position::new(5, 4));
    }

    #[test]
    fn test_best_direction_boxed_in() {
        let mut grid = Grid::new(5, 5).unwrap();
        let origin = Position::new(2, 2);
        for (_, p) in grid.adjacent(origin) {
            grid.mark_unsafe(p);
        }
        assert_eq!(
            scorer().best_direction(&grid, origin),
            Err(NoSafeMove { position: origin })
        );
    }

    #[test]
    fn test_inspiration_requires_two_opponents() {
        let mut grid = Grid::new(20, 20).unwrap();
        let s = scorer();

        assert_eq!(s.mark_inspiration(&mut grid, &[Position::new(5, 5)]), 0);

        let inspired = s.mark_inspiration(&mut grid, &[Position::new(5, 5), Position::new(7, 5)]);
        assert!(inspired > 0);
        assert!(grid.is_inspired(Position::new(6, 5)));
        assert!(!grid.is_inspired(Position::new(15, 15)));
        // 4 from (7,5), 6 from (5,5): outside one radius
        assert!(!grid.is_inspired(Position::new(11, 5)));
    }

    #[test]
    fn test_inspiration_far_out_coordinates() {
        let mut grid = Grid::new(8, 8).unwrap();
        let opponents = [Position::new(i32::MAX, 2), Position::new(i32::MIN, 2)];

        let inspired = scorer().mark_inspiration(&mut grid, &opponents);
        assert!(inspired > 0);
        // i32::MAX wraps to x = 7, i32::MIN to x = 0
        assert!(grid.is_inspired(grid.normalize(Position::new(i32::MAX, 2))));
        assert!(grid.is_inspired(Position::new(0, 2)));
    }

    #[test]
    fn test_inspiration_disabled() {
        let config = StrategyConfig {
            inspiration_enabled: false,
            ..StrategyConfig::default()
        };
        let mut grid = Grid::new(10, 10).unwrap();
        let s = ResourceFieldScorer::new(&config);
        let opponents = [Position::new(1, 1), Position::new(1, 2), Position::new(2, 1)];
        assert_eq!(s.mark_inspiration(&mut grid, &opponents), 0);
    }

    #[test]
    fn test_inspired_cell_value() {
        let mut grid = Grid::new(5, 5).unwrap();
        let p = Position::new(1, 1);
        grid.cell_at_mut(p).resource = 100;
        assert!((scorer().cell_value(&grid, p) - 100.0).abs() < f64::EPSILON);
        grid.mark_inspired(p);
        assert!((scorer().cell_value(&grid, p) - 300.0).abs() < f64::EPSILON);
    }
}

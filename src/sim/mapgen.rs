//! Deterministic world generation for simulated games.

// Map generation uses intentional casts for coordinate/RNG operations
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::{Grid, PlayerId, Position, Structure, StructureKind};
use crate::sim::{PlayerState, SimConfig, SimError, World};
use crate::strategy::StrategyConfig;

/// Maximum number of players a generated world can hold.
pub const MAX_PLAYERS: usize = 4;

/// Baseline resource range for every cell.
const BASE_RESOURCE: std::ops::RangeInclusive<u32> = 10..=120;

/// Peak resource at the center of a deposit.
const DEPOSIT_PEAK: std::ops::RangeInclusive<u32> = 400..=900;

/// Cells per resource deposit.
const CELLS_PER_DEPOSIT: usize = 48;

/// Generate a world with resources and one shipyard per player.
///
/// # Errors
///
/// Returns an error if the dimensions are zero or the player count is
/// outside `1..=MAX_PLAYERS`.
pub fn generate_world(sim: &SimConfig, strategy: &StrategyConfig) -> Result<World, SimError> {
    if sim.players == 0 {
        return Err(SimError::TooFewPlayers(sim.players));
    }
    if sim.players > MAX_PLAYERS {
        return Err(SimError::TooManyPlayers(sim.players));
    }

    let mut grid = Grid::new(sim.width, sim.height).ok_or(SimError::InvalidDimensions {
        width: sim.width,
        height: sim.height,
    })?;
    let cells = usize::from(sim.width) * usize::from(sim.height);
    if cells < sim.players {
        return Err(SimError::TooManyPlayers(sim.players));
    }

    let mut rng = SmallRng::seed_from_u64(sim.seed);
    scatter_resources(&mut grid, &mut rng);

    let shipyards = place_shipyards(&grid, sim.players, &mut rng);
    let mut players = Vec::with_capacity(shipyards.len());
    for (i, &shipyard) in shipyards.iter().enumerate() {
        // Player IDs are 1-indexed
        let id = (i + 1) as PlayerId;
        let cell = grid.cell_at_mut(shipyard);
        cell.resource = 0;
        cell.structure = Some(Structure {
            owner: id,
            kind: StructureKind::Shipyard,
        });
        players.push(PlayerState::new(id, shipyard, sim.starting_budget));
    }

    Ok(World::new(grid, players, sim.max_turns, *strategy))
}

/// Fill every cell with a base amount, then add peaked deposits.
fn scatter_resources(grid: &mut Grid, rng: &mut SmallRng) {
    let positions: Vec<Position> = grid.iter().map(|(p, _)| p).collect();
    for &position in &positions {
        grid.cell_at_mut(position).resource = rng.random_range(BASE_RESOURCE);
    }

    let deposits = (positions.len() / CELLS_PER_DEPOSIT).max(1);
    let radius = u32::from(grid.width().min(grid.height()) / 8).max(1);
    for _ in 0..deposits {
        let center = positions[rng.random_range(0..positions.len())];
        let peak = rng.random_range(DEPOSIT_PEAK);
        for &position in &positions {
            let distance = grid.distance(center, position);
            if distance <= radius {
                let falloff = 1.0 - f64::from(distance) / f64::from(radius + 1);
                let cell = grid.cell_at_mut(position);
                cell.resource = cell.resource.saturating_add((f64::from(peak) * falloff) as u32);
            }
        }
    }
}

/// Spread shipyards evenly on a circle around the center.
fn place_shipyards(grid: &Grid, players: usize, rng: &mut SmallRng) -> Vec<Position> {
    let center_x = f64::from(grid.width()) / 2.0;
    let center_y = f64::from(grid.height()) / 2.0;
    // 30% of the smaller dimension
    let radius = f64::from(grid.width().min(grid.height())) * 0.3;

    let angle_step = std::f64::consts::TAU / players as f64;
    let angle_offset = if players == 1 {
        0.0
    } else {
        rng.random::<f64>() * std::f64::consts::TAU
    };

    let mut shipyards: Vec<Position> = Vec::with_capacity(players);
    for i in 0..players {
        let angle = angle_offset + i as f64 * angle_step;
        let target = grid.normalize(Position::new(
            (center_x + radius * angle.cos()).floor() as i32,
            (center_y + radius * angle.sin()).floor() as i32,
        ));

        // Nearest free cell to the target
        let chosen = grid
            .iter()
            .map(|(p, _)| p)
            .filter(|p| !shipyards.contains(p))
            .min_by_key(|&p| grid.distance(p, target))
            .unwrap_or(target);
        shipyards.push(chosen);
    }

    shipyards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(seed: u64, players: usize) -> SimConfig {
        SimConfig {
            width: 24,
            height: 24,
            players,
            seed,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_generation_determinism() {
        let a = generate_world(&sim(42, 2), &StrategyConfig::default()).unwrap();
        let b = generate_world(&sim(42, 2), &StrategyConfig::default()).unwrap();
        assert_eq!(a.snapshot(1), b.snapshot(1));
    }

    #[test]
    fn test_generation_different_seeds() {
        let a = generate_world(&sim(42, 2), &StrategyConfig::default()).unwrap();
        let b = generate_world(&sim(43, 2), &StrategyConfig::default()).unwrap();
        assert_ne!(a.snapshot(1).resource, b.snapshot(1).resource);
    }

    #[test]
    fn test_shipyards_distinct_and_owned() {
        for players in 1..=MAX_PLAYERS {
            let world = generate_world(&sim(5, players), &StrategyConfig::default()).unwrap();
            let snapshot = world.snapshot(1);
            assert_eq!(snapshot.players.len(), players);

            let mut shipyards: Vec<_> = snapshot.players.iter().map(|p| p.shipyard).collect();
            shipyards.sort();
            shipyards.dedup();
            assert_eq!(shipyards.len(), players);

            let grid = snapshot.build_grid().unwrap();
            for player in &snapshot.players {
                assert!(grid.cell_at(player.shipyard).is_collection_point_of(player.id));
                assert_eq!(grid.cell_at(player.shipyard).resource, 0);
            }
        }
    }

    #[test]
    fn test_player_count_bounds() {
        let config = StrategyConfig::default();
        assert!(matches!(
            generate_world(&sim(1, 0), &config),
            Err(SimError::TooFewPlayers(0))
        ));
        assert!(matches!(
            generate_world(&sim(1, MAX_PLAYERS + 1), &config),
            Err(SimError::TooManyPlayers(_))
        ));
    }

    #[test]
    fn test_zero_dimensions() {
        let config = SimConfig {
            width: 0,
            ..sim(1, 2)
        };
        assert!(matches!(
            generate_world(&config, &StrategyConfig::default()),
            Err(SimError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_resources_present() {
        let world = generate_world(&sim(9, 2), &StrategyConfig::default()).unwrap();
        let snapshot = world.snapshot(1);
        assert!(snapshot.resource.iter().filter(|&&r| r > 0).count() > 500);
    }
}

//! Two-state behavior policy: status transitions and per-state move choice.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::{MoveResult, NoSafeMove};
use crate::game::{Agent, Direction, Grid, Position, Status, TickContext};
use crate::strategy::{ResourceFieldScorer, StrategyConfig};

/// Fraction of a cell's value left after staying two more turns (`(3/4)²`).
const STAY_REMAINDER: f64 = 9.0 / 16.0;

/// Share of a neighbour's value expected from one turn of extraction.
const MOVE_YIELD_DIVISOR: f64 = 4.0;

/// A chosen move: where the agent ends up and how it gets there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedMove {
    /// Destination cell (normalized).
    pub destination: Position,
    /// Step direction.
    pub direction: Direction,
}

impl PlannedMove {
    /// Move one step in `direction`.
    #[must_use]
    pub fn step(grid: &Grid, from: Position, direction: Direction) -> Self {
        Self {
            destination: grid.normalize(from.offset(direction)),
            direction,
        }
    }

    /// Stay on `position`.
    #[must_use]
    pub const fn stay(position: Position) -> Self {
        Self {
            destination: position,
            direction: Direction::Still,
        }
    }
}

/// Status-conditioned move selection.
#[derive(Debug, Clone, Copy)]
pub struct AgentPolicy {
    config: StrategyConfig,
    scorer: ResourceFieldScorer,
}

impl AgentPolicy {
    /// Create a policy from the strategy config.
    #[must_use]
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            scorer: ResourceFieldScorer::new(&config),
        }
    }

    /// The scorer used for exploring moves.
    #[must_use]
    pub const fn scorer(&self) -> &ResourceFieldScorer {
        &self.scorer
    }

    /// Cost of moving off `position`.
    #[must_use]
    pub fn move_cost(&self, grid: &Grid, position: Position) -> u32 {
        grid.cell_at(position).resource / self.config.move_cost_ratio.max(1)
    }

    /// Whether the agent carries enough to pay for leaving its cell.
    #[must_use]
    pub fn can_move(&self, grid: &Grid, agent: &Agent) -> bool {
        agent.carried >= self.move_cost(grid, agent.position)
    }

    /// Whether the agent must head home this tick.
    #[must_use]
    pub fn should_return(&self, agent: &Agent, grid: &Grid, tick: &TickContext) -> bool {
        if tick.is_endgame {
            return true;
        }
        if f64::from(agent.carried) >= self.config.return_amount() {
            return true;
        }
        nearest_collection_point(grid, &tick.collection_points, agent.position)
            .is_some_and(|point| grid.distance(agent.position, point) >= tick.turns_left)
    }

    /// Next status for an agent given its current one (`None` on first sight).
    #[must_use]
    pub fn transition(
        &self,
        current: Option<Status>,
        agent: &Agent,
        grid: &Grid,
        tick: &TickContext,
    ) -> Status {
        if self.should_return(agent, grid, tick) {
            return Status::Returning;
        }
        if grid.cell_at(agent.position).is_collection_point_of(tick.player) {
            return Status::Exploring;
        }
        current.unwrap_or(Status::Exploring)
    }

    /// Pick a move for the agent according to its status.
    ///
    /// # Errors
    ///
    /// Returns [`NoSafeMove`] when the agent has nowhere safe to go.
    pub fn choose_move<R: Rng + ?Sized>(
        &self,
        status: Status,
        agent: &Agent,
        grid: &Grid,
        tick: &TickContext,
        rng: &mut R,
    ) -> MoveResult<PlannedMove> {
        match status {
            Status::Exploring => self.explore(agent, grid, tick, rng),
            Status::Returning => self.return_home(agent, grid, tick, rng),
        }
    }

    /// Harvesting move.
    ///
    /// On a collection point a random safe neighbour is taken to break up the
    /// crowd at spawn. Elsewhere the scorer's best safe direction is weighed
    /// against staying:
    ///
    /// - `move_outlook = candidate / 4 - move_cost(here)`
    /// - `stay_outlook = current * (1 - 9/16)`
    ///
    /// The agent stays only when moving does not pay and its own cell is safe.
    ///
    /// # Errors
    ///
    /// Returns [`NoSafeMove`] when every neighbour is reserved.
    pub fn explore<R: Rng + ?Sized>(
        &self,
        agent: &Agent,
        grid: &Grid,
        tick: &TickContext,
        rng: &mut R,
    ) -> MoveResult<PlannedMove> {
        let here = agent.position;

        if grid.cell_at(here).is_collection_point_of(tick.player) {
            let safe = safe_neighbours(grid, here);
            return safe
                .choose(rng)
                .map(|&(direction, destination)| PlannedMove {
                    destination,
                    direction,
                })
                .ok_or(NoSafeMove { position: here });
        }

        let (direction, destination) = self.scorer.best_direction(grid, here)?;

        let candidate_value = self.scorer.cell_value(grid, destination);
        let current_value = self.scorer.cell_value(grid, here);
        let move_outlook =
            candidate_value / MOVE_YIELD_DIVISOR - f64::from(self.move_cost(grid, here));
        let stay_outlook = current_value * (1.0 - STAY_REMAINDER);

        if move_outlook < stay_outlook && grid.is_safe(here) {
            Ok(PlannedMove::stay(here))
        } else {
            Ok(PlannedMove {
                destination,
                direction,
            })
        }
    }

    /// Greedy step toward the nearest own collection point.
    ///
    /// In the endgame a step onto a collection point is taken unconditionally.
    /// Otherwise the cheapest safe forward step wins; with none, the agent
    /// stays if it can, or else sidesteps onto the poorest safe neighbour.
    ///
    /// # Errors
    ///
    /// Returns [`NoSafeMove`] when the agent must move but every neighbour is
    /// reserved.
    pub fn return_home<R: Rng + ?Sized>(
        &self,
        agent: &Agent,
        grid: &Grid,
        tick: &TickContext,
        rng: &mut R,
    ) -> MoveResult<PlannedMove> {
        let here = agent.position;

        if let Some(target) = nearest_collection_point(grid, &tick.collection_points, here) {
            let (moves, count) = grid.approach_moves(here, target);
            let mut best: Option<(u32, PlannedMove)> = None;

            for &direction in &moves[..usize::from(count)] {
                let step = PlannedMove::step(grid, here, direction);

                if tick.is_endgame
                    && grid
                        .cell_at(step.destination)
                        .is_collection_point_of(tick.player)
                {
                    return Ok(step);
                }

                if grid.is_safe(step.destination) {
                    let cost = self.move_cost(grid, step.destination);
                    if best.is_none_or(|(best_cost, _)| cost < best_cost) {
                        best = Some((cost, step));
                    }
                }
            }

            if let Some((_, step)) = best {
                return Ok(step);
            }
        }

        if grid.is_safe(here) {
            return Ok(PlannedMove::stay(here));
        }

        poorest_safe_neighbour(grid, here, rng).ok_or(NoSafeMove { position: here })
    }
}

/// Nearest position in `points` by toroidal distance; the first one wins ties.
#[must_use]
pub fn nearest_collection_point(grid: &Grid, points: &[Position], from: Position) -> Option<Position> {
    let mut best: Option<(u32, Position)> = None;
    for &point in points {
        let distance = grid.distance(from, point);
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, point));
        }
    }
    best.map(|(_, point)| point)
}

fn safe_neighbours(grid: &Grid, position: Position) -> Vec<(Direction, Position)> {
    grid.adjacent(position)
        .into_iter()
        .filter(|&(_, p)| grid.is_safe(p))
        .collect()
}

/// Safe neighbour with the least resource, ties broken uniformly at random.
fn poorest_safe_neighbour<R: Rng + ?Sized>(
    grid: &Grid,
    position: Position,
    rng: &mut R,
) -> Option<PlannedMove> {
    let safe = safe_neighbours(grid, position);
    let least = safe.iter().map(|&(_, p)| grid.cell_at(p).resource).min()?;
    let poorest: Vec<_> = safe
        .into_iter()
        .filter(|&(_, p)| grid.cell_at(p).resource == least)
        .collect();

    poorest.choose(rng).map(|&(direction, destination)| PlannedMove {
        destination,
        direction,
    })
}

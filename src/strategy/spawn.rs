//! Fleet growth: spawning new agents and converting agents into collection points.

use tracing::debug;

use crate::game::{Agent, AgentId, Command, Grid, TickContext};
use crate::strategy::{StrategyConfig, nearest_collection_point};

/// Decides whether to grow the fleet this tick.
#[derive(Debug, Clone, Copy)]
pub struct SpawnController {
    config: StrategyConfig,
}

impl SpawnController {
    /// Create a controller from the strategy config.
    #[must_use]
    pub const fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// Whether a spawn is allowed with `budget` left to spend.
    #[must_use]
    pub fn should_spawn(&self, grid: &Grid, tick: &TickContext, budget: u32) -> bool {
        budget >= self.config.spawn_cost
            && grid.is_safe(tick.home)
            && f64::from(tick.turn) < self.config.spawn_cutoff_turn(tick.max_turns)
    }

    /// Emit a spawn command and reserve the home cell, if allowed.
    ///
    /// Run after the scheduler so agents leaving or holding the home cell
    /// are already reflected in its reservation.
    pub fn spawn(&self, grid: &mut Grid, tick: &TickContext, budget: u32) -> Option<Command> {
        if !self.should_spawn(grid, tick, budget) {
            return None;
        }
        grid.mark_unsafe(tick.home);
        debug!(turn = tick.turn, budget, "spawning agent");
        Some(Command::Spawn)
    }

    /// Pick at most one agent to convert into a collection point.
    ///
    /// Requires conversions to be enabled, enough budget (the agent's cargo
    /// and the cell's resource count toward the cost), and the agent to be
    /// far from every existing collection point.
    #[must_use]
    pub fn pick_conversion(&self, agents: &[Agent], grid: &Grid, tick: &TickContext) -> Option<AgentId> {
        if !self.config.dropoffs_enabled || tick.is_endgame {
            return None;
        }

        let threshold = f64::from(grid.width()) * self.config.dropoff_distance_fraction;
        agents
            .iter()
            .filter(|a| grid.cell_at(a.position).structure.is_none())
            .filter(|a| {
                let cell = grid.cell_at(a.position).resource;
                u64::from(tick.budget) + u64::from(a.carried) + u64::from(cell)
                    >= u64::from(self.config.dropoff_cost)
            })
            .filter(|a| {
                nearest_collection_point(grid, &tick.collection_points, a.position)
                    .is_some_and(|p| f64::from(grid.distance(a.position, p)) > threshold)
            })
            .min_by_key(|a| a.id)
            .map(|a| a.id)
    }

    /// Budget spent by converting `agent` this tick.
    #[must_use]
    pub fn conversion_spend(&self, agent: &Agent, grid: &Grid) -> u32 {
        let discount = agent.carried.saturating_add(grid.cell_at(agent.position).resource);
        self.config.dropoff_cost.saturating_sub(discount)
    }
}

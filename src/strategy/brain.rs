//! Per-tick orchestration of the strategy.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};

use crate::error::SnapshotError;
use crate::game::{AgentId, Command, Snapshot, StatusStore, TickContext, TickPlan};
use crate::strategy::{
    AgentPolicy, Assignment, AssignmentKind, MovementScheduler, SpawnController, StrategyConfig,
};

/// Everything decided in one tick.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Context the decisions were made under.
    pub tick: TickContext,
    /// One assignment per live agent, in commit order.
    pub assignments: Vec<Assignment>,
    /// Commands for the host.
    pub plan: TickPlan,
    /// Number of inspired cells this tick.
    pub inspired_cells: usize,
}

impl TurnReport {
    /// Number of agents that fell back to an unsafe stationary move.
    #[must_use]
    pub fn fallbacks(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.kind == AssignmentKind::Fallback)
            .count()
    }
}

/// Strategy state that lives for a whole game session.
#[derive(Debug)]
pub struct Brain {
    policy: AgentPolicy,
    spawner: SpawnController,
    statuses: StatusStore,
    rng: SmallRng,
}

impl Brain {
    /// Create a brain with an empty status store.
    #[must_use]
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            policy: AgentPolicy::new(config),
            spawner: SpawnController::new(config),
            statuses: StatusStore::new(),
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    /// Statuses carried across ticks.
    #[must_use]
    pub const fn statuses(&self) -> &StatusStore {
        &self.statuses
    }

    /// Decide the commands for one tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is inconsistent.
    pub fn take_turn(&mut self, snapshot: &Snapshot) -> Result<TickPlan, SnapshotError> {
        self.plan_turn(snapshot).map(|report| report.plan)
    }

    /// Decide the commands for one tick, keeping the per-agent detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is inconsistent.
    pub fn plan_turn(&mut self, snapshot: &Snapshot) -> Result<TurnReport, SnapshotError> {
        let mut grid = snapshot.build_grid()?;
        grid.reset_tick_flags();
        let tick = TickContext::from_snapshot(snapshot, &grid)?;

        let opponents = snapshot.opponent_positions(&grid);
        for &position in &opponents {
            grid.mark_unsafe(position);
        }
        let inspired_cells = self.policy.scorer().mark_inspiration(&mut grid, &opponents);

        let agents = snapshot.agents_of(tick.player, &grid);
        let converting = self.spawner.pick_conversion(&agents, &grid, &tick);
        let mut budget = tick.budget;
        if let Some(agent) = converting.and_then(|id| agents.iter().find(|a| a.id == id)) {
            budget = budget.saturating_sub(self.spawner.conversion_spend(agent, &grid));
        }

        let assignments = MovementScheduler::new(&self.policy).schedule(
            &agents,
            converting,
            &mut self.statuses,
            &mut grid,
            &tick,
            &mut self.rng,
        );

        let mut plan = TickPlan::new();
        for assignment in &assignments {
            plan.push(match assignment.kind {
                AssignmentKind::Convert => Command::MakeDropoff {
                    agent: assignment.agent,
                },
                _ => Command::Move {
                    agent: assignment.agent,
                    direction: assignment.direction,
                },
            });
        }
        if let Some(spawn) = self.spawner.spawn(&mut grid, &tick, budget) {
            plan.push(spawn);
        }

        let live: HashSet<AgentId> = agents.iter().map(|a| a.id).collect();
        self.statuses.retain_live(&live);

        let report = TurnReport {
            tick,
            assignments,
            plan,
            inspired_cells,
        };

        let fallbacks = report.fallbacks();
        if fallbacks > 0 {
            warn!(turn = report.tick.turn, fallbacks, "agents boxed in, staying put");
        }
        info!(
            turn = report.tick.turn,
            agents = live.len(),
            endgame = report.tick.is_endgame,
            spawn = report.plan.spawns(),
            inspired = report.inspired_cells,
            "turn planned"
        );

        Ok(report)
    }
}

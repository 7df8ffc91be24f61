//! Local simulation harness.
//!
//! Provides a pure function interface: `(seed, configs) -> SimResult`
//!
//! The harness handles:
//! - Deterministic map generation
//! - One [`Brain`] per player, planned in parallel with rayon
//! - Sequential, player-ordered command application
//! - Extraction, collisions and deposits
//! - Post-tick plan checks

mod engine;
mod invariants;
mod mapgen;

pub use engine::{PlayerState, TickOutcome, World};
pub use invariants::{PlanViolation, check_turn};
pub use mapgen::{MAX_PLAYERS, generate_world};

use std::fmt;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::SnapshotError;
use crate::game::{PlayerId, TickPlan};
use crate::strategy::{Brain, StrategyConfig};

/// Parameters of a simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Grid width.
    pub width: u16,
    /// Grid height.
    pub height: u16,
    /// Number of players (1-4).
    pub players: usize,
    /// Turns before the game ends.
    pub max_turns: u32,
    /// Budget each player starts with.
    pub starting_budget: u32,
    /// Seed for map generation and every brain.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            players: 2,
            max_turns: 400,
            starting_budget: 5000,
            seed: 0,
        }
    }
}

/// Error type for simulation setup and play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// Width or height is zero.
    InvalidDimensions {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },
    /// No players requested.
    TooFewPlayers(usize),
    /// More players than the map generator can place.
    TooManyPlayers(usize),
    /// A brain rejected the snapshot it was handed.
    Snapshot(SnapshotError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid map dimensions {width}x{height}")
            }
            Self::TooFewPlayers(n) => write!(f, "too few players: {n} (minimum 1)"),
            Self::TooManyPlayers(n) => write!(f, "too many players: {n} (maximum {MAX_PLAYERS})"),
            Self::Snapshot(e) => write!(f, "bad snapshot: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Snapshot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SnapshotError> for SimError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

/// Final standing of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerResult {
    /// Player identifier.
    pub id: PlayerId,
    /// Budget at the end of the game.
    pub score: u32,
    /// Total resource delivered to collection points.
    pub deposited: u64,
    /// Agents alive at the end.
    pub agents: usize,
    /// Agents produced over the game.
    pub spawned: u32,
    /// Agents lost to collisions.
    pub collisions: u32,
}

/// Result of a simulated game.
#[derive(Debug, Clone)]
pub struct SimResult {
    /// The seed used for this game.
    pub seed: u64,
    /// Turns played.
    pub turns_played: u32,
    /// Per-player results, by player id.
    pub players: Vec<PlayerResult>,
    /// Highest score (lowest id on ties).
    pub winner: Option<PlayerId>,
    /// Plan checks that failed, with the turn they failed on.
    pub violations: Vec<(u32, PlanViolation)>,
}

/// Play a full game with every player driven by a brain built from `strategy`.
///
/// Player `i` seeds its brain with `sim.seed + i`.
///
/// # Determinism
///
/// The same `sim` and `strategy` always produce the same result.
///
/// # Errors
///
/// Returns an error if the world cannot be generated or a brain rejects its
/// snapshot.
pub fn run_simulation(sim: &SimConfig, strategy: &StrategyConfig) -> Result<SimResult, SimError> {
    let mut world = generate_world(sim, strategy)?;
    let mut brains: Vec<(PlayerId, Brain)> = world
        .player_ids()
        .map(|id| {
            let config = StrategyConfig {
                seed: sim.seed.wrapping_add(u64::from(id)),
                ..*strategy
            };
            (id, Brain::new(config))
        })
        .collect();

    let mut violations = Vec::new();
    while !world.is_over() {
        let turn = world.turn();

        let results: Vec<Result<(PlayerId, TickPlan, Vec<PlanViolation>), SimError>> = brains
            .par_iter_mut()
            .map(|(id, brain)| -> Result<_, SimError> {
                let snapshot = world.snapshot(*id);
                let report = brain.plan_turn(&snapshot)?;
                let found = check_turn(&report, &snapshot);
                Ok((*id, report.plan, found))
            })
            .collect();

        let mut plans = Vec::with_capacity(results.len());
        for result in results {
            let (id, plan, found) = result?;
            for violation in found {
                warn!(turn, player = id, %violation, "plan check failed");
                violations.push((turn, violation));
            }
            plans.push((id, plan));
        }

        let outcome = world.apply(&plans);
        if outcome.collisions > 0 {
            debug!(turn, collisions = outcome.collisions, "agents destroyed");
        }
    }

    let players: Vec<PlayerResult> = world
        .players()
        .iter()
        .map(|p| PlayerResult {
            id: p.id,
            score: p.budget,
            deposited: p.deposited,
            agents: p.agents.len(),
            spawned: p.spawned,
            collisions: p.collisions,
        })
        .collect();

    let winner = players
        .iter()
        .max_by(|a, b| a.score.cmp(&b.score).then(b.id.cmp(&a.id)))
        .map(|p| p.id);

    Ok(SimResult {
        seed: sim.seed,
        turns_played: world.turn(),
        players,
        winner,
        violations,
    })
}

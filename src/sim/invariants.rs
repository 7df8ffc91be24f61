//! Plan invariants - sanity checks that detect scheduler bugs.
//!
//! A correct brain never trips these. They run after every planned tick in
//! simulated games and in the integration tests.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::game::{AgentId, Command, MAX_SPAWNS_PER_TICK, Position, Snapshot};
use crate::strategy::{AssignmentKind, TurnReport};

/// A broken plan invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    /// A live agent received no command.
    MissingCommand(AgentId),
    /// An agent received more than one command.
    DuplicateCommand(AgentId),
    /// A command names an agent the player does not own.
    UnknownAgent(AgentId),
    /// More spawns than allowed in one tick.
    TooManySpawns(usize),
    /// Two agents end the tick on the same cell outside the accepted cases.
    SharedDestination {
        /// The contested cell.
        position: Position,
        /// Agents committed to it.
        agents: Vec<AgentId>,
    },
    /// A spawn was issued while an agent ends the tick on the home cell.
    SpawnOnOccupiedHome(Position),
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand(id) => write!(f, "agent {id} has no command"),
            Self::DuplicateCommand(id) => write!(f, "agent {id} has more than one command"),
            Self::UnknownAgent(id) => write!(f, "command for unknown agent {id}"),
            Self::TooManySpawns(n) => {
                write!(f, "{n} spawns in one tick (maximum {MAX_SPAWNS_PER_TICK})")
            }
            Self::SharedDestination { position, agents } => {
                write!(f, "agents {agents:?} share destination {position}")
            }
            Self::SpawnOnOccupiedHome(position) => {
                write!(f, "spawn while an agent ends on home {position}")
            }
        }
    }
}

impl std::error::Error for PlanViolation {}

/// Check one planned tick against the snapshot it was planned from.
///
/// Returns every violation found, or empty if the plan is sound.
///
/// Two agents may share a destination only when one of them fell back to
/// staying put, or in the endgame on an own collection point.
#[must_use]
pub fn check_turn(report: &TurnReport, snapshot: &Snapshot) -> Vec<PlanViolation> {
    let mut violations = Vec::new();

    let owned: HashSet<AgentId> = snapshot
        .player(snapshot.me)
        .map(|p| p.agents.iter().map(|a| a.id).collect())
        .unwrap_or_default();

    // One command per live agent
    let mut counts: HashMap<AgentId, usize> = HashMap::new();
    for id in report.plan.commands.iter().filter_map(Command::agent) {
        *counts.entry(id).or_insert(0) += 1;
    }
    let mut seen: Vec<_> = counts.into_iter().collect();
    seen.sort_unstable();
    for &(id, count) in &seen {
        if !owned.contains(&id) {
            violations.push(PlanViolation::UnknownAgent(id));
        } else if count > 1 {
            violations.push(PlanViolation::DuplicateCommand(id));
        }
    }
    let mut missing: Vec<_> = owned
        .iter()
        .filter(|id| !seen.iter().any(|(s, _)| s == *id))
        .copied()
        .collect();
    missing.sort_unstable();
    violations.extend(missing.into_iter().map(PlanViolation::MissingCommand));

    let spawns = report
        .plan
        .commands
        .iter()
        .filter(|c| c.agent().is_none())
        .count();
    if spawns > MAX_SPAWNS_PER_TICK {
        violations.push(PlanViolation::TooManySpawns(spawns));
    }

    // Destinations. A converting agent leaves the board.
    let mut by_cell: HashMap<Position, Vec<(AgentId, AssignmentKind)>> = HashMap::new();
    for assignment in report
        .assignments
        .iter()
        .filter(|a| a.kind != AssignmentKind::Convert)
    {
        by_cell
            .entry(assignment.destination)
            .or_default()
            .push((assignment.agent, assignment.kind));
    }
    let mut shared: Vec<_> = by_cell
        .into_iter()
        .filter(|(_, committed)| committed.len() > 1)
        .collect();
    shared.sort_unstable_by_key(|(position, _)| *position);
    for (position, committed) in shared {
        let fallback = committed.iter().any(|(_, k)| *k == AssignmentKind::Fallback);
        let endgame_arrival =
            report.tick.is_endgame && report.tick.collection_points.contains(&position);
        if !fallback && !endgame_arrival {
            violations.push(PlanViolation::SharedDestination {
                position,
                agents: committed.into_iter().map(|(id, _)| id).collect(),
            });
        }
    }

    if spawns > 0
        && report
            .assignments
            .iter()
            .any(|a| a.kind != AssignmentKind::Convert && a.destination == report.tick.home)
    {
        violations.push(PlanViolation::SpawnOnOccupiedHome(report.tick.home));
    }

    violations
}

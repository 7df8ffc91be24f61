//! Movement scheduler: reservations, id-ordered commits and one-hop look-ahead.
//!
//! Agents are committed one at a time. Each commit reserves its destination,
//! so later agents route around it. Lower ids are processed first and win
//! contested cells.

use std::collections::HashMap;

use rand::Rng;
use tracing::debug;

use crate::game::{Agent, AgentId, Direction, Grid, Position, Status, StatusStore, TickContext};
use crate::strategy::{AgentPolicy, PlannedMove};

/// How an agent's move was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    /// Could not pay the move cost; stays put.
    Stuck,
    /// Chosen by the policy.
    Planned,
    /// The policy found no safe move; stays put regardless of safety.
    Fallback,
    /// Converts into a collection point.
    Convert,
}

/// A committed decision for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// The agent.
    pub agent: AgentId,
    /// Where it ends the tick.
    pub destination: Position,
    /// Step direction (`Still` for stuck, fallback and converting agents).
    pub direction: Direction,
    /// How the move was decided.
    pub kind: AssignmentKind,
}

/// Commits exactly one move per agent for the tick.
#[derive(Debug, Clone, Copy)]
pub struct MovementScheduler<'a> {
    policy: &'a AgentPolicy,
}

impl<'a> MovementScheduler<'a> {
    /// Create a scheduler driving `policy`.
    #[must_use]
    pub const fn new(policy: &'a AgentPolicy) -> Self {
        Self { policy }
    }

    /// Produce one assignment per agent, in commit order.
    ///
    /// 1. Every agent's status is updated.
    /// 2. `converting` (if any) is committed as a conversion.
    /// 3. Agents that cannot pay to move stay and reserve their cell.
    /// 4. The rest are processed in ascending id order. After each commit, if
    ///    the claimed cell is still occupied by a pending agent of ours, that
    ///    agent is swapped into the next slot so it moves while it still has
    ///    an exit.
    pub fn schedule<R: Rng + ?Sized>(
        &self,
        agents: &[Agent],
        converting: Option<AgentId>,
        statuses: &mut StatusStore,
        grid: &mut Grid,
        tick: &TickContext,
        rng: &mut R,
    ) -> Vec<Assignment> {
        let mut assignments = Vec::with_capacity(agents.len());
        let mut movable = Vec::with_capacity(agents.len());

        for agent in agents {
            let status = self
                .policy
                .transition(statuses.get(agent.id), agent, grid, tick);
            statuses.set(agent.id, status);

            if converting == Some(agent.id) {
                assignments.push(Assignment {
                    agent: agent.id,
                    destination: agent.position,
                    direction: Direction::Still,
                    kind: AssignmentKind::Convert,
                });
            } else if !self.policy.can_move(grid, agent) {
                grid.mark_unsafe(agent.position);
                assignments.push(Assignment {
                    agent: agent.id,
                    destination: agent.position,
                    direction: Direction::Still,
                    kind: AssignmentKind::Stuck,
                });
            } else {
                movable.push(*agent);
            }
        }

        movable.sort_by_key(|a| a.id);
        let mut queue = ProcessingQueue::new(movable);

        let mut slot = 0;
        while let Some(agent) = queue.get(slot) {
            let status = statuses.get(agent.id).unwrap_or(Status::Exploring);
            let (planned, kind) = match self.policy.choose_move(status, &agent, grid, tick, rng) {
                Ok(planned) => (planned, AssignmentKind::Planned),
                Err(e) => {
                    debug!(agent = agent.id, %e, "falling back to stay");
                    (PlannedMove::stay(agent.position), AssignmentKind::Fallback)
                }
            };

            grid.mark_unsafe(planned.destination);
            assignments.push(Assignment {
                agent: agent.id,
                destination: planned.destination,
                direction: planned.direction,
                kind,
            });

            let occupant = grid
                .cell_at(planned.destination)
                .occupant
                .filter(|o| o.owner == tick.player && o.agent != agent.id);
            if let Some(occupant) = occupant.filter(|o| queue.promote(o.agent, slot)) {
                debug!(agent = agent.id, promoted = occupant.agent, "look-ahead swap");
            }

            slot += 1;
        }

        assignments
    }
}

/// Id-sorted processing queue with an index map for O(1) slot lookup.
#[derive(Debug)]
struct ProcessingQueue {
    agents: Vec<Agent>,
    slots: HashMap<AgentId, usize>,
}

impl ProcessingQueue {
    fn new(agents: Vec<Agent>) -> Self {
        let slots = agents.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
        Self { agents, slots }
    }

    fn get(&self, slot: usize) -> Option<Agent> {
        self.agents.get(slot).copied()
    }

    /// Move a pending agent into the slot right after `current`.
    ///
    /// Only one hop: the promoted agent's own vacancy is not chased further.
    /// Returns whether a swap happened.
    fn promote(&mut self, id: AgentId, current: usize) -> bool {
        let next = current + 1;
        let Some(&slot) = self.slots.get(&id) else {
            return false;
        };
        if slot <= next {
            return false;
        }

        self.agents.swap(next, slot);
        self.slots.insert(self.agents[next].id, next);
        self.slots.insert(self.agents[slot].id, slot);
        true
    }

    #[cfg(test)]
    fn order(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Occupant, Structure, StructureKind};
    use crate::strategy::StrategyConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn setup(width: u16, height: u16, agents: &[Agent]) -> (Grid, TickContext) {
        let home = Position::new(0, 0);
        let mut grid = Grid::new(width, height).unwrap();
        grid.cell_at_mut(home).structure = Some(Structure {
            owner: 0,
            kind: StructureKind::Shipyard,
        });
        for a in agents {
            grid.cell_at_mut(a.position).occupant = Some(Occupant {
                owner: 0,
                agent: a.id,
            });
        }
        let tick = TickContext {
            player: 0,
            turn: 10,
            max_turns: 400,
            turns_left: 390,
            is_endgame: false,
            budget: 0,
            home,
            collection_points: vec![home],
        };
        (grid, tick)
    }

    #[test]
    fn test_queue_promote() {
        let agents: Vec<_> = [1, 2, 3, 4, 5]
            .iter()
            .map(|&id| Agent::new(id, 0, Position::new(0, 0), 0))
            .collect();
        let mut queue = ProcessingQueue::new(agents);

        assert!(queue.promote(4, 0));
        assert_eq!(queue.order(), vec![1, 4, 3, 2, 5]);
        // Already next
        assert!(!queue.promote(4, 0));
        // Already processed
        assert!(!queue.promote(1, 2));
        // Slot map stays consistent after the swap
        assert!(queue.promote(2, 1));
        assert_eq!(queue.order(), vec![1, 4, 2, 3, 5]);
    }

    #[test]
    fn test_one_assignment_per_agent() {
        let agents = [
            Agent::new(9, 0, Position::new(3, 3), 100),
            Agent::new(2, 0, Position::new(4, 3), 100),
            Agent::new(5, 0, Position::new(3, 4), 0),
        ];
        let (mut grid, tick) = setup(8, 8, &agents);
        grid.cell_at_mut(Position::new(3, 4)).resource = 100;

        let policy = AgentPolicy::new(StrategyConfig::default());
        let mut statuses = StatusStore::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let assignments = MovementScheduler::new(&policy).schedule(
            &agents,
            None,
            &mut statuses,
            &mut grid,
            &tick,
            &mut rng,
        );

        assert_eq!(assignments.len(), 3);
        // Stuck agents commit first, then ascending ids.
        let order: Vec<_> = assignments.iter().map(|a| a.agent).collect();
        assert_eq!(order, vec![5, 2, 9]);
        assert_eq!(assignments[0].kind, AssignmentKind::Stuck);
        assert_eq!(statuses.len(), 3);

        let mut destinations: Vec<_> = assignments.iter().map(|a| a.destination).collect();
        destinations.sort();
        destinations.dedup();
        assert_eq!(destinations.len(), 3);
    }

    #[test]
    fn test_converting_agent_is_committed() {
        let agents = [Agent::new(1, 0, Position::new(3, 3), 100)];
        let (mut grid, tick) = setup(8, 8, &agents);
        let policy = AgentPolicy::new(StrategyConfig::default());
        let mut statuses = StatusStore::new();
        let mut rng = SmallRng::seed_from_u64(3);

        let assignments = MovementScheduler::new(&policy).schedule(
            &agents,
            Some(1),
            &mut statuses,
            &mut grid,
            &tick,
            &mut rng,
        );
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].kind, AssignmentKind::Convert);
    }

    #[test]
    fn test_boxed_in_agent_falls_back() {
        let agents = [Agent::new(1, 0, Position::new(3, 3), 100)];
        let (mut grid, tick) = setup(8, 8, &agents);
        grid.mark_unsafe(Position::new(3, 3));
        for (_, p) in grid.adjacent(Position::new(3, 3)) {
            grid.mark_unsafe(p);
        }

        let policy = AgentPolicy::new(StrategyConfig::default());
        let mut statuses = StatusStore::new();
        statuses.set(1, Status::Returning);
        let mut rng = SmallRng::seed_from_u64(3);

        let assignments = MovementScheduler::new(&policy).schedule(
            &agents,
            None,
            &mut statuses,
            &mut grid,
            &tick,
            &mut rng,
        );
        assert_eq!(assignments[0].kind, AssignmentKind::Fallback);
        assert_eq!(assignments[0].destination, Position::new(3, 3));
        assert_eq!(assignments[0].direction, Direction::Still);
    }
}

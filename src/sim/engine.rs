//! Game rules for simulated play: movement, extraction, collisions, deposits.

// Bonus extraction scales an integer amount by a float multiplier
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::collections::{HashMap, HashSet};

use crate::game::{
    AgentId, AgentSnapshot, Command, Direction, Grid, PlayerId, PlayerSnapshot, Position,
    Snapshot, Structure, StructureKind, TickPlan,
};
use crate::strategy::StrategyConfig;

/// A player's side of the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// Player identifier.
    pub id: PlayerId,
    /// Resource available for spawning and conversion.
    pub budget: u32,
    /// Home collection point.
    pub shipyard: Position,
    /// Auxiliary collection points.
    pub dropoffs: Vec<Position>,
    /// Live agents.
    pub agents: Vec<AgentSnapshot>,
    /// Total resource delivered.
    pub deposited: u64,
    /// Agents produced so far.
    pub spawned: u32,
    /// Agents lost to collisions so far.
    pub collisions: u32,
}

impl PlayerState {
    /// A player with no agents.
    #[must_use]
    pub fn new(id: PlayerId, shipyard: Position, budget: u32) -> Self {
        Self {
            id,
            budget,
            shipyard,
            dropoffs: Vec::new(),
            agents: Vec::new(),
            deposited: 0,
            spawned: 0,
            collisions: 0,
        }
    }
}

/// What happened while applying one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Agents destroyed by collisions.
    pub collisions: u32,
    /// Resource delivered to collection points.
    pub deposited: u64,
    /// Agents produced.
    pub spawned: u32,
    /// Agents converted into collection points.
    pub converted: u32,
}

/// Authoritative world state for a simulated game.
#[derive(Debug, Clone)]
pub struct World {
    grid: Grid,
    players: Vec<PlayerState>,
    turn: u32,
    max_turns: u32,
    next_agent: AgentId,
    rules: StrategyConfig,
}

impl World {
    /// Create a world at turn 0. `rules` supplies costs and extraction rates.
    #[must_use]
    pub fn new(grid: Grid, players: Vec<PlayerState>, max_turns: u32, rules: StrategyConfig) -> Self {
        Self {
            grid,
            players,
            turn: 0,
            max_turns,
            next_agent: 0,
            rules,
        }
    }

    /// Current turn index.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Whether every turn has been played.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.turn >= self.max_turns
    }

    /// Players in id order.
    #[must_use]
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Ids of every player.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    /// The world as seen by `me`.
    #[must_use]
    pub fn snapshot(&self, me: PlayerId) -> Snapshot {
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            resource: self.grid.cells().iter().map(|c| c.resource).collect(),
            me,
            turn: self.turn,
            max_turns: self.max_turns,
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    budget: p.budget,
                    shipyard: p.shipyard,
                    dropoffs: p.dropoffs.clone(),
                    agents: p.agents.clone(),
                })
                .collect(),
        }
    }

    /// Apply every player's plan and advance one turn.
    ///
    /// Plans are applied in player id order. Commands naming agents the
    /// player does not own are ignored, as are moves the agent cannot pay for.
    pub fn apply(&mut self, plans: &[(PlayerId, TickPlan)]) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let mut ordered: Vec<&(PlayerId, TickPlan)> = plans.iter().collect();
        ordered.sort_by_key(|(id, _)| *id);

        let mut moved: HashSet<AgentId> = HashSet::new();
        let mut fresh: HashSet<AgentId> = HashSet::new();
        for (player, plan) in ordered {
            let Some(index) = self.players.iter().position(|p| p.id == *player) else {
                continue;
            };
            for command in &plan.commands {
                match *command {
                    Command::Move { agent, direction } => {
                        if self.move_agent(index, agent, direction) {
                            moved.insert(agent);
                        }
                    }
                    Command::MakeDropoff { agent } => {
                        if self.convert_agent(index, agent) {
                            outcome.converted += 1;
                        }
                    }
                    Command::Spawn => {
                        if let Some(agent) = self.spawn_agent(index) {
                            fresh.insert(agent);
                            outcome.spawned += 1;
                        }
                    }
                }
            }
        }

        self.extract(&moved, &fresh);
        outcome.collisions = self.resolve_collisions();
        outcome.deposited = self.deposit();
        self.turn += 1;
        outcome
    }

    fn move_agent(&mut self, index: usize, id: AgentId, direction: Direction) -> bool {
        if direction == Direction::Still {
            return false;
        }
        let ratio = self.rules.move_cost_ratio.max(1);
        let grid = &self.grid;
        let Some(agent) = self.players[index].agents.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        let cost = grid.cell_at(agent.position).resource / ratio;
        if agent.carried < cost {
            return false;
        }
        agent.carried -= cost;
        agent.position = grid.normalize(agent.position.offset(direction));
        true
    }

    fn convert_agent(&mut self, index: usize, id: AgentId) -> bool {
        let player = &mut self.players[index];
        let Some(slot) = player.agents.iter().position(|a| a.id == id) else {
            return false;
        };
        let agent = player.agents[slot];
        let cell = self.grid.cell_at_mut(agent.position);
        if cell.structure.is_some() {
            return false;
        }
        let cost = self
            .rules
            .dropoff_cost
            .saturating_sub(agent.carried.saturating_add(cell.resource));
        if player.budget < cost {
            return false;
        }

        player.budget -= cost;
        cell.resource = 0;
        cell.structure = Some(Structure {
            owner: player.id,
            kind: StructureKind::Dropoff,
        });
        player.dropoffs.push(agent.position);
        player.agents.swap_remove(slot);
        true
    }

    fn spawn_agent(&mut self, index: usize) -> Option<AgentId> {
        let player = &mut self.players[index];
        if player.budget < self.rules.spawn_cost {
            return None;
        }
        player.budget -= self.rules.spawn_cost;
        player.spawned += 1;

        let id = self.next_agent;
        self.next_agent += 1;
        player.agents.push(AgentSnapshot {
            id,
            position: player.shipyard,
            carried: 0,
        });
        Some(id)
    }

    /// Agents that neither moved nor were just produced mine their cell.
    fn extract(&mut self, moved: &HashSet<AgentId>, fresh: &HashSet<AgentId>) {
        let inspired = self.inspired_agents();
        let ratio = self.rules.extract_ratio.max(1);
        let max_carry = self.rules.max_carry;
        let bonus = self.rules.inspired_bonus_multiplier;

        for player in &mut self.players {
            for agent in &mut player.agents {
                if moved.contains(&agent.id) || fresh.contains(&agent.id) {
                    continue;
                }
                let cell = self.grid.cell_at_mut(agent.position);
                let room = max_carry.saturating_sub(agent.carried);
                let mined = cell.resource.div_ceil(ratio).min(room);
                cell.resource -= mined;
                agent.carried += mined;

                if inspired.contains(&agent.id) {
                    let extra = (f64::from(mined) * bonus) as u32;
                    agent.carried += extra.min(max_carry.saturating_sub(agent.carried));
                }
            }
        }
    }

    /// Agents with enough opponents within the inspiration radius.
    fn inspired_agents(&self) -> HashSet<AgentId> {
        let mut inspired = HashSet::new();
        if !self.rules.inspiration_enabled || self.rules.inspiration_ship_count == 0 {
            return inspired;
        }
        let radius = u32::from(self.rules.inspiration_radius);
        let needed = usize::from(self.rules.inspiration_ship_count);

        for player in &self.players {
            for agent in &player.agents {
                let nearby = self
                    .players
                    .iter()
                    .filter(|other| other.id != player.id)
                    .flat_map(|other| &other.agents)
                    .filter(|other| self.grid.distance(agent.position, other.position) <= radius)
                    .count();
                if nearby >= needed {
                    inspired.insert(agent.id);
                }
            }
        }
        inspired
    }

    /// Destroy every agent sharing a cell. Cargo lands on the cell, or with the
    /// owner of a structure standing there.
    fn resolve_collisions(&mut self) -> u32 {
        let mut cells: HashMap<Position, u32> = HashMap::new();
        for agent in self.players.iter().flat_map(|p| &p.agents) {
            *cells.entry(agent.position).or_insert(0) += 1;
        }
        let crowded: HashSet<Position> = cells
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(position, _)| position)
            .collect();
        if crowded.is_empty() {
            return 0;
        }

        let mut destroyed = 0;
        let mut spilled: Vec<(Position, u32)> = Vec::new();
        for player in &mut self.players {
            let before = player.agents.len();
            player.agents.retain(|a| {
                if crowded.contains(&a.position) {
                    spilled.push((a.position, a.carried));
                    false
                } else {
                    true
                }
            });
            let lost = (before - player.agents.len()) as u32;
            player.collisions += lost;
            destroyed += lost;
        }

        for (position, cargo) in spilled {
            let owner = self.grid.cell_at(position).structure.map(|s| s.owner);
            match owner.and_then(|id| self.players.iter_mut().find(|p| p.id == id)) {
                Some(player) => {
                    player.budget = player.budget.saturating_add(cargo);
                    player.deposited += u64::from(cargo);
                }
                None => {
                    let cell = self.grid.cell_at_mut(position);
                    cell.resource = cell.resource.saturating_add(cargo);
                }
            }
        }

        destroyed
    }

    /// Agents on one of their own collection points unload.
    fn deposit(&mut self) -> u64 {
        let mut total = 0;
        for player in &mut self.players {
            let mut delivered = 0u64;
            for agent in &mut player.agents {
                if agent.carried > 0
                    && (player.shipyard == agent.position || player.dropoffs.contains(&agent.position))
                {
                    delivered += u64::from(agent.carried);
                    agent.carried = 0;
                }
            }
            player.budget = player
                .budget
                .saturating_add(u32::try_from(delivered).unwrap_or(u32::MAX));
            player.deposited += delivered;
            total += delivered;
        }
        total
    }
}

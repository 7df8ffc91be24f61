//! World snapshot supplied by the host each tick, and the derived tick context.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::game::{
    Agent, AgentId, Cell, Grid, Occupant, PlayerId, Position, Structure, StructureKind,
};

/// An agent as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Unique identifier.
    pub id: AgentId,
    /// Current position.
    pub position: Position,
    /// Resource carried.
    #[serde(default)]
    pub carried: u32,
}

/// One player's view in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player identifier.
    pub id: PlayerId,
    /// Resource available for spawning and conversion.
    #[serde(default)]
    pub budget: u32,
    /// Home collection point.
    pub shipyard: Position,
    /// Auxiliary collection points.
    #[serde(default)]
    pub dropoffs: Vec<Position>,
    /// Live agents.
    #[serde(default)]
    pub agents: Vec<AgentSnapshot>,
}

impl PlayerSnapshot {
    /// Shipyard first, then dropoffs in snapshot order.
    pub fn collection_points(&self) -> impl Iterator<Item = Position> + '_ {
        std::iter::once(self.shipyard).chain(self.dropoffs.iter().copied())
    }
}

/// Everything the strategy needs to know about the world for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Grid width.
    pub width: u16,
    /// Grid height.
    pub height: u16,
    /// Resource per cell, row-major.
    pub resource: Vec<u32>,
    /// The acting player.
    pub me: PlayerId,
    /// Current turn index (0-based).
    pub turn: u32,
    /// Total number of turns in the game.
    pub max_turns: u32,
    /// Every player, including `me`.
    pub players: Vec<PlayerSnapshot>,
}

impl Snapshot {
    /// Check structural consistency.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let expected = usize::from(self.width) * usize::from(self.height);
        if self.resource.len() != expected {
            return Err(SnapshotError::ResourceLength {
                expected,
                actual: self.resource.len(),
            });
        }

        if self.player(self.me).is_none() {
            return Err(SnapshotError::UnknownPlayer(self.me));
        }

        let mut seen = HashSet::new();
        for agent in self.players.iter().flat_map(|p| &p.agents) {
            if !seen.insert(agent.id) {
                return Err(SnapshotError::DuplicateAgent(agent.id));
            }
        }

        Ok(())
    }

    /// Look up a player by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The acting player.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownPlayer`] if `me` is not listed.
    pub fn me(&self) -> Result<&PlayerSnapshot, SnapshotError> {
        self.player(self.me)
            .ok_or(SnapshotError::UnknownPlayer(self.me))
    }

    /// Build the grid with resources, occupants and structures. Flags start clear.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot fails [`Snapshot::validate`].
    pub fn build_grid(&self) -> Result<Grid, SnapshotError> {
        self.validate()?;
        let mut grid =
            Grid::new(self.width, self.height).ok_or(SnapshotError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;

        // Row-major order matches the grid layout.
        let width = i32::from(self.width);
        for (idx, &amount) in (0i32..).zip(&self.resource) {
            *grid.cell_at_mut(Position::new(idx % width, idx / width)) = Cell::new(amount);
        }

        for player in &self.players {
            grid.cell_at_mut(player.shipyard).structure = Some(Structure {
                owner: player.id,
                kind: StructureKind::Shipyard,
            });
            for &dropoff in &player.dropoffs {
                grid.cell_at_mut(dropoff).structure = Some(Structure {
                    owner: player.id,
                    kind: StructureKind::Dropoff,
                });
            }
            for agent in &player.agents {
                grid.cell_at_mut(agent.position).occupant = Some(Occupant {
                    owner: player.id,
                    agent: agent.id,
                });
            }
        }

        Ok(grid)
    }

    /// Agents owned by `player`, positions normalized.
    #[must_use]
    pub fn agents_of(&self, player: PlayerId, grid: &Grid) -> Vec<Agent> {
        self.player(player)
            .map(|p| {
                p.agents
                    .iter()
                    .map(|a| Agent::new(a.id, player, grid.normalize(a.position), a.carried))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Positions of every agent not owned by `me`, normalized.
    #[must_use]
    pub fn opponent_positions(&self, grid: &Grid) -> Vec<Position> {
        self.players
            .iter()
            .filter(|p| p.id != self.me)
            .flat_map(|p| p.agents.iter().map(|a| grid.normalize(a.position)))
            .collect()
    }
}

/// Per-tick facts derived from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickContext {
    /// The acting player.
    pub player: PlayerId,
    /// Current turn index.
    pub turn: u32,
    /// Total turn budget.
    pub max_turns: u32,
    /// `max_turns - turn`, saturating.
    pub turns_left: u32,
    /// Remaining turns are too few to bring the whole fleet home.
    pub is_endgame: bool,
    /// Resource available to the player.
    pub budget: u32,
    /// Home collection point.
    pub home: Position,
    /// Every own collection point, home first.
    pub collection_points: Vec<Position>,
}

impl TickContext {
    /// Derive the context for `me` from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownPlayer`] if `me` is not listed.
    pub fn from_snapshot(snapshot: &Snapshot, grid: &Grid) -> Result<Self, SnapshotError> {
        let me = snapshot.me()?;
        let collection_points: Vec<Position> =
            me.collection_points().map(|p| grid.normalize(p)).collect();
        let turns_left = snapshot.max_turns.saturating_sub(snapshot.turn);

        Ok(Self {
            player: me.id,
            turn: snapshot.turn,
            max_turns: snapshot.max_turns,
            turns_left,
            is_endgame: is_endgame(me.agents.len(), collection_points.len(), turns_left),
            budget: me.budget,
            home: grid.normalize(me.shipyard),
            collection_points,
        })
    }
}

/// Whether `turns_left` is too few to bring `fleet` agents home through
/// `collection_points` drop sites, one arrival per site per turn.
#[must_use]
pub fn is_endgame(fleet: usize, collection_points: usize, turns_left: u32) -> bool {
    if collection_points == 0 {
        return false;
    }
    let turns_to_bring_home = fleet / collection_points;
    u64::try_from(turns_to_bring_home).unwrap_or(u64::MAX) >= u64::from(turns_left)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            width: 4,
            height: 3,
            resource: (0..12).collect(),
            me: 0,
            turn: 10,
            max_turns: 100,
            players: vec![
                PlayerSnapshot {
                    id: 0,
                    budget: 5000,
                    shipyard: Position::new(1, 1),
                    dropoffs: vec![Position::new(3, 2)],
                    agents: vec![AgentSnapshot {
                        id: 4,
                        position: Position::new(2, 1),
                        carried: 30,
                    }],
                },
                PlayerSnapshot {
                    id: 1,
                    budget: 0,
                    shipyard: Position::new(3, 0),
                    dropoffs: Vec::new(),
                    agents: vec![AgentSnapshot {
                        id: 5,
                        position: Position::new(0, 2),
                        carried: 0,
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_build_grid_row_major() {
        let grid = snapshot().build_grid().unwrap();
        assert_eq!(grid.cell_at(Position::new(0, 0)).resource, 0);
        assert_eq!(grid.cell_at(Position::new(3, 0)).resource, 3);
        assert_eq!(grid.cell_at(Position::new(1, 2)).resource, 9);
    }

    #[test]
    fn test_build_grid_structures_and_occupants() {
        let grid = snapshot().build_grid().unwrap();
        assert!(grid.cell_at(Position::new(1, 1)).is_collection_point_of(0));
        assert!(grid.cell_at(Position::new(3, 2)).is_collection_point_of(0));
        assert!(!grid.cell_at(Position::new(3, 0)).is_collection_point_of(0));
        assert_eq!(
            grid.cell_at(Position::new(2, 1)).occupant,
            Some(Occupant { owner: 0, agent: 4 })
        );
    }

    #[test]
    fn test_validate_resource_length() {
        let mut snap = snapshot();
        snap.resource.pop();
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::ResourceLength {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_validate_duplicate_agent() {
        let mut snap = snapshot();
        snap.players[1].agents[0].id = 4;
        assert_eq!(snap.validate(), Err(SnapshotError::DuplicateAgent(4)));
    }

    #[test]
    fn test_validate_unknown_me() {
        let mut snap = snapshot();
        snap.me = 9;
        assert_eq!(snap.validate(), Err(SnapshotError::UnknownPlayer(9)));
    }

    #[test]
    fn test_tick_context() {
        let snap = snapshot();
        let grid = snap.build_grid().unwrap();
        let tick = TickContext::from_snapshot(&snap, &grid).unwrap();
        assert_eq!(tick.turns_left, 90);
        assert!(!tick.is_endgame);
        assert_eq!(
            tick.collection_points,
            vec![Position::new(1, 1), Position::new(3, 2)]
        );
    }

    #[test]
    fn test_is_endgame() {
        assert!(is_endgame(10, 2, 5));
        assert!(!is_endgame(10, 2, 6));
        assert!(is_endgame(0, 1, 0));
        assert!(!is_endgame(10, 0, 1));
    }

    #[test]
    fn test_snapshot_json() {
        let json = r#"{
            "width": 2, "height": 1, "resource": [5, 6], "me": 0,
            "turn": 0, "max_turns": 10,
            "players": [{"id": 0, "shipyard": {"x": 0, "y": 0}}]
        }"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snap.validate().is_ok());
        assert!(snap.players[0].agents.is_empty());
    }
}

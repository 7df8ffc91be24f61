//! Agents and their persistent behavioral status.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Position;

/// Unique, stable identifier for an agent, assigned by the host engine.
pub type AgentId = u32;

/// Identifier for a player.
pub type PlayerId = u8;

/// Behavioral state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Harvesting the resource field.
    Exploring,
    /// Heading to the nearest collection point.
    Returning,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Exploring => write!(f, "exploring"),
            Status::Returning => write!(f, "returning"),
        }
    }
}

/// A live agent as seen in this tick's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Owning player.
    pub owner: PlayerId,
    /// Current position (normalized).
    pub position: Position,
    /// Resource carried.
    pub carried: u32,
}

impl Agent {
    /// Create a new agent.
    #[must_use]
    pub const fn new(id: AgentId, owner: PlayerId, position: Position, carried: u32) -> Self {
        Self {
            id,
            owner,
            position,
            carried,
        }
    }
}

/// Session-scoped status per agent id.
///
/// Entries are created on first sight, changed only by the policy's
/// transition rule, and pruned for agents that no longer appear.
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    statuses: HashMap<AgentId, Status>,
}

impl StatusStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status recorded for `id`, if the agent has been seen before.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<Status> {
        self.statuses.get(&id).copied()
    }

    /// Record the status for `id`.
    pub fn set(&mut self, id: AgentId, status: Status) {
        self.statuses.insert(id, status);
    }

    /// Drop entries for agents not in `live`.
    pub fn retain_live(&mut self, live: &HashSet<AgentId>) {
        self.statuses.retain(|id, _| live.contains(id));
    }

    /// Number of tracked agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether no agent is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_store_lazy() {
        let mut store = StatusStore::new();
        assert!(store.get(7).is_none());

        store.set(7, Status::Returning);
        assert_eq!(store.get(7), Some(Status::Returning));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_status_store_retain_live() {
        let mut store = StatusStore::new();
        store.set(1, Status::Exploring);
        store.set(2, Status::Returning);
        store.set(3, Status::Exploring);

        store.retain_live(&HashSet::from([2, 3, 9]));
        assert!(store.get(1).is_none());
        assert_eq!(store.get(2), Some(Status::Returning));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Exploring.to_string(), "exploring");
        assert_eq!(Status::Returning.to_string(), "returning");
    }
}

//! Commands handed back to the host each tick.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{AgentId, Direction};

/// Maximum number of spawn commands per tick.
pub const MAX_SPAWNS_PER_TICK: usize = 1;

/// A single instruction for the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Move an agent one step (or keep it still).
    Move {
        /// The agent to move.
        agent: AgentId,
        /// Step direction.
        direction: Direction,
    },
    /// Convert an agent into a collection point.
    MakeDropoff {
        /// The converting agent.
        agent: AgentId,
    },
    /// Produce a new agent at the home collection point.
    Spawn,
}

impl Command {
    /// The agent this command is bound to, if any.
    #[must_use]
    pub const fn agent(&self) -> Option<AgentId> {
        match self {
            Command::Move { agent, .. } | Command::MakeDropoff { agent } => Some(*agent),
            Command::Spawn => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { agent, direction } => write!(f, "m {agent} {direction}"),
            Command::MakeDropoff { agent } => write!(f, "c {agent}"),
            Command::Spawn => write!(f, "g"),
        }
    }
}

/// The committed command list for one tick.
///
/// Holds one command per live agent in commit order, plus at most one spawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickPlan {
    /// Commands in commit order.
    pub commands: Vec<Command>,
}

impl TickPlan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Commands bound to an agent, in commit order.
    pub fn agent_commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| c.agent().is_some())
    }

    /// Whether the plan spawns a new agent.
    #[must_use]
    pub fn spawns(&self) -> bool {
        self.commands.contains(&Command::Spawn)
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Space-separated wire form, e.g. `m 3 e m 4 o g`.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let mut plan = TickPlan::new();
        plan.push(Command::Move {
            agent: 3,
            direction: Direction::East,
        });
        plan.push(Command::Move {
            agent: 4,
            direction: Direction::Still,
        });
        plan.push(Command::MakeDropoff { agent: 9 });
        plan.push(Command::Spawn);

        assert_eq!(plan.to_wire(), "m 3 e m 4 o c 9 g");
        assert!(plan.spawns());
        assert_eq!(plan.agent_commands().count(), 3);
    }

    #[test]
    fn test_command_json() {
        let cmd = Command::Move {
            agent: 1,
            direction: Direction::North,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"type":"move","agent":1,"direction":"north"}"#);
    }

    #[test]
    fn test_empty_plan() {
        let plan = TickPlan::new();
        assert!(plan.is_empty());
        assert!(!plan.spawns());
        assert_eq!(plan.to_wire(), "");
    }
}

//! World model for the strategy engine.
//!
//! - Toroidal grid with per-tick reservation and inspiration flags
//! - Agents and their persistent status
//! - The host snapshot and the derived tick context
//! - Commands returned to the host

mod command;
mod fleet;
mod map;
mod snapshot;

pub use command::{Command, MAX_SPAWNS_PER_TICK, TickPlan};
pub use fleet::{Agent, AgentId, PlayerId, Status, StatusStore};
pub use map::{Cell, Direction, Grid, Occupant, Position, Structure, StructureKind};
pub use snapshot::{AgentSnapshot, PlayerSnapshot, Snapshot, TickContext, is_endgame};

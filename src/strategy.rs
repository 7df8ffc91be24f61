//! Harvesting strategy.
//!
//! Implements the per-tick decision pipeline on top of the world model:
//! - Inspiration marking and resource-gradient scoring
//! - Exploring / returning behavior policy
//! - Reservation-based movement scheduling
//! - Spawning and collection-point conversion

mod brain;
mod config;
mod policy;
mod scheduler;
mod scorer;
mod spawn;

pub use brain::{Brain, TurnReport};
pub use config::StrategyConfig;
pub use policy::{AgentPolicy, PlannedMove, nearest_collection_point};
pub use scheduler::{Assignment, AssignmentKind, MovementScheduler};
pub use scorer::ResourceFieldScorer;
pub use spawn::SpawnController;

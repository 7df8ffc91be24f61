// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Forager: a per-tick decision engine for a harvesting fleet on a toroidal grid.
//!
//! Each tick the engine turns a world [`Snapshot`] into a [`TickPlan`]:
//! - Exactly one move (possibly "stay") per agent
//! - No two agents committed to the same cell
//! - Greedy resource harvesting, with an endgame rush back to collection points
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI (decide / simulate / batch)   │
//! ├─────────────────────────────────────┤
//! │   Simulation harness (sim)          │
//! ├─────────────────────────────────────┤
//! │   Strategy (scorer, policy,         │
//! │   scheduler, spawn, brain)          │
//! ├─────────────────────────────────────┤
//! │   World model (grid, fleet,         │
//! │   snapshot, commands)               │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod sim;
pub mod strategy;

pub use error::{ConfigError, MoveResult, NoSafeMove, SnapshotError};

// Re-export key types at crate root for convenience
pub use game::{Command, Direction, Grid, Position, Snapshot, TickPlan};
pub use strategy::{Brain, StrategyConfig};

//! Error types for the strategy engine.

use std::fmt;
use std::io;

use crate::game::{AgentId, PlayerId, Position};

/// An agent has no unreserved cell to move into.
///
/// Always recovered locally: the scheduler substitutes a stationary move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSafeMove {
    /// Position of the boxed-in agent.
    pub position: Position,
}

impl fmt::Display for NoSafeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no safe move from ({}, {})", self.position.x, self.position.y)
    }
}

impl std::error::Error for NoSafeMove {}

/// Result type for move selection.
pub type MoveResult<T> = Result<T, NoSafeMove>;

/// Invalid world snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    /// Width or height is zero.
    InvalidDimensions {
        /// Declared width.
        width: u16,
        /// Declared height.
        height: u16,
    },
    /// The resource field does not cover the grid.
    ResourceLength {
        /// `width * height`.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// The acting player is not listed.
    UnknownPlayer(PlayerId),
    /// The same agent id appears more than once.
    DuplicateAgent(AgentId),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::InvalidDimensions { width, height } => {
                write!(f, "invalid grid dimensions {width}x{height}")
            }
            SnapshotError::ResourceLength { expected, actual } => {
                write!(f, "resource field has {actual} cells, expected {expected}")
            }
            SnapshotError::UnknownPlayer(id) => write!(f, "unknown player {id}"),
            SnapshotError::DuplicateAgent(id) => write!(f, "duplicate agent id {id}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Failure to load or validate a strategy configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(io::Error),
    /// The file is not valid JSON for the config schema.
    Parse(serde_json::Error),
    /// A field holds a value outside its valid range.
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_safe_move_display() {
        let err = NoSafeMove {
            position: Position::new(3, 4),
        };
        assert_eq!(err.to_string(), "no safe move from (3, 4)");
    }

    #[test]
    fn test_snapshot_error_display() {
        let err = SnapshotError::ResourceLength {
            expected: 25,
            actual: 24,
        };
        assert!(err.to_string().contains("24"));
        assert!(err.to_string().contains("25"));
    }

    #[test]
    fn test_config_error_source() {
        let err = ConfigError::Invalid {
            field: "spawn_cutoff",
            reason: "must be within 0..=1".to_string(),
        };
        assert!(std::error::Error::source(&err).is_none());
        assert!(err.to_string().contains("spawn_cutoff"));
    }
}

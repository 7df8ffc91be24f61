//! Strategy tuning constants.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the harvesting strategy.
///
/// Every field has a default, so a JSON file only needs the overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Maximum resource an agent can carry.
    pub max_carry: u32,
    /// Fraction of `max_carry` at which an agent heads home.
    pub return_fraction: f64,
    /// Radius of the square window scanned for resource pull.
    pub scan_radius: u16,
    /// Whether opponent density grants the inspiration bonus.
    pub inspiration_enabled: bool,
    /// Manhattan radius within which opponents count toward inspiration.
    pub inspiration_radius: u16,
    /// Opponents needed within the radius to inspire a cell.
    pub inspiration_ship_count: u16,
    /// Extra yield on inspired cells (value is scaled by `1 + bonus`).
    pub inspired_bonus_multiplier: f64,
    /// Moving off a cell costs `resource / move_cost_ratio`.
    pub move_cost_ratio: u32,
    /// Cost of producing an agent.
    pub spawn_cost: u32,
    /// Fraction of the turn budget after which no agent is produced.
    pub spawn_cutoff: f64,
    /// Whether agents may convert into collection points.
    pub dropoffs_enabled: bool,
    /// Cost of converting an agent into a collection point.
    pub dropoff_cost: u32,
    /// Minimum distance to the nearest collection point for a conversion,
    /// as a fraction of the grid width.
    pub dropoff_distance_fraction: f64,
    /// Staying still extracts `ceil(resource / extract_ratio)`.
    pub extract_ratio: u32,
    /// Seed for random tie breaks.
    pub seed: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            max_carry: 1000,
            return_fraction: 0.8,
            scan_radius: 10,
            inspiration_enabled: true,
            inspiration_radius: 4,
            inspiration_ship_count: 2,
            inspired_bonus_multiplier: 2.0,
            move_cost_ratio: 10,
            spawn_cost: 1000,
            spawn_cutoff: 0.5,
            dropoffs_enabled: false,
            dropoff_cost: 4000,
            dropoff_distance_fraction: 0.5,
            extract_ratio: 4,
            seed: 0,
        }
    }
}

impl StrategyConfig {
    /// Load a config from a JSON file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the strategy arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("return_fraction", self.return_fraction),
            ("spawn_cutoff", self.spawn_cutoff),
            ("dropoff_distance_fraction", self.dropoff_distance_fraction),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not within 0..=1"),
                });
            }
        }

        if self.inspired_bonus_multiplier < 0.0 || !self.inspired_bonus_multiplier.is_finite() {
            return Err(ConfigError::Invalid {
                field: "inspired_bonus_multiplier",
                reason: format!("{} must be finite and >= 0", self.inspired_bonus_multiplier),
            });
        }

        let ratios = [
            ("move_cost_ratio", self.move_cost_ratio),
            ("extract_ratio", self.extract_ratio),
            ("max_carry", self.max_carry),
        ];
        for (field, value) in ratios {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Carried amount at which an agent turns home.
    #[must_use]
    pub fn return_amount(&self) -> f64 {
        f64::from(self.max_carry) * self.return_fraction
    }

    /// Turn index from which spawning stops.
    #[must_use]
    pub fn spawn_cutoff_turn(&self, max_turns: u32) -> f64 {
        f64::from(max_turns) * self.spawn_cutoff
    }

    /// Multiplier applied to inspired cells.
    #[must_use]
    pub fn inspiration_factor(&self) -> f64 {
        1.0 + self.inspired_bonus_multiplier
    }
}

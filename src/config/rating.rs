//! Rating engine configuration

use crate::error::{RatingError, RatingResult};
use serde::{Deserialize, Serialize};

/// Constants that drive every rating update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Mean given to a participant on first sight
    pub start_mean: f64,
    /// Deviation given to a participant on first sight
    pub start_deviation: f64,
    /// Expected single-match performance noise (beta squared)
    pub performance_variance: f64,
    /// Smallest deviation a rating can approach
    pub deviation_floor: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            start_mean: 25.0,
            start_deviation: 3.0,
            // beta = start_deviation / 2
            performance_variance: 2.25,
            deviation_floor: 0.5,
        }
    }
}

impl RatingConfig {
    /// Ratings move slowly; suited to long-running leagues
    pub fn conservative() -> Self {
        Self {
            performance_variance: 4.0,
            deviation_floor: 0.75,
            ..Self::default()
        }
    }

    /// Ratings move quickly; suited to short seasons
    pub fn aggressive() -> Self {
        Self {
            performance_variance: 1.0,
            deviation_floor: 0.25,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> RatingResult<()> {
        let fields = [
            ("start_mean", self.start_mean),
            ("start_deviation", self.start_deviation),
            ("performance_variance", self.performance_variance),
            ("deviation_floor", self.deviation_floor),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(RatingError::ConfigurationError {
                message: format!("{} must be finite", name),
            });
        }

        if self.start_deviation <= 0.0 {
            return Err(RatingError::ConfigurationError {
                message: "Start deviation must be positive".to_string(),
            });
        }

        if self.performance_variance <= 0.0 {
            return Err(RatingError::ConfigurationError {
                message: "Performance variance must be positive".to_string(),
            });
        }

        if self.deviation_floor <= 0.0 {
            return Err(RatingError::ConfigurationError {
                message: "Deviation floor must be positive".to_string(),
            });
        }

        if self.deviation_floor >= self.start_deviation {
            return Err(RatingError::ConfigurationError {
                message: format!(
                    "Deviation floor ({}) must be below start deviation ({})",
                    self.deviation_floor, self.start_deviation
                ),
            });
        }

        Ok(())
    }
}

use crate::error::{AnalyzerError, Result};
use serde::Serialize;

pub const DEFAULT_GOAL: f64 = 2100.0;
pub const DEFAULT_TARGET_FRACTION: f64 = 0.8;
pub const DEFAULT_REBOUND_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisConfig {
    /// Daily calorie goal (kcal).
    pub goal: f64,
    /// A day counts toward a trend when intake is below `target_fraction * goal`.
    pub target_fraction: f64,
    /// Rebound size quoted in the weekly summary, as a fraction of the goal.
    pub rebound_fraction: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            goal: DEFAULT_GOAL,
            target_fraction: DEFAULT_TARGET_FRACTION,
            rebound_fraction: DEFAULT_REBOUND_FRACTION,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.goal.is_finite() || self.goal <= 0.0 {
            return Err(AnalyzerError::InvalidConfig(format!(
                "goal must be a positive number, got {}",
                self.goal
            )));
        }
        check_fraction("target fraction", self.target_fraction)?;
        check_fraction("rebound fraction", self.rebound_fraction)?;
        Ok(())
    }

    pub fn target_calories(&self) -> f64 {
        self.target_fraction * self.goal
    }
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(AnalyzerError::InvalidConfig(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )))
    }
}

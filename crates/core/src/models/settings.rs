use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Tuning knobs of the XIRR root finders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Lower end of the Brent bracket (must stay above -1)
    pub lower_bound: f64,
    /// Upper end of the Brent bracket
    pub upper_bound: f64,
    /// Absolute tolerance on the rate for Brent's method
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Starting rate of the secant fallback
    pub secant_seed: f64,
    pub secant_max_iterations: u32,
    /// Step size below which the secant iteration counts as converged
    pub secant_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lower_bound: -0.999_999_9,
            upper_bound: 1_000_000.0,
            tolerance: 2e-12,
            max_iterations: 200,
            secant_seed: 0.1,
            secant_max_iterations: 500,
            secant_tolerance: 1.48e-8,
        }
    }
}

/// Runtime configuration of a tracker. Not part of the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Offset from UTC, in hours, used to decide what "today" is
    /// (defaults to UTC+8, Beijing time).
    pub utc_offset_hours: i32,

    /// Tolerance when matching an amount for removal
    pub removal_epsilon: f64,

    pub solver: SolverConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 8,
            removal_epsilon: 0.001,
            solver: SolverConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(CoreError::ValidationError(format!(
                "utc_offset_hours must be within -23..=23, got {}",
                self.utc_offset_hours
            )));
        }
        if !(self.removal_epsilon > 0.0) {
            return Err(CoreError::ValidationError(
                "removal_epsilon must be positive".into(),
            ));
        }

        let s = &self.solver;
        if !(s.lower_bound > -1.0 && s.upper_bound > s.lower_bound) {
            return Err(CoreError::ValidationError(format!(
                "Solver bracket [{}, {}] must satisfy -1 < lower < upper",
                s.lower_bound, s.upper_bound
            )));
        }
        if !(s.tolerance > 0.0 && s.secant_tolerance > 0.0) {
            return Err(CoreError::ValidationError(
                "Solver tolerances must be positive".into(),
            ));
        }
        if s.max_iterations == 0 || s.secant_max_iterations == 0 {
            return Err(CoreError::ValidationError(
                "Solver iteration limits must be at least 1".into(),
            ));
        }
        if !(s.secant_seed > -1.0) {
            return Err(CoreError::ValidationError(
                "secant_seed must be greater than -1".into(),
            ));
        }
        Ok(())
    }
}

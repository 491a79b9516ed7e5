//! Simulation parameters and thresholds.

use serde::{Deserialize, Serialize};

use crate::error::{ApproachError, Result};

/// Largest reconciliation scan budget accepted by [`SimulationRules::validate`].
pub const MAX_ITERATIONS_LIMIT: usize = 10_000;

/// What to do with an aircraft that starts exactly at the airport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateFlightPolicy {
    /// Zero travel time, arrived at t = 0
    #[default]
    TreatAsArrived,
    /// Refuse the roster
    Reject,
}

/// Configuration for collision detection and speed reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRules {
    /// Minimum separation between two interpolated positions (distance units)
    pub collision_threshold: f64,
    /// Minimum gap between arrival times in minutes.
    /// Falls back to `collision_threshold` when unset.
    pub time_separation_min: Option<f64>,
    /// Speed multiplier for the later-arriving aircraft of a conflicting pair
    pub slow_down_factor: f64,
    /// Speed multiplier for the earlier-arriving aircraft of a conflicting pair
    pub speed_up_factor: f64,
    /// Upper bound on adjusting reconciliation scans
    pub max_iterations: usize,
    pub degenerate_flight: DegenerateFlightPolicy,
}

impl Default for SimulationRules {
    fn default() -> Self {
        Self {
            collision_threshold: 10.0,
            time_separation_min: None,
            slow_down_factor: 0.95,
            speed_up_factor: 1.05,
            max_iterations: 1000,
            degenerate_flight: DegenerateFlightPolicy::default(),
        }
    }
}

impl SimulationRules {
    /// Arrival separation used by reconciliation.
    pub fn time_separation(&self) -> f64 {
        self.time_separation_min.unwrap_or(self.collision_threshold)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.collision_threshold.is_finite() && self.collision_threshold > 0.0) {
            return Err(ApproachError::InvalidParameter(format!(
                "collision_threshold must be positive, got {}",
                self.collision_threshold
            )));
        }
        let separation = self.time_separation();
        if !(separation.is_finite() && separation > 0.0) {
            return Err(ApproachError::InvalidParameter(format!(
                "time_separation_min must be positive, got {separation}"
            )));
        }
        if !(self.slow_down_factor > 0.0 && self.slow_down_factor < 1.0) {
            return Err(ApproachError::InvalidParameter(format!(
                "slow_down_factor must be in (0, 1), got {}",
                self.slow_down_factor
            )));
        }
        if self.max_iterations > MAX_ITERATIONS_LIMIT {
            return Err(ApproachError::InvalidParameter(format!(
                "max_iterations must be at most {MAX_ITERATIONS_LIMIT}, got {}",
                self.max_iterations
            )));
        }
        if !(self.speed_up_factor.is_finite() && self.speed_up_factor > 1.0) {
            return Err(ApproachError::InvalidParameter(format!(
                "speed_up_factor must be greater than 1, got {}",
                self.speed_up_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_separation_defaults_to_collision_threshold() {
        let mut rules = SimulationRules::default();
        assert_eq!(rules.time_separation(), 10.0);
        rules.time_separation_min = Some(4.0);
        assert_eq!(rules.time_separation(), 4.0);
    }

    #[test]
    fn test_partial_rules_fill_defaults() {
        let rules: SimulationRules =
            serde_json::from_str(r#"{"collision_threshold": 25, "degenerate_flight": "reject"}"#).unwrap();
        assert_eq!(rules.collision_threshold, 25.0);
        assert_eq!(rules.max_iterations, 1000);
        assert_eq!(rules.degenerate_flight, DegenerateFlightPolicy::Reject);
    }

    #[test]
    fn test_rejects_factors_that_do_not_separate() {
        let rules = SimulationRules {
            speed_up_factor: 0.9,
            ..SimulationRules::default()
        };
        assert!(matches!(rules.validate(), Err(ApproachError::InvalidParameter(_))));
        assert!(SimulationRules::default().validate().is_ok());
    }

    #[test]
    fn test_caps_iteration_budget() {
        let mut rules = SimulationRules {
            max_iterations: MAX_ITERATIONS_LIMIT,
            ..SimulationRules::default()
        };
        assert!(rules.validate().is_ok());
        rules.max_iterations = 20_000;
        assert!(matches!(rules.validate(), Err(ApproachError::InvalidParameter(_))));
    }
}

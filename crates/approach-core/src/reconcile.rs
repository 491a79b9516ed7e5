//! Arrival-time reconciliation by speed adjustment.
//!
//! Repeatedly scans every pair of flights and nudges the speeds of pairs
//! whose arrival times are closer than the required separation: the later
//! aircraft slows down, the earlier one speeds up. Scanning stops when a
//! full pass makes no adjustment, or when the scan budget runs out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ApproachError, Result};
use crate::models::{travel_minutes, FlightRecord};
use crate::rules::SimulationRules;

/// One speed adjustment made for a conflicting pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentLogEntry {
    /// Scan (1-based) in which the adjustment was made
    pub iteration: usize,
    pub plane1_id: String,
    pub plane1_type: String,
    pub plane2_id: String,
    pub plane2_type: String,
    /// Average of the two arrival times before the adjustment (minutes)
    pub original_collision_time: f64,
    pub new_speed1: f64,
    pub new_speed2: f64,
}

impl fmt::Display for AdjustmentLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} and {} would have met at {:.2} min. - {}: {:.2} - {}: {:.2}",
            self.plane1_type,
            self.plane2_type,
            self.original_collision_time,
            self.plane1_type,
            self.new_speed1,
            self.plane2_type,
            self.new_speed2
        )
    }
}

/// Result of a reconciliation run.
///
/// Both variants carry the records and log as they stand at the end of the
/// run, so a caller may still choose to continue with a diverged state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReconcileOutcome {
    Converged {
        flights: Vec<FlightRecord>,
        log: Vec<AdjustmentLogEntry>,
        /// Number of scans that adjusted at least one pair
        iterations: usize,
    },
    Diverged {
        flights: Vec<FlightRecord>,
        log: Vec<AdjustmentLogEntry>,
        iterations: usize,
        remaining_conflicts: usize,
    },
}

impl ReconcileOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    pub fn flights(&self) -> &[FlightRecord] {
        match self {
            Self::Converged { flights, .. } | Self::Diverged { flights, .. } => flights,
        }
    }

    pub fn log(&self) -> &[AdjustmentLogEntry] {
        match self {
            Self::Converged { log, .. } | Self::Diverged { log, .. } => log,
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            Self::Converged { iterations, .. } | Self::Diverged { iterations, .. } => *iterations,
        }
    }

    /// Split into records and log regardless of convergence.
    pub fn into_parts(self) -> (Vec<FlightRecord>, Vec<AdjustmentLogEntry>) {
        match self {
            Self::Converged { flights, log, .. } | Self::Diverged { flights, log, .. } => (flights, log),
        }
    }

    /// Records and log of a converged run, or the divergence error.
    pub fn into_result(self) -> Result<(Vec<FlightRecord>, Vec<AdjustmentLogEntry>)> {
        match self {
            Self::Converged { flights, log, .. } => Ok((flights, log)),
            Self::Diverged {
                iterations,
                remaining_conflicts,
                ..
            } => Err(ApproachError::ReconciliationDiverged {
                iterations,
                remaining: remaining_conflicts,
            }),
        }
    }
}

/// Speed reconciler with its separation and adjustment parameters.
#[derive(Debug, Clone, Copy)]
pub struct SpeedReconciler {
    /// Required gap between two arrival times (minutes)
    pub time_separation: f64,
    pub slow_down_factor: f64,
    pub speed_up_factor: f64,
    pub max_iterations: usize,
}

impl Default for SpeedReconciler {
    fn default() -> Self {
        Self::from_rules(&SimulationRules::default())
    }
}

impl SpeedReconciler {
    pub fn new(time_separation: f64, max_iterations: usize) -> Self {
        Self {
            time_separation,
            max_iterations,
            ..Self::default()
        }
    }

    pub fn from_rules(rules: &SimulationRules) -> Self {
        Self {
            time_separation: rules.time_separation(),
            slow_down_factor: rules.slow_down_factor,
            speed_up_factor: rules.speed_up_factor,
            max_iterations: rules.max_iterations,
        }
    }

    /// Reconcile a copy of `flights`; the input is left untouched.
    pub fn reconcile(&self, flights: &[FlightRecord]) -> ReconcileOutcome {
        let mut flights = flights.to_vec();
        let mut log = Vec::new();
        let mut iterations = 0;

        loop {
            let budget_spent = iterations == self.max_iterations;
            if budget_spent || !self.scan(&mut flights, iterations + 1, &mut log) {
                let remaining_conflicts = conflicting_pairs(&flights, self.time_separation);
                if remaining_conflicts == 0 {
                    tracing::info!(
                        "Speed reconciliation converged after {} adjusting scan(s), {} adjustment(s)",
                        iterations,
                        log.len()
                    );
                    return ReconcileOutcome::Converged {
                        flights,
                        log,
                        iterations,
                    };
                }
                tracing::warn!(
                    "Speed reconciliation gave up after {} scans with {} conflicting pair(s)",
                    iterations,
                    remaining_conflicts
                );
                return ReconcileOutcome::Diverged {
                    flights,
                    log,
                    iterations,
                    remaining_conflicts,
                };
            }
            iterations += 1;
        }
    }

    /// One full pass over all pairs. Returns whether anything was adjusted.
    ///
    /// Adjustments apply immediately, so later pairs in the same pass see
    /// the updated arrival times. Pairs that cannot be moved apart (both
    /// aircraft at the airport, or speeds leaving the representable range)
    /// are left as they are and counted as remaining conflicts.
    fn scan(&self, flights: &mut [FlightRecord], iteration: usize, log: &mut Vec<AdjustmentLogEntry>) -> bool {
        let mut adjusted = false;

        for i in 0..flights.len() {
            for j in (i + 1)..flights.len() {
                let t1 = flights[i].time_needed();
                let t2 = flights[j].time_needed();
                if (t1 - t2).abs() >= self.time_separation {
                    continue;
                }

                let original_collision_time = (t1 + t2) / 2.0;
                // Ties: the first of the pair takes the earlier slot
                let (factor1, factor2) = if t1 > t2 {
                    (self.slow_down_factor, self.speed_up_factor)
                } else {
                    (self.speed_up_factor, self.slow_down_factor)
                };

                let (head, tail) = flights.split_at_mut(j);
                let (plane1, plane2) = (&mut head[i], &mut tail[0]);
                if plane1.is_degenerate() && plane2.is_degenerate() {
                    continue;
                }
                let speed1 = plane1.speed() * factor1;
                let speed2 = plane2.speed() * factor2;
                if !(admissible(plane1, speed1) && admissible(plane2, speed2)) {
                    tracing::debug!(
                        "Skipping {} / {}: adjusted speeds {} / {} out of range",
                        plane1.id(),
                        plane2.id(),
                        speed1,
                        speed2
                    );
                    continue;
                }

                adjusted = true;
                plane1.set_speed(speed1);
                plane2.set_speed(speed2);

                tracing::debug!(
                    "Adjusted {} -> {:.2} and {} -> {:.2} (arrivals {:.2} / {:.2} min)",
                    plane1.id(),
                    plane1.speed(),
                    plane2.id(),
                    plane2.speed(),
                    plane1.time_needed(),
                    plane2.time_needed()
                );

                log.push(AdjustmentLogEntry {
                    iteration,
                    plane1_id: plane1.id().to_string(),
                    plane1_type: plane1.aircraft_type().to_string(),
                    plane2_id: plane2.id().to_string(),
                    plane2_type: plane2.aircraft_type().to_string(),
                    original_collision_time,
                    new_speed1: plane1.speed(),
                    new_speed2: plane2.speed(),
                });
            }
        }

        adjusted
    }
}

/// A speed the record can take while keeping a finite, positive flight time.
fn admissible(flight: &FlightRecord, speed: f64) -> bool {
    speed.is_normal() && speed > 0.0 && travel_minutes(flight.distance(), speed).is_finite()
}

/// Reconcile with the default adjustment factors.
pub fn reconcile(flights: &[FlightRecord], threshold: f64, max_iterations: usize) -> ReconcileOutcome {
    SpeedReconciler::new(threshold, max_iterations).reconcile(flights)
}

/// Number of pairs whose arrival times are closer than `separation`.
pub fn conflicting_pairs(flights: &[FlightRecord], separation: f64) -> usize {
    flights
        .iter()
        .enumerate()
        .map(|(i, a)| {
            flights[i + 1..]
                .iter()
                .filter(|b| (a.time_needed() - b.time_needed()).abs() < separation)
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_data::derive;
    use crate::models::AircraftDefinition;
    use crate::spatial::Point3D;

    fn vertical(planes: &[(&str, f64, f64)]) -> Vec<FlightRecord> {
        let definitions: Vec<AircraftDefinition> = planes
            .iter()
            .map(|(id, altitude, speed)| {
                AircraftDefinition::new(*id, format!("T-{id}"), Point3D::new(0.0, 0.0, *altitude), *speed, 0.0)
            })
            .collect();
        derive(&definitions, Point3D::ORIGIN).unwrap()
    }

    fn assert_consistent(flights: &[FlightRecord]) {
        for flight in flights {
            let expected = flight.distance() / flight.speed() * 60.0;
            assert!((flight.time_needed() - expected).abs() < 1e-9);
            assert_eq!(flight.arrival_time(), flight.time_needed());
        }
    }

    #[test]
    fn test_two_plane_example_converges_in_one_scan() {
        let flights = vertical(&[("A", 100.0, 60.0), ("B", 95.0, 60.0)]);
        let outcome = reconcile(&flights, 10.0, 100);

        assert!(outcome.is_converged());
        assert_eq!(outcome.iterations(), 1);
        let adjusted = outcome.flights();
        assert!((adjusted[0].speed() - 57.0).abs() < 1e-9);
        assert!((adjusted[1].speed() - 63.0).abs() < 1e-9);
        assert!((adjusted[0].time_needed() - 100.0 / 57.0 * 60.0).abs() < 1e-9);
        assert!((adjusted[1].time_needed() - 95.0 / 63.0 * 60.0).abs() < 1e-9);
        assert!((adjusted[0].time_needed() - 105.26).abs() < 0.01);
        assert!((adjusted[1].time_needed() - 90.48).abs() < 0.01);

        let log = outcome.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].plane1_id, "A");
        assert_eq!(log[0].plane2_id, "B");
        assert_eq!(log[0].iteration, 1);
        assert!((log[0].original_collision_time - 97.5).abs() < 1e-9);
        assert!((log[0].new_speed1 - 57.0).abs() < 1e-9);
        assert!((log[0].new_speed2 - 63.0).abs() < 1e-9);
    }

    #[test]
    fn test_input_records_are_not_mutated() {
        let flights = vertical(&[("A", 100.0, 60.0), ("B", 95.0, 60.0)]);
        let before = flights.clone();
        let _ = reconcile(&flights, 10.0, 100);
        assert_eq!(flights, before);
    }

    #[test]
    fn test_already_separated_roster_is_untouched() {
        let flights = vertical(&[("A", 100.0, 60.0), ("B", 50.0, 60.0), ("C", 150.0, 60.0)]);
        let outcome = reconcile(&flights, 10.0, 100);
        assert!(outcome.is_converged());
        assert_eq!(outcome.iterations(), 0);
        assert!(outcome.log().is_empty());
        assert_eq!(outcome.flights(), flights.as_slice());
    }

    #[test]
    fn test_tied_arrivals_speed_up_first_plane() {
        let flights = vertical(&[("A", 100.0, 60.0), ("B", 100.0, 60.0)]);
        let outcome = reconcile(&flights, 10.0, 100);
        let adjusted = outcome.flights();
        assert!(adjusted[0].time_needed() < adjusted[1].time_needed());
        assert!((adjusted[0].speed() - 63.0).abs() < 1e-9);
        assert!((adjusted[1].speed() - 57.0).abs() < 1e-9);
    }

    #[test]
    fn test_converged_roster_is_separated() {
        let flights = vertical(&[
            ("A", 100.0, 60.0),
            ("B", 101.0, 60.0),
            ("C", 104.0, 62.0),
            ("D", 98.0, 58.0),
            ("E", 110.0, 65.0),
        ]);
        let outcome = reconcile(&flights, 10.0, 1000);
        assert_consistent(outcome.flights());
        match &outcome {
            ReconcileOutcome::Converged { flights, .. } => {
                assert_eq!(conflicting_pairs(flights, 10.0), 0);
                for (i, a) in flights.iter().enumerate() {
                    for b in &flights[i + 1..] {
                        assert!((a.time_needed() - b.time_needed()).abs() >= 10.0);
                    }
                }
            }
            ReconcileOutcome::Diverged { remaining_conflicts, .. } => assert!(*remaining_conflicts > 0),
        }
    }

    #[test]
    fn test_budget_exhaustion_reports_divergence() {
        let flights = vertical(&[("A", 100.0, 60.0), ("B", 101.0, 60.0), ("C", 102.0, 60.0)]);
        let outcome = reconcile(&flights, 50.0, 1);

        assert!(!outcome.is_converged());
        assert_eq!(outcome.iterations(), 1);
        assert_eq!(outcome.log().len(), 3);
        assert_consistent(outcome.flights());

        let err = outcome.into_result().unwrap_err();
        assert!(matches!(
            err,
            ApproachError::ReconciliationDiverged { iterations: 1, remaining: 3 }
        ));
    }

    #[test]
    fn test_zero_budget_still_checks_separation() {
        let separated = vertical(&[("A", 100.0, 60.0), ("B", 50.0, 60.0)]);
        assert!(reconcile(&separated, 10.0, 0).is_converged());

        let close = vertical(&[("A", 100.0, 60.0), ("B", 99.0, 60.0)]);
        let outcome = reconcile(&close, 10.0, 0);
        assert!(!outcome.is_converged());
        assert!(outcome.log().is_empty());
    }

    #[test]
    fn test_aircraft_at_airport_are_not_adjusted() {
        let flights = vertical(&[("A", 0.0, 60.0), ("B", 0.0, 60.0)]);
        let outcome = reconcile(&flights, 10.0, 10_000);

        assert!(!outcome.is_converged());
        assert_eq!(outcome.iterations(), 0);
        assert!(outcome.log().is_empty());
        assert!(outcome.flights().iter().all(|f| f.speed() == 60.0));
        assert!(matches!(
            outcome.into_result(),
            Err(ApproachError::ReconciliationDiverged { iterations: 0, remaining: 1 })
        ));
    }

    #[test]
    fn test_speeds_stay_finite_and_positive() {
        let flights = vertical(&[("A", 100.0, 60.0), ("B", 95.0, 60.0)]);
        let reconciler = SpeedReconciler {
            time_separation: f64::INFINITY,
            slow_down_factor: 1e-300,
            speed_up_factor: 1e300,
            max_iterations: 100,
        };
        let outcome = reconciler.reconcile(&flights);

        assert!(!outcome.is_converged());
        assert_eq!(outcome.iterations(), 1);
        assert_eq!(outcome.log().len(), 1);
        for flight in outcome.flights() {
            assert!(flight.speed().is_normal() && flight.speed() > 0.0);
            assert!(flight.time_needed().is_finite());
        }
        assert_consistent(outcome.flights());
    }

    #[test]
    fn test_log_entry_text() {
        let flights = vertical(&[("A", 100.0, 60.0), ("B", 95.0, 60.0)]);
        let outcome = reconcile(&flights, 10.0, 100);
        assert_eq!(
            outcome.log()[0].to_string(),
            "T-A and T-B would have met at 97.50 min. - T-A: 57.00 - T-B: 63.00"
        );
    }
}

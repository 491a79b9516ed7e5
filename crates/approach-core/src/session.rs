//! Simulation session: one airport, one roster, and the queries over it.

use serde::{Deserialize, Serialize};

use crate::conflict::{detect_collisions, CollisionEvent};
use crate::error::{ApproachError, Result};
use crate::flight_data::derive_with_policy;
use crate::interpolation::{position_at, progress_at, remaining_time};
use crate::models::{AircraftDefinition, FlightRecord};
use crate::reconcile::{AdjustmentLogEntry, ReconcileOutcome, SpeedReconciler};
use crate::rules::SimulationRules;
use crate::spatial::Point3D;

/// Upper bound on snapshots a single timeline query may produce.
pub const MAX_TIMELINE_TICKS: usize = 100_000;

/// State of the speed reconciliation for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationStatus {
    #[default]
    NotRun,
    Converged { iterations: usize },
    Diverged { iterations: usize, remaining_conflicts: usize },
}

/// Per-aircraft view at a given simulation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStatus {
    pub id: String,
    #[serde(rename = "type")]
    pub aircraft_type: String,
    pub position: Point3D,
    /// Percent of the path flown
    pub progress: f64,
    pub remaining_time: f64,
    pub arrival_time: f64,
    pub speed: f64,
    /// Still occupying airspace (not past arrival + block time)
    pub active: bool,
}

/// Everything the presentation layer needs for one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub time: f64,
    pub flights: Vec<FlightStatus>,
    pub collisions: Vec<CollisionEvent>,
}

/// A self-contained simulation over a fixed roster.
///
/// Records are derived once at construction. Reconciliation produces a new
/// session; queries never mutate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSession {
    airport: Point3D,
    rules: SimulationRules,
    flights: Vec<FlightRecord>,
    adjustments: Vec<AdjustmentLogEntry>,
    reconciliation: ReconciliationStatus,
}

impl SimulationSession {
    /// Validate the rules and derive flight records for `aircraft`.
    pub fn new(aircraft: &[AircraftDefinition], airport: Point3D, rules: SimulationRules) -> Result<Self> {
        rules.validate()?;
        let flights = derive_with_policy(aircraft, airport, rules.degenerate_flight)?;
        Ok(Self {
            airport,
            rules,
            flights,
            adjustments: Vec::new(),
            reconciliation: ReconciliationStatus::NotRun,
        })
    }

    /// Run speed reconciliation and keep its result, converged or not.
    ///
    /// Adjustments accumulate if called more than once.
    pub fn reconciled(mut self) -> Self {
        let outcome = SpeedReconciler::from_rules(&self.rules).reconcile(&self.flights);
        self.reconciliation = match &outcome {
            ReconcileOutcome::Converged { iterations, .. } => ReconciliationStatus::Converged {
                iterations: *iterations,
            },
            ReconcileOutcome::Diverged {
                iterations,
                remaining_conflicts,
                ..
            } => ReconciliationStatus::Diverged {
                iterations: *iterations,
                remaining_conflicts: *remaining_conflicts,
            },
        };
        let (flights, log) = outcome.into_parts();
        self.flights = flights;
        self.adjustments.extend(log);
        self
    }

    /// Refuse a session whose reconciliation diverged.
    pub fn require_converged(self) -> Result<Self> {
        match self.reconciliation {
            ReconciliationStatus::Diverged {
                iterations,
                remaining_conflicts,
            } => Err(ApproachError::ReconciliationDiverged {
                iterations,
                remaining: remaining_conflicts,
            }),
            _ => Ok(self),
        }
    }

    pub fn airport(&self) -> Point3D {
        self.airport
    }

    pub fn rules(&self) -> &SimulationRules {
        &self.rules
    }

    pub fn flights(&self) -> &[FlightRecord] {
        &self.flights
    }

    pub fn flight(&self, id: &str) -> Option<&FlightRecord> {
        self.flights.iter().find(|flight| flight.id() == id)
    }

    pub fn adjustments(&self) -> &[AdjustmentLogEntry] {
        &self.adjustments
    }

    pub fn adjustment(&self, index: usize) -> Option<&AdjustmentLogEntry> {
        self.adjustments.get(index)
    }

    pub fn reconciliation(&self) -> ReconciliationStatus {
        self.reconciliation
    }

    /// Latest arrival time in the roster (minutes); 0 for an empty roster.
    pub fn horizon(&self) -> f64 {
        self.flights
            .iter()
            .map(FlightRecord::arrival_time)
            .fold(0.0, f64::max)
    }

    pub fn collisions_at(&self, t: f64) -> Vec<CollisionEvent> {
        detect_collisions(&self.flights, t, self.rules.collision_threshold)
    }

    pub fn flight_status(&self, flight: &FlightRecord, t: f64) -> FlightStatus {
        FlightStatus {
            id: flight.id().to_string(),
            aircraft_type: flight.aircraft_type().to_string(),
            position: position_at(flight, t),
            progress: progress_at(flight, t),
            remaining_time: remaining_time(flight, t),
            arrival_time: flight.arrival_time(),
            speed: flight.speed(),
            active: flight.is_active_at(t),
        }
    }

    pub fn snapshot(&self, t: f64) -> SimulationSnapshot {
        SimulationSnapshot {
            time: t,
            flights: self.flights.iter().map(|flight| self.flight_status(flight, t)).collect(),
            collisions: self.collisions_at(t),
        }
    }

    /// Snapshots every `step` minutes from 0 through the horizon, inclusive.
    pub fn timeline(&self, step: f64) -> Result<Vec<SimulationSnapshot>> {
        if !(step.is_finite() && step > 0.0) {
            return Err(ApproachError::InvalidParameter(format!(
                "timeline step must be positive, got {step}"
            )));
        }
        let ticks = (self.horizon() / step).ceil();
        if ticks >= MAX_TIMELINE_TICKS as f64 {
            return Err(ApproachError::InvalidParameter(format!(
                "timeline step {step} yields {MAX_TIMELINE_TICKS} or more ticks"
            )));
        }
        let ticks = ticks as usize;
        Ok((0..=ticks).map(|tick| self.snapshot(tick as f64 * step)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aircraft(id: &str, start: [f64; 3], speed: f64, block_time: f64) -> AircraftDefinition {
        AircraftDefinition::new(id, format!("T-{id}"), start.into(), speed, block_time)
    }

    #[test]
    fn test_snapshot_reports_progress_and_position() {
        let session = SimulationSession::new(
            &[aircraft("A", [0.0, 0.0, 100.0], 60.0, 0.0)],
            Point3D::ORIGIN,
            SimulationRules::default(),
        )
        .unwrap();

        let snapshot = session.snapshot(50.0);
        let status = &snapshot.flights[0];
        assert!((status.progress - 50.0).abs() < 1e-9);
        assert!(status.position.distance_to(&Point3D::new(0.0, 0.0, 50.0)) < 1e-9);
        assert!(status.active);
        assert!(snapshot.collisions.is_empty());
    }

    #[test]
    fn test_reconciled_session_keeps_log() {
        let session = SimulationSession::new(
            &[aircraft("A", [0.0, 0.0, 100.0], 60.0, 0.0), aircraft("B", [0.0, 0.0, 95.0], 60.0, 0.0)],
            Point3D::ORIGIN,
            SimulationRules::default(),
        )
        .unwrap();
        assert_eq!(session.reconciliation(), ReconciliationStatus::NotRun);

        let session = session.reconciled().require_converged().unwrap();
        assert_eq!(session.reconciliation(), ReconciliationStatus::Converged { iterations: 1 });
        assert_eq!(session.adjustments().len(), 1);
        assert!(session.adjustment(0).is_some());
        assert!(session.adjustment(1).is_none());
        assert!((session.horizon() - 100.0 / 57.0 * 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_diverged_session_can_be_refused() {
        let rules = SimulationRules {
            collision_threshold: 50.0,
            max_iterations: 1,
            ..SimulationRules::default()
        };
        let roster = [
            aircraft("A", [0.0, 0.0, 100.0], 60.0, 0.0),
            aircraft("B", [0.0, 0.0, 101.0], 60.0, 0.0),
            aircraft("C", [0.0, 0.0, 102.0], 60.0, 0.0),
        ];
        let session = SimulationSession::new(&roster, Point3D::ORIGIN, rules).unwrap().reconciled();
        assert!(matches!(session.reconciliation(), ReconciliationStatus::Diverged { .. }));
        assert_eq!(session.adjustments().len(), 3);
        assert!(matches!(
            session.require_converged(),
            Err(ApproachError::ReconciliationDiverged { .. })
        ));
    }

    #[test]
    fn test_invalid_roster_aborts_session() {
        let roster = [aircraft("A", [0.0, 0.0, 100.0], 60.0, 0.0), aircraft("B", [0.0, 0.0, 50.0], 0.0, 0.0)];
        assert!(matches!(
            SimulationSession::new(&roster, Point3D::ORIGIN, SimulationRules::default()),
            Err(ApproachError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_timeline_covers_horizon() {
        let session = SimulationSession::new(
            &[aircraft("A", [0.0, 0.0, 100.0], 60.0, 0.0), aircraft("B", [0.0, 0.0, 45.0], 60.0, 0.0)],
            Point3D::ORIGIN,
            SimulationRules::default(),
        )
        .unwrap();

        let timeline = session.timeline(10.0).unwrap();
        assert_eq!(timeline.first().map(|s| s.time), Some(0.0));
        assert!(timeline.last().map(|s| s.time).unwrap() >= session.horizon());
        assert!(timeline.windows(2).all(|w| w[1].time > w[0].time));
        assert!(session.timeline(0.0).is_err());
    }

    #[test]
    fn test_timeline_rejects_tiny_steps() {
        let session = SimulationSession::new(
            &[aircraft("A", [0.0, 0.0, 120.0], 60.0, 0.0)],
            Point3D::ORIGIN,
            SimulationRules::default(),
        )
        .unwrap();
        assert_eq!(session.horizon(), 120.0);

        for step in [1e-320, 1e-7, session.horizon() / MAX_TIMELINE_TICKS as f64] {
            assert!(matches!(
                session.timeline(step),
                Err(ApproachError::InvalidParameter(_))
            ));
        }
        assert_eq!(session.timeline(0.5).unwrap().len(), 241);
    }

    #[test]
    fn test_sessions_are_independent() {
        let roster = [aircraft("A", [0.0, 0.0, 100.0], 60.0, 0.0), aircraft("B", [0.0, 0.0, 95.0], 60.0, 0.0)];
        let live = SimulationSession::new(&roster, Point3D::ORIGIN, SimulationRules::default()).unwrap();
        let reconciled = live.clone().reconciled();
        assert_eq!(live.flights()[0].speed(), 60.0);
        assert!(reconciled.flights()[0].speed() < 60.0);
        assert_eq!(live.flight("B").map(FlightRecord::speed), Some(60.0));
    }
}

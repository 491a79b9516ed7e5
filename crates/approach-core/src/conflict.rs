//! Collision detection module.
//!
//! Checks every pair of aircraft still occupying airspace at a given
//! simulation time and reports the pairs closer than the collision threshold.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::interpolation::position_at;
use crate::models::FlightRecord;
use crate::rules::SimulationRules;
use crate::spatial::Point3D;

/// Two aircraft closer than the collision threshold at `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub flight1_id: String,
    pub flight1_type: String,
    pub flight2_id: String,
    pub flight2_type: String,
    /// Simulation time of the check (minutes)
    pub time: f64,
    pub position1: Point3D,
    pub position2: Point3D,
    /// Midpoint between the two aircraft
    pub position: Point3D,
    pub distance: f64,
}

impl CollisionEvent {
    /// Order-independent identity of the pair.
    pub fn pair_key(&self) -> (&str, &str) {
        if self.flight1_id <= self.flight2_id {
            (&self.flight1_id, &self.flight2_id)
        } else {
            (&self.flight2_id, &self.flight1_id)
        }
    }

    pub fn involves(&self, flight_id: &str) -> bool {
        self.flight1_id == flight_id || self.flight2_id == flight_id
    }
}

impl fmt::Display for CollisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} and {} at position {} ({:.2} apart)",
            self.flight1_type, self.flight2_type, self.position, self.distance
        )
    }
}

/// Pairwise proximity detector.
#[derive(Debug, Clone, Copy)]
pub struct CollisionDetector {
    /// Minimum separation between two aircraft (distance units)
    pub threshold: f64,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new(SimulationRules::default().collision_threshold)
    }
}

impl CollisionDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Check all flights for collisions at time `t`.
    pub fn detect(&self, flights: &[FlightRecord], t: f64) -> Vec<CollisionEvent> {
        detect_collisions(flights, t, self.threshold)
    }
}

/// Report every pair of active aircraft closer than `threshold` at time `t`.
///
/// Aircraft past `arrival_time + block_time` are ignored. Pairs are checked
/// exhaustively; events come out in roster order of the first aircraft.
pub fn detect_collisions(flights: &[FlightRecord], t: f64, threshold: f64) -> Vec<CollisionEvent> {
    let active: Vec<(&FlightRecord, Point3D)> = flights
        .iter()
        .filter(|flight| flight.is_active_at(t))
        .map(|flight| (flight, position_at(flight, t)))
        .collect();

    let mut collisions = Vec::new();
    for (i, (flight1, position1)) in active.iter().enumerate() {
        for (flight2, position2) in &active[i + 1..] {
            let distance = position1.distance_to(position2);
            if distance < threshold {
                collisions.push(CollisionEvent {
                    flight1_id: flight1.id().to_string(),
                    flight1_type: flight1.aircraft_type().to_string(),
                    flight2_id: flight2.id().to_string(),
                    flight2_type: flight2.aircraft_type().to_string(),
                    time: t,
                    position1: *position1,
                    position2: *position2,
                    position: position1.midpoint(position2),
                    distance,
                });
            }
        }
    }

    if !collisions.is_empty() {
        tracing::debug!("Detected {} collision(s) at t={:.2}", collisions.len(), t);
    }
    collisions
}

/// Warning text shown above the flight view.
pub fn collision_warning(collisions: &[CollisionEvent]) -> String {
    if collisions.is_empty() {
        return "No collisions detected".to_string();
    }
    let lines: Vec<String> = collisions.iter().map(|c| format!("  {c}")).collect();
    format!("Collision between:\n{}", lines.join("\n"))
}

//! Core data models for the approach simulation.

use serde::{Deserialize, Deserializer, Serialize};

use crate::spatial::Point3D;

/// Speeds are given per hour, flight times are reported in minutes.
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Aircraft as defined in the roster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftDefinition {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display label, e.g. "A320"
    #[serde(rename = "type")]
    pub aircraft_type: String,
    pub start_coords: Point3D,
    /// Cruise speed in distance units per hour
    pub speed: f64,
    /// Minutes the aircraft keeps occupying airspace after arrival
    pub block_time: f64,
}

impl AircraftDefinition {
    pub fn new(
        id: impl Into<String>,
        aircraft_type: impl Into<String>,
        start_coords: Point3D,
        speed: f64,
        block_time: f64,
    ) -> Self {
        Self {
            id: id.into(),
            aircraft_type: aircraft_type.into(),
            start_coords,
            speed,
            block_time,
        }
    }
}

/// Roster ids may be written as strings or plain numbers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Minutes needed to cover `distance` at `speed` (distance units per hour).
pub fn travel_minutes(distance: f64, speed: f64) -> f64 {
    if distance == 0.0 {
        return 0.0;
    }
    distance / speed * MINUTES_PER_HOUR
}

/// Derived per-aircraft flight state.
///
/// Geometry is fixed at creation. Speed is the only mutable quantity and
/// every change goes through [`FlightRecord::set_speed`], which keeps
/// `time_needed` and `arrival_time` consistent with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    id: String,
    #[serde(rename = "type")]
    aircraft_type: String,
    start_coords: Point3D,
    destination: Point3D,
    distance: f64,
    speed: f64,
    time_needed: f64,
    arrival_time: f64,
    block_time: f64,
}

impl FlightRecord {
    /// Build a record for a direct approach to `destination`.
    ///
    /// Callers are expected to have validated the definition; see
    /// [`crate::flight_data::derive`].
    pub(crate) fn new(aircraft: &AircraftDefinition, destination: Point3D) -> Self {
        let distance = aircraft.start_coords.distance_to(&destination);
        let time_needed = travel_minutes(distance, aircraft.speed);
        Self {
            id: aircraft.id.clone(),
            aircraft_type: aircraft.aircraft_type.clone(),
            start_coords: aircraft.start_coords,
            destination,
            distance,
            speed: aircraft.speed,
            time_needed,
            // No holding pattern: arrival happens as soon as the path is flown
            arrival_time: time_needed,
            block_time: aircraft.block_time,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn aircraft_type(&self) -> &str {
        &self.aircraft_type
    }

    pub fn start_coords(&self) -> Point3D {
        self.start_coords
    }

    /// The airport this flight approaches.
    pub fn destination(&self) -> Point3D {
        self.destination
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Flight time in minutes.
    pub fn time_needed(&self) -> f64 {
        self.time_needed
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn block_time(&self) -> f64 {
        self.block_time
    }

    /// Time after which the aircraft no longer takes part in conflicts.
    pub fn release_time(&self) -> f64 {
        self.arrival_time + self.block_time
    }

    /// Whether the aircraft still occupies airspace at `t`.
    pub fn is_active_at(&self, t: f64) -> bool {
        t <= self.release_time()
    }

    /// Aircraft starting at the airport: zero travel time, arrived at t = 0.
    pub fn is_degenerate(&self) -> bool {
        self.distance == 0.0
    }

    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        self.time_needed = travel_minutes(self.distance, speed);
        self.arrival_time = self.time_needed;
    }
}

//! Randomly generated approach rosters for testing.

use approach_core::{AircraftDefinition, Point3D};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

const AIRCRAFT_TYPES: &[&str] = &["A320", "A321", "A350", "B737", "B777", "B787", "E190", "CRJ900"];

/// Parameters for a generated roster.
#[derive(Debug, Clone)]
pub struct RosterSpec {
    pub count: usize,
    /// Horizontal distance range from the airport
    pub min_distance: f64,
    pub max_distance: f64,
    pub max_altitude: f64,
    /// Cruise speed range (distance units per hour)
    pub min_speed: f64,
    pub max_speed: f64,
    pub max_block_time: f64,
}

impl Default for RosterSpec {
    fn default() -> Self {
        Self {
            count: 10,
            min_distance: 50.0,
            max_distance: 300.0,
            max_altitude: 12.0,
            min_speed: 150.0,
            max_speed: 500.0,
            max_block_time: 10.0,
        }
    }
}

/// Aircraft on random bearings around `airport`, reproducible from `seed`.
pub fn generate_roster(spec: &RosterSpec, airport: Point3D, seed: u64) -> Vec<AircraftDefinition> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..spec.count)
        .map(|i| {
            let bearing = rng.random_range(0.0..TAU);
            let distance = sample(&mut rng, spec.min_distance, spec.max_distance);
            let altitude = sample(&mut rng, 0.0, spec.max_altitude);
            let start = airport + Point3D::new(distance * bearing.sin(), distance * bearing.cos(), altitude);
            let aircraft_type = AIRCRAFT_TYPES[rng.random_range(0..AIRCRAFT_TYPES.len())];

            AircraftDefinition::new(
                (i + 1).to_string(),
                aircraft_type,
                round2(start),
                sample(&mut rng, spec.min_speed, spec.max_speed).round(),
                sample(&mut rng, 0.0, spec.max_block_time).round(),
            )
        })
        .collect()
}

/// Uniform sample in `[low, high]`, tolerating an empty range.
fn sample(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    if high <= low {
        low
    } else {
        rng.random_range(low..=high)
    }
}

fn round2(p: Point3D) -> Point3D {
    let r = |v: f64| (v * 100.0).round() / 100.0;
    Point3D::new(r(p.x), r(p.y), r(p.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approach_core::{SimulationRules, SimulationSession};

    #[test]
    fn test_same_seed_same_roster() {
        let spec = RosterSpec::default();
        let a = generate_roster(&spec, Point3D::ORIGIN, 42);
        let b = generate_roster(&spec, Point3D::ORIGIN, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), spec.count);
    }

    #[test]
    fn test_generated_roster_is_valid() {
        let spec = RosterSpec {
            count: 25,
            ..RosterSpec::default()
        };
        let airport = Point3D::new(10.0, 10.0, 0.0);
        let roster = generate_roster(&spec, airport, 7);
        let session = SimulationSession::new(&roster, airport, SimulationRules::default()).unwrap();
        for flight in session.flights() {
            assert!(flight.speed() >= spec.min_speed && flight.speed() <= spec.max_speed);
            assert!(flight.distance() >= spec.min_distance - 1.0);
        }
    }
}

//! Straight-line position interpolation along an approach.

use crate::models::FlightRecord;
use crate::spatial::Point3D;

/// Percentage of the path flown at time `t` (minutes), clamped to `[0, 100]`.
///
/// Aircraft with zero travel time are always at 100%.
pub fn progress_at(flight: &FlightRecord, t: f64) -> f64 {
    fraction_flown(flight, t) * 100.0
}

/// Position at time `t`, moving linearly from the start towards the airport.
///
/// The aircraft stops at the airport once it arrives.
pub fn position_at(flight: &FlightRecord, t: f64) -> Point3D {
    let airport = flight.destination();
    let remaining = 1.0 - fraction_flown(flight, t);
    airport + (flight.start_coords() - airport) * remaining
}

/// Minutes left until arrival, never negative.
pub fn remaining_time(flight: &FlightRecord, t: f64) -> f64 {
    (flight.time_needed() - t).max(0.0)
}

fn fraction_flown(flight: &FlightRecord, t: f64) -> f64 {
    let time_needed = flight.time_needed();
    if time_needed <= 0.0 {
        return 1.0;
    }
    (t / time_needed).clamp(0.0, 1.0)
}

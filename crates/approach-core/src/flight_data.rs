//! Derivation of flight records from roster definitions.

use std::collections::HashSet;

use crate::error::{ApproachError, Result};
use crate::models::{AircraftDefinition, FlightRecord};
use crate::rules::DegenerateFlightPolicy;
use crate::spatial::Point3D;

/// Derive one flight record per aircraft, in roster order.
///
/// Zero-distance flights are accepted as already arrived.
pub fn derive(aircraft: &[AircraftDefinition], airport: Point3D) -> Result<Vec<FlightRecord>> {
    derive_with_policy(aircraft, airport, DegenerateFlightPolicy::TreatAsArrived)
}

/// Derive flight records, validating the whole roster first.
///
/// The roster is all-or-nothing: any invalid entry fails the call.
pub fn derive_with_policy(
    aircraft: &[AircraftDefinition],
    airport: Point3D,
    policy: DegenerateFlightPolicy,
) -> Result<Vec<FlightRecord>> {
    if !airport.is_finite() {
        return Err(ApproachError::InvalidParameter(format!(
            "airport coordinates must be finite, got {airport}"
        )));
    }

    let mut seen = HashSet::with_capacity(aircraft.len());
    let mut records = Vec::with_capacity(aircraft.len());

    for definition in aircraft {
        validate_definition(definition)?;
        if !seen.insert(definition.id.as_str()) {
            return Err(ApproachError::DuplicateId(definition.id.clone()));
        }

        let record = FlightRecord::new(definition, airport);
        if record.is_degenerate() {
            match policy {
                DegenerateFlightPolicy::TreatAsArrived => {
                    tracing::debug!("Aircraft {} starts at the airport, treating as arrived", record.id());
                }
                DegenerateFlightPolicy::Reject => {
                    return Err(ApproachError::DegenerateFlight(definition.id.clone()));
                }
            }
        }
        records.push(record);
    }

    tracing::debug!("Derived {} flight records", records.len());
    Ok(records)
}

fn validate_definition(definition: &AircraftDefinition) -> Result<()> {
    let id = definition.id.as_str();
    if id.is_empty() {
        return Err(ApproachError::invalid(id, "id must not be empty"));
    }
    if !definition.start_coords.is_finite() {
        return Err(ApproachError::invalid(id, "start coordinates must be finite"));
    }
    if !(definition.speed.is_finite() && definition.speed > 0.0) {
        return Err(ApproachError::invalid(
            id,
            format!("speed must be positive, got {}", definition.speed),
        ));
    }
    if !(definition.block_time.is_finite() && definition.block_time >= 0.0) {
        return Err(ApproachError::invalid(
            id,
            format!("block time must be non-negative, got {}", definition.block_time),
        ));
    }
    Ok(())
}

//! Roster file loading.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::AircraftDefinition;

/// Parse a JSON array of aircraft definitions.
pub fn parse_roster(json: &str) -> Result<Vec<AircraftDefinition>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a roster file.
pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<AircraftDefinition>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let aircraft = parse_roster(&contents)?;
    tracing::info!("Loaded {} aircraft from {}", aircraft.len(), path.display());
    Ok(aircraft)
}

//! Plain-text rendering of simulation state.

use approach_core::{
    collision_warning, AdjustmentLogEntry, FlightRecord, ReconciliationStatus, SimulationSnapshot,
};
use std::fmt::Write;

pub fn flights_table(flights: &[FlightRecord]) -> String {
    let mut out = format!(
        "{:<8} {:<10} {:>10} {:>9} {:>12} {:>9}\n",
        "ID", "Type", "Distance", "Speed", "Arrival(min)", "Block"
    );
    for flight in flights {
        let _ = writeln!(
            out,
            "{:<8} {:<10} {:>10.2} {:>9.2} {:>12.2} {:>9.1}",
            flight.id(),
            flight.aircraft_type(),
            flight.distance(),
            flight.speed(),
            flight.arrival_time(),
            flight.block_time()
        );
    }
    out
}

pub fn snapshot_table(snapshot: &SimulationSnapshot) -> String {
    let mut out = format!("t = {:.1} min\n", snapshot.time);
    let _ = writeln!(
        out,
        "{:<8} {:<10} {:>12} {:>26} {:>14}",
        "ID", "Type", "Progress(%)", "Position", "Arrival(min)"
    );
    for status in &snapshot.flights {
        let marker = if status.active { "" } else { " (released)" };
        let _ = writeln!(
            out,
            "{:<8} {:<10} {:>11.1}% {:>26} {:>14.1}{}",
            status.id,
            status.aircraft_type,
            status.progress,
            status.position.to_string(),
            status.arrival_time,
            marker
        );
    }
    out.push_str(&collision_warning(&snapshot.collisions));
    out.push('\n');
    out
}

pub fn adjustments_table(log: &[AdjustmentLogEntry], status: ReconciliationStatus) -> String {
    let mut out = match status {
        ReconciliationStatus::NotRun => "Reconciliation not run\n".to_string(),
        ReconciliationStatus::Converged { iterations } => {
            format!("Converged after {iterations} adjusting scan(s), {} adjustment(s)\n", log.len())
        }
        ReconciliationStatus::Diverged {
            iterations,
            remaining_conflicts,
        } => format!(
            "Diverged after {iterations} scan(s): {remaining_conflicts} conflicting pair(s) remain, {} adjustment(s)\n",
            log.len()
        ),
    };
    for (index, entry) in log.iter().enumerate() {
        let _ = writeln!(out, "{:>4}. [scan {}] {}", index, entry.iteration, entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approach_core::{AircraftDefinition, Point3D, SimulationRules, SimulationSession};

    fn session() -> SimulationSession {
        let roster = [
            AircraftDefinition::new("1", "A320", Point3D::new(0.0, 0.0, 100.0), 60.0, 5.0),
            AircraftDefinition::new("2", "B737", Point3D::new(0.0, 0.0, 95.0), 60.0, 5.0),
        ];
        SimulationSession::new(&roster, Point3D::ORIGIN, SimulationRules::default()).unwrap()
    }

    #[test]
    fn test_flights_table_lists_every_flight() {
        let table = flights_table(session().flights());
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("A320"));
        assert!(table.contains("100.00"));
    }

    #[test]
    fn test_snapshot_shows_warning() {
        let text = snapshot_table(&session().snapshot(50.0));
        assert!(text.contains("50.0%"));
        assert!(text.contains("Collision between"));
    }

    #[test]
    fn test_adjustments_summary() {
        let session = session().reconciled();
        let text = adjustments_table(session.adjustments(), session.reconciliation());
        assert!(text.starts_with("Converged after 1 adjusting scan(s), 1 adjustment(s)"));
        assert!(text.contains("would have met at 97.50 min"));
    }
}

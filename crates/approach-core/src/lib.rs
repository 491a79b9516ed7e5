pub mod conflict;
pub mod error;
pub mod flight_data;
pub mod interpolation;
pub mod models;
pub mod reconcile;
pub mod roster;
pub mod rules;
pub mod session;
pub mod spatial;

pub use conflict::{collision_warning, detect_collisions, CollisionDetector, CollisionEvent};
pub use error::{ApproachError, Result};
pub use flight_data::{derive, derive_with_policy};
pub use interpolation::{position_at, progress_at, remaining_time};
pub use models::{AircraftDefinition, FlightRecord, MINUTES_PER_HOUR};
pub use reconcile::{reconcile, AdjustmentLogEntry, ReconcileOutcome, SpeedReconciler};
pub use roster::{load_roster, parse_roster};
pub use rules::{DegenerateFlightPolicy, SimulationRules, MAX_ITERATIONS_LIMIT};
pub use session::{
    FlightStatus, ReconciliationStatus, SimulationSession, SimulationSnapshot, MAX_TIMELINE_TICKS,
};
pub use spatial::Point3D;

//! Simulation session endpoints.
//!
//! Each session is an independent roster; the startup roster lives under
//! the `default` id.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use approach_core::{
    collision_warning, AdjustmentLogEntry, AircraftDefinition, ApproachError, CollisionEvent, FlightRecord, Point3D,
    ReconciliationStatus, SimulationRules, SimulationSession, SimulationSnapshot,
};

use crate::api::ApiError;
use crate::state::{AppState, SessionEntry};

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub aircraft: Vec<AircraftDefinition>,
    /// Defaults to the configured airport
    pub airport: Option<Point3D>,
    /// Defaults to the configured rules
    pub rules: Option<SimulationRules>,
    /// Run speed reconciliation before the session is registered
    #[serde(default)]
    pub reconcile: bool,
    /// Reject the session when reconciliation diverges
    #[serde(default)]
    pub require_convergence: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub airport: Point3D,
    pub rules: SimulationRules,
    pub flight_count: usize,
    pub adjustment_count: usize,
    /// Latest arrival time (minutes), the upper end of the time slider
    pub horizon: f64,
    pub reconciliation: ReconciliationStatus,
}

impl SessionSummary {
    fn from_entry(entry: &SessionEntry) -> Self {
        let session = &entry.session;
        Self {
            session_id: entry.id.clone(),
            created_at: entry.created_at,
            airport: session.airport(),
            rules: session.rules().clone(),
            flight_count: session.flights().len(),
            adjustment_count: session.adjustments().len(),
            horizon: session.horizon(),
            reconciliation: session.reconciliation(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    /// Simulation time in minutes
    #[serde(default)]
    pub t: f64,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    #[serde(flatten)]
    pub snapshot: SimulationSnapshot,
    pub warning: String,
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    /// Minutes between ticks
    pub step: Option<f64>,
    /// Only return ticks with at least one collision
    pub conflicts_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TimelineTick {
    pub time: f64,
    pub collisions: Vec<CollisionEvent>,
}

#[derive(Debug, Serialize)]
pub struct AdjustmentDetail {
    pub index: usize,
    #[serde(flatten)]
    pub entry: AdjustmentLogEntry,
    pub description: String,
}

// === Handlers ===

/// Create a new independent session from a roster.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSummary>), ApiError> {
    let config = state.config();
    let airport = req.airport.unwrap_or(config.airport);
    let rules = req.rules.unwrap_or_else(|| config.rules());

    // Reconciliation runs up to the rules' scan budget over all pairs
    let session = tokio::task::spawn_blocking(move || {
        let mut session = SimulationSession::new(&req.aircraft, airport, rules)?;
        if req.reconcile {
            session = session.reconciled();
            if req.require_convergence {
                session = session.require_converged()?;
            }
        }
        Ok::<_, ApproachError>(session)
    })
    .await??;

    let entry = state.add_session(session);
    tracing::info!(
        "Created session {} with {} aircraft ({:?})",
        entry.id,
        entry.session.flights().len(),
        entry.session.reconciliation()
    );
    Ok((StatusCode::CREATED, Json(SessionSummary::from_entry(&entry))))
}

/// List all sessions.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummary>> {
    Json(
        state
            .get_sessions()
            .iter()
            .map(|entry| SessionSummary::from_entry(entry))
            .collect(),
    )
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, ApiError> {
    let entry = lookup(&state, &session_id)?;
    Ok(Json(SessionSummary::from_entry(&entry)))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.remove_session(&session_id) {
        tracing::info!("Deleted session {}", session_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(session_id))
    }
}

/// Derived flight records, in roster order.
pub async fn list_flights(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<FlightRecord>>, ApiError> {
    let entry = lookup(&state, &session_id)?;
    Ok(Json(entry.session.flights().to_vec()))
}

/// Positions, progress and collisions at one simulation time.
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    if !query.t.is_finite() {
        let reason = format!("snapshot time must be finite, got {}", query.t);
        return Err(ApproachError::InvalidParameter(reason).into());
    }
    let entry = lookup(&state, &session_id)?;
    let snapshot = entry.session.snapshot(query.t);
    let warning = collision_warning(&snapshot.collisions);
    Ok(Json(SnapshotResponse { snapshot, warning }))
}

/// Collisions at every tick from 0 to the session horizon.
pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<TimelineTick>>, ApiError> {
    let entry = lookup(&state, &session_id)?;
    let mut ticks: Vec<TimelineTick> = entry
        .session
        .timeline(query.step.unwrap_or(1.0))?
        .into_iter()
        .map(|snapshot| TimelineTick {
            time: snapshot.time,
            collisions: snapshot.collisions,
        })
        .collect();

    if query.conflicts_only.unwrap_or(false) {
        ticks.retain(|tick| !tick.collisions.is_empty());
    }
    Ok(Json(ticks))
}

/// Reconciliation log, in the order adjustments were made.
pub async fn list_adjustments(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<AdjustmentLogEntry>>, ApiError> {
    let entry = lookup(&state, &session_id)?;
    Ok(Json(entry.session.adjustments().to_vec()))
}

pub async fn get_adjustment(
    State(state): State<Arc<AppState>>,
    Path((session_id, index)): Path<(String, usize)>,
) -> Result<Json<AdjustmentDetail>, ApiError> {
    let entry = lookup(&state, &session_id)?;
    let adjustment = entry
        .session
        .adjustment(index)
        .ok_or_else(|| ApiError::AdjustmentNotFound {
            session_id: session_id.clone(),
            index,
        })?;
    Ok(Json(AdjustmentDetail {
        index,
        entry: adjustment.clone(),
        description: adjustment.to_string(),
    }))
}

fn lookup(state: &AppState, session_id: &str) -> Result<Arc<SessionEntry>, ApiError> {
    state
        .get_session(session_id)
        .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))
}

//! REST API routes.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::sessions;
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/v1/sessions",
            post(sessions::create_session).get(sessions::list_sessions),
        )
        .route(
            "/v1/sessions/:session_id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/v1/sessions/:session_id/flights", get(sessions::list_flights))
        .route("/v1/sessions/:session_id/snapshot", get(sessions::get_snapshot))
        .route("/v1/sessions/:session_id/timeline", get(sessions::get_timeline))
        .route("/v1/sessions/:session_id/adjustments", get(sessions::list_adjustments))
        .route(
            "/v1/sessions/:session_id/adjustments/:index",
            get(sessions::get_adjustment),
        )
}

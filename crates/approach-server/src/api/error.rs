//! Mapping of simulation errors onto HTTP responses.

use approach_core::ApproachError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("adjustment {index} not found in session {session_id}")]
    AdjustmentNotFound { session_id: String, index: usize },

    #[error(transparent)]
    Simulation(#[from] ApproachError),

    #[error("simulation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) | Self::AdjustmentNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Simulation(ApproachError::ReconciliationDiverged { .. }) => StatusCode::CONFLICT,
            Self::Simulation(err) if err.is_input_error() => StatusCode::BAD_REQUEST,
            Self::Simulation(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

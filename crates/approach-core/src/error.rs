//! Error taxonomy for roster validation and reconciliation.

use thiserror::Error;

pub type Result<T, E = ApproachError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApproachError {
    /// Aircraft definition that cannot produce a valid flight.
    #[error("invalid aircraft {id}: {reason}")]
    InvalidInput { id: String, reason: String },

    #[error("duplicate aircraft id: {0}")]
    DuplicateId(String),

    /// Aircraft starting exactly at the airport under the `reject` policy.
    #[error("aircraft {0} starts at the airport (zero-distance flight)")]
    DegenerateFlight(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("speed reconciliation did not converge after {iterations} scans ({remaining} conflicting pairs left)")]
    ReconciliationDiverged { iterations: usize, remaining: usize },

    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed roster: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApproachError {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error stems from caller-supplied input rather than I/O.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::DuplicateId(_)
                | Self::DegenerateFlight(_)
                | Self::InvalidParameter(_)
                | Self::Json(_)
        )
    }
}

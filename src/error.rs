use thiserror::Error;

use crate::results::Violation;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The service could not be reached, or answered with something that is not JSON
    #[error("{0}")]
    TransportFailure(#[source] BoxedError),

    /// The service answered `success: false`. Carries its message verbatim.
    #[error("{0}")]
    ServiceFailure(String),

    #[error("Malformed simulation result: {0}")]
    ContractViolation(#[from] Violation),

    #[error("No gain matrix available")]
    MatrixUnavailable,

    #[error("Metric is undefined on an empty series")]
    DivisionUndefined,

    #[error("Request parameter '{field}' is not a finite number")]
    InvalidRequest { field: String },
}

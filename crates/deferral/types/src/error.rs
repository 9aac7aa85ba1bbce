use thiserror::Error;

/// Errors raised while validating or processing a deferral request.
///
/// Every variant is fatal for the request that triggered it: validation
/// happens before any computation, no partial results are produced, and
/// nothing is written to telemetry on failure. Degraded weighting (all
/// moral weights zero) is a response flag, not an error.
#[derive(Debug, Error)]
pub enum DeferralError {
    /// Point and basin vectors disagree in length.
    #[error("vector dimension mismatch: expected {expected}, actual {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    /// Zero basins were supplied with the request.
    #[error("basin set is empty")]
    EmptyBasinSet,

    /// A configuration precondition was violated.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type DeferralResult<T> = Result<T, DeferralError>;

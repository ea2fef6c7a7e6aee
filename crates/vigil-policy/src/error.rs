//! Policy errors

use thiserror::Error;

/// Policy errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The policy agent answered and the relation does not hold
    #[error("access denied")]
    Denied,

    /// The policy agent could not be reached or is overloaded
    #[error("policy agent unavailable: {0}")]
    Unavailable(String),

    /// The policy agent rejected the request shape
    #[error("invalid policy request: {0}")]
    InvalidRequest(String),

    /// Unexpected failure (bad response body, client setup)
    #[error("internal error: {0}")]
    Internal(String),
}

impl PolicyError {
    /// Whether the caller may retry the operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result alias for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;

//! Error types for sleuth-store

use crate::policy::PolicyViolation;
use thiserror::Error;

/// Store error type
#[derive(Debug, Error)]
pub enum Error {
    /// Database could not be opened or reached
    #[error("connection error: {0}")]
    Connection(String),

    /// Statement does not compile against the schema or breaks the read-only policy
    #[error("structural error: {detail}")]
    Structural {
        /// Message from the planner or the policy check
        detail: String,
    },

    /// Statement compiled but failed while running
    #[error("execution error: {0}")]
    Execution(String),
}

impl Error {
    /// Whether the failure is a structural rejection of the statement itself
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. })
    }

    /// Create a structural error
    #[must_use]
    pub fn structural(detail: impl Into<String>) -> Self {
        Self::Structural {
            detail: detail.into(),
        }
    }
}

impl From<PolicyViolation> for Error {
    fn from(violation: PolicyViolation) -> Self {
        Self::structural(violation.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

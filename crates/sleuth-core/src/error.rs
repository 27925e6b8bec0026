//! Error types for sleuth-core
//!
//! This module provides the run error taxonomy and user-friendly error formatting.

use crate::generator::GenerationError;
use crate::types::NodeKind;
use thiserror::Error;

/// Failure of a capability call made by a node
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Text generation failed or answered in the wrong shape
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Data store failed
    #[error("store: {0}")]
    Store(#[from] sleuth_store::Error),

    /// The call did not finish within its time budget
    #[error("timed out after {secs}s")]
    Timeout {
        /// Budget in seconds
        secs: u64,
    },
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// A candidate query was refused by the validator
    #[error("structural validation failed: {detail}")]
    StructuralValidation {
        /// Validator message
        detail: String,
    },

    /// The generator could not express the instruction as a query
    #[error("insufficient information to build a query: {reason}")]
    InsufficientInformation {
        /// Generator's explanation
        reason: String,
    },

    /// Every synthesis attempt was refused by the validator
    #[error("query synthesis gave up after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        /// Attempts made
        attempts: usize,
        /// Rejection of the final attempt
        #[source]
        last_error: Box<Error>,
    },

    /// A capability failed inside a node
    #[error("{node} failed: {source}")]
    Capability {
        /// Node that made the call
        node: NodeKind,
        /// Underlying failure
        #[source]
        source: CapabilityError,
    },

    /// Turn cap reached without a result
    #[error("turn limit of {max_turns} reached without identifying a culprit")]
    TurnLimitExceeded {
        /// Configured cap
        max_turns: usize,
    },

    /// Wall-clock budget exhausted
    #[error("run deadline of {secs}s exceeded during {node}")]
    DeadlineExceeded {
        /// Configured budget in seconds
        secs: u64,
        /// Node that was running, or about to run
        node: NodeKind,
    },

    /// Invalid settings
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Wrap a capability failure with the node that hit it
    #[must_use]
    pub fn capability(node: NodeKind, source: impl Into<CapabilityError>) -> Self {
        Self::Capability {
            node,
            source: source.into(),
        }
    }

    /// Node the error is attributed to, when it has one
    #[must_use]
    pub fn node(&self) -> Option<NodeKind> {
        match self {
            Self::Capability { node, .. } | Self::DeadlineExceeded { node, .. } => Some(*node),
            Self::StructuralValidation { .. }
            | Self::InsufficientInformation { .. }
            | Self::ExhaustedRetries { .. } => Some(NodeKind::SynthesizeValidate),
            Self::TurnLimitExceeded { .. } | Self::Configuration(_) => None,
        }
    }

    /// Whether the store could not be reached
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Capability {
                source: CapabilityError::Store(sleuth_store::Error::Connection(_)),
                ..
            }
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
///
/// Provides human-readable error messages and suggestions for fixing.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::StructuralValidation { detail } => {
                format!("🧩 The query was rejected: {}", detail)
            }
            Error::InsufficientInformation { reason } => {
                format!("🔍 Not enough information to continue: {}", reason)
            }
            Error::ExhaustedRetries {
                attempts,
                last_error,
            } => format!(
                "🔁 No valid query after {} attempts. Last rejection: {}",
                attempts, last_error
            ),
            Error::Capability { node, source } if self.is_connection() => {
                format!("🗄️ The database could not be opened during {}: {}", node, source)
            }
            Error::Capability { node, source } => {
                format!("🤖 The {} step failed: {}", node, source)
            }
            Error::TurnLimitExceeded { max_turns } => {
                format!("⏳ Stopped after {} turns without naming a culprit.", max_turns)
            }
            Error::DeadlineExceeded { secs, .. } => {
                format!("⏳ Stopped after the {}s time budget ran out.", secs)
            }
            Error::Configuration(msg) => {
                format!("⚙️ Configuration error: {}", msg)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::InsufficientInformation { .. } => Some(
                "💡 Add more detail to the seed, such as a date, a place or the kind of crime."
                    .to_string(),
            ),
            Error::ExhaustedRetries { .. } | Error::StructuralValidation { .. } => Some(
                "💡 Check that the schema file matches the database, or try `sleuth check-query`."
                    .to_string(),
            ),
            Error::Capability { .. } if self.is_connection() => Some(
                "💡 Check `store.database_path` in config/default.toml or pass --db.".to_string(),
            ),
            Error::Capability {
                source: CapabilityError::Timeout { .. },
                ..
            } => Some(
                "💡 Raise `investigation.capability_timeout_secs` or check your network."
                    .to_string(),
            ),
            Error::Capability {
                source: CapabilityError::Generation(e),
                ..
            } if e.is_transient() => Some(
                "💡 The text-generation service is busy or unreachable. Try again shortly."
                    .to_string(),
            ),
            Error::TurnLimitExceeded { .. } | Error::DeadlineExceeded { .. } => Some(
                "💡 Raise --max-turns / --max-run-secs, or leave them unset for no limit."
                    .to_string(),
            ),
            Error::Configuration(_) => {
                Some("💡 Run `sleuth config` to see the effective settings.".to_string())
            }
            Error::Capability { .. } => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = String::new();

    output.push_str(&error.user_message());
    output.push_str("\n\n");

    if let Some(suggestion) = error.suggestion() {
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_error_names_node() {
        let error = Error::capability(
            NodeKind::Analyze,
            GenerationError::Malformed("expected JSON object".to_string()),
        );

        assert_eq!(error.node(), Some(NodeKind::Analyze));
        assert!(error.to_string().starts_with("analyze failed"));
    }

    #[test]
    fn test_exhausted_retries_keeps_last_error() {
        let error = Error::ExhaustedRetries {
            attempts: 3,
            last_error: Box::new(Error::StructuralValidation {
                detail: "no such table: suspects".to_string(),
            }),
        };

        assert_eq!(error.node(), Some(NodeKind::SynthesizeValidate));
        assert!(error.to_string().contains("3 attempts"));
        assert!(error.to_string().contains("no such table: suspects"));
    }

    #[test]
    fn test_connection_detection() {
        let error = Error::capability(
            NodeKind::Execute,
            sleuth_store::Error::Connection("unable to open database file".to_string()),
        );
        assert!(error.is_connection());
        assert!(error.user_message().contains("database could not be opened"));
        assert!(error.suggestion().unwrap().contains("--db"));

        let error = Error::capability(NodeKind::Execute, CapabilityError::Timeout { secs: 5 });
        assert!(!error.is_connection());
    }

    #[test]
    fn test_transient_generation_failure_suggests_retry() {
        let error = Error::capability(
            NodeKind::Decide,
            GenerationError::Provider(sleuth_llm::Error::RateLimit),
        );
        assert!(error.suggestion().unwrap().contains("Try again"));
    }

    #[test]
    fn test_format_error_for_cli() {
        let error = Error::TurnLimitExceeded { max_turns: 12 };

        let output = format_error_for_cli(&error);
        assert!(output.contains("12 turns"));
        assert!(output.contains("--max-turns"));
    }
}

//! Values passed between workflow nodes
//!
//! - `NodeKind` names a node for logs, events and errors
//! - `Instruction` is the next retrieval goal
//! - `CandidateQuery` / `ValidationStatus` track a query inside the synthesis loop
//! - `QueryResult` pairs the statements run in a turn with their rows
//! - `TurnSummary` is the analysis of one turn
//! - `SynthesisResponse` is the one-of answer of query generation

use serde::{Deserialize, Serialize};
use sleuth_store::Row;
use std::fmt;

/// Workflow node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Choose the next fact to retrieve
    Decide,
    /// Generate and validate one query
    SynthesizeValidate,
    /// Run the validated query
    Execute,
    /// Interpret the rows and judge whether the case is solved
    Analyze,
    /// Write the final report
    Finalize,
}

impl NodeKind {
    /// Stable name used in logs and events
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decide => "decide",
            Self::SynthesizeValidate => "synthesize_validate",
            Self::Execute => "execute",
            Self::Analyze => "analyze",
            Self::Finalize => "finalize",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural-language description of the next fact to retrieve.
///
/// Never empty: construction trims the text and refuses blank input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction(String);

impl Instruction {
    /// Build an instruction, returning `None` for blank text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Instruction text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation state of a candidate query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Not yet checked
    Unvalidated,
    /// Passed the plan-only check
    Valid,
    /// Rejected, with the validator's message
    Invalid {
        /// Why the store refused the statement
        reason: String,
    },
}

/// Query text produced by the generator, plus where it stands in validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuery {
    /// Statement text as generated
    pub sql: String,
    /// Current validation state
    pub status: ValidationStatus,
}

impl CandidateQuery {
    /// Wrap freshly generated text
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            status: ValidationStatus::Unvalidated,
        }
    }

    /// Mark as accepted by the validator
    pub fn accept(&mut self) {
        self.status = ValidationStatus::Valid;
    }

    /// Mark as rejected by the validator
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.status = ValidationStatus::Invalid {
            reason: reason.into(),
        };
    }

    /// Whether the validator accepted it
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}

/// Outcome of a query-generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisResponse {
    /// Generated statement text
    Success(String),
    /// The instruction cannot be expressed as a query
    InsufficientInformation(String),
}

/// Statements run during a turn and the rows they returned
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    /// Validated statement text, in execution order
    pub queries: Vec<String>,
    /// Rows in result order
    pub rows: Vec<Row>,
}

/// Analysis of one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    /// Narrative block to append
    pub notes: String,
    /// Whether the culprit has been identified
    pub culprit_found: bool,
}

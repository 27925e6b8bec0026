use crate::types::NodeKind;
use serde::Serialize;
use uuid::Uuid;

/// Events emitted while an investigation runs.
///
/// Row data is never included; `QueryExecuted` only carries the count.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvestigationEvent {
    /// Run has started
    RunStarted {
        /// Run identifier
        run_id: Uuid,
    },
    /// A node became active
    NodeEntered {
        /// Run identifier
        run_id: Uuid,
        /// Node now active
        node: NodeKind,
        /// Turn in progress, starting at 1
        turn: usize,
    },
    /// The validator refused a candidate query
    QueryRejected {
        /// Run identifier
        run_id: Uuid,
        /// Attempt number, starting at 1
        attempt: usize,
        /// Validator message
        reason: String,
    },
    /// A candidate query passed validation
    QueryValidated {
        /// Run identifier
        run_id: Uuid,
        /// Attempt number, starting at 1
        attempt: usize,
        /// Statement text
        sql: String,
    },
    /// A validated query ran
    QueryExecuted {
        /// Run identifier
        run_id: Uuid,
        /// Statement text
        sql: String,
        /// Rows returned
        rows: usize,
        /// Execution time in milliseconds
        duration_ms: u64,
    },
    /// Analysis of a turn was appended to the narrative
    TurnCompleted {
        /// Run identifier
        run_id: Uuid,
        /// Turn number, starting at 1
        turn: usize,
        /// Whether analysis named the culprit
        culprit_found: bool,
    },
    /// Run produced its report
    RunCompleted {
        /// Run identifier
        run_id: Uuid,
        /// Turns completed
        turns: usize,
        /// Total duration in milliseconds
        duration_ms: u64,
    },
    /// Run aborted
    RunFailed {
        /// Run identifier
        run_id: Uuid,
        /// Node the failure is attributed to
        node: Option<NodeKind>,
        /// Error description
        error: String,
    },
}

impl InvestigationEvent {
    /// Run the event belongs to
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::RunStarted { run_id }
            | Self::NodeEntered { run_id, .. }
            | Self::QueryRejected { run_id, .. }
            | Self::QueryValidated { run_id, .. }
            | Self::QueryExecuted { run_id, .. }
            | Self::TurnCompleted { run_id, .. }
            | Self::RunCompleted { run_id, .. }
            | Self::RunFailed { run_id, .. } => *run_id,
        }
    }

    /// Whether this is the last event of a run
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunCompleted { .. } | Self::RunFailed { .. })
    }
}

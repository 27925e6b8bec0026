//! Orchestrator output types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Result of a completed investigation
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: Uuid,
    /// Final report text
    pub report: String,
    /// Narrative entries, seed first
    pub narrative: Vec<String>,
    /// Every statement executed, in order
    pub queries: Vec<String>,
    /// Turns completed
    pub turns: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Run duration in milliseconds
    pub duration_ms: u64,
}

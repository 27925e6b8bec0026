//! Investigation state
//!
//! The narrative is append-only: entries can be added and read, never
//! edited or removed. One state belongs to one run.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Separator used when the narrative is rendered as one document
const ENTRY_SEPARATOR: &str = "\n\n";

/// Accumulated findings of one run
#[derive(Debug)]
pub struct InvestigationState {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    entries: Vec<String>,
    turns_completed: usize,
}

impl InvestigationState {
    /// Start a run from its seed text, which becomes the first entry
    #[must_use]
    pub fn new(run_id: Uuid, seed: impl Into<String>) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            entries: vec![seed.into()],
            turns_completed: 0,
        }
    }

    /// Run identifier
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// When the run started
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Entries in append order, seed first
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries, including the seed
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a state holds at least its seed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turns that reached analysis
    #[must_use]
    pub fn turns_completed(&self) -> usize {
        self.turns_completed
    }

    /// Whole narrative as one document
    #[must_use]
    pub fn narrative(&self) -> String {
        self.entries.join(ENTRY_SEPARATOR)
    }

    /// Append the block produced by analysing a turn
    pub fn record_turn(&mut self, block: impl Into<String>) {
        self.entries.push(block.into());
        self.turns_completed += 1;
    }

    /// Consume the state, returning its entries
    #[must_use]
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

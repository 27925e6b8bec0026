//! Orchestrator configuration
//!
//! Limits are optional. With neither `max_turns` nor `max_run_secs` set, a
//! run only ends when analysis names a culprit or a node fails, so an
//! analysis step that never concludes keeps the run going indefinitely.

use crate::error::{Error, Result};
use std::time::Duration;

/// Configuration for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Generation attempts per synthesis loop (at least 1)
    pub max_synthesis_attempts: usize,
    /// Turn cap (None = no limit)
    pub max_turns: Option<usize>,
    /// Wall-clock budget for a whole run in seconds (None = no limit)
    pub max_run_secs: Option<u64>,
    /// Budget for a single capability call in seconds (0 = no limit)
    pub capability_timeout_secs: u64,
    /// Rows shown to the analysis step per turn
    pub max_rows_in_prompt: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_synthesis_attempts: 3,
            max_turns: None,
            max_run_secs: None,
            capability_timeout_secs: 120,
            max_rows_in_prompt: 200,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set synthesis attempts
    #[must_use]
    pub fn with_max_synthesis_attempts(mut self, attempts: usize) -> Self {
        self.max_synthesis_attempts = attempts;
        self
    }

    /// Set the turn cap
    #[must_use]
    pub fn with_max_turns(mut self, max: Option<usize>) -> Self {
        self.max_turns = max;
        self
    }

    /// Set the run budget
    #[must_use]
    pub fn with_max_run_secs(mut self, secs: Option<u64>) -> Self {
        self.max_run_secs = secs;
        self
    }

    /// Set the per-call budget
    #[must_use]
    pub fn with_capability_timeout_secs(mut self, secs: u64) -> Self {
        self.capability_timeout_secs = secs;
        self
    }

    /// Set the row cap for analysis
    #[must_use]
    pub fn with_max_rows_in_prompt(mut self, rows: usize) -> Self {
        self.max_rows_in_prompt = rows;
        self
    }

    /// Per-call budget as a duration
    #[must_use]
    pub fn capability_timeout(&self) -> Option<Duration> {
        (self.capability_timeout_secs > 0).then(|| Duration::from_secs(self.capability_timeout_secs))
    }

    /// Reject settings that would make every run fail immediately
    ///
    /// # Errors
    /// Returns `Error::Configuration` naming the offending field
    pub fn validate(&self) -> Result<()> {
        if self.max_synthesis_attempts == 0 {
            return Err(Error::Configuration(
                "max_synthesis_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_turns == Some(0) {
            return Err(Error::Configuration(
                "max_turns must be at least 1 when set".to_string(),
            ));
        }
        if self.max_run_secs == Some(0) {
            return Err(Error::Configuration(
                "max_run_secs must be at least 1 when set".to_string(),
            ));
        }
        if self.max_rows_in_prompt == 0 {
            return Err(Error::Configuration(
                "max_rows_in_prompt must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

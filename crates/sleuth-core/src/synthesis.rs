//! Query synthesis and validation loop
//!
//! Turns one instruction into one statement that the validator has accepted.
//! Structural rejections are fed back to the generator as corrective
//! feedback, up to a fixed number of attempts. The loop never executes
//! anything.

use crate::capability::bounded;
use crate::error::{CapabilityError, Error, Result};
use crate::event_bus::{EventBus, InvestigationEvent};
use crate::generator::{GenerationRequest, TextGenerator};
use crate::prompts;
use crate::types::{CandidateQuery, Instruction, NodeKind, SynthesisResponse, ValidationStatus};
use sleuth_store::QueryValidator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Feedback used when the generator returns blank statement text
const EMPTY_QUERY_FEEDBACK: &str = "empty query: return one complete SELECT statement";

/// Bounded generate-then-validate loop
pub struct SynthesisLoop<'a> {
    generator: &'a dyn TextGenerator,
    validator: &'a dyn QueryValidator,
    schema: Arc<str>,
    max_attempts: usize,
    call_timeout: Option<Duration>,
    events: Option<(&'a EventBus, Uuid)>,
}

impl<'a> SynthesisLoop<'a> {
    /// Create a loop allowing `max_attempts` generations (at least one)
    #[must_use]
    pub fn new(
        generator: &'a dyn TextGenerator,
        validator: &'a dyn QueryValidator,
        schema: Arc<str>,
        max_attempts: usize,
    ) -> Self {
        Self {
            generator,
            validator,
            schema,
            max_attempts: max_attempts.max(1),
            call_timeout: None,
            events: None,
        }
    }

    /// Bound each generator and validator call
    #[must_use]
    pub fn with_call_timeout(mut self, limit: Option<Duration>) -> Self {
        self.call_timeout = limit;
        self
    }

    /// Publish rejections and acceptances for `run_id`
    #[must_use]
    pub fn with_events(mut self, bus: &'a EventBus, run_id: Uuid) -> Self {
        self.events = Some((bus, run_id));
        self
    }

    fn emit(&self, event: impl FnOnce(Uuid) -> InvestigationEvent) {
        if let Some((bus, run_id)) = self.events {
            bus.publish(event(run_id));
        }
    }

    /// Produce a validated statement for `instruction`.
    ///
    /// # Errors
    ///
    /// - `InsufficientInformation` as soon as the generator declines
    /// - `ExhaustedRetries` when every attempt was structurally rejected
    /// - `Capability` when generation or the validator itself fails
    #[instrument(skip_all, fields(max_attempts = self.max_attempts))]
    pub async fn run(&self, instruction: &Instruction) -> Result<String> {
        let fail = |source: CapabilityError| Error::capability(NodeKind::SynthesizeValidate, source);
        let mut feedback: Vec<String> = Vec::new();
        let mut last_rejection = String::new();

        for attempt in 1..=self.max_attempts {
            let request = GenerationRequest::new(prompts::SYNTHESIZE)
                .with_schema(Arc::clone(&self.schema))
                .with_section("instruction", instruction.as_str())
                .with_feedback(feedback.clone());

            let response = bounded(self.call_timeout, self.generator.synthesize_query(&request))
                .await
                .map_err(fail)?;

            let mut candidate = match response {
                SynthesisResponse::InsufficientInformation(reason) => {
                    info!(attempt, reason = %reason, "Generator reported insufficient information");
                    return Err(Error::InsufficientInformation { reason });
                }
                SynthesisResponse::Success(sql) => CandidateQuery::new(sql.trim()),
            };

            if candidate.sql.is_empty() {
                candidate.reject(EMPTY_QUERY_FEEDBACK);
            } else {
                debug!(attempt, sql = %candidate.sql, "Validating candidate query");
                match bounded(self.call_timeout, self.validator.validate(&candidate.sql)).await {
                    Ok(normalized) => {
                        candidate.sql = normalized;
                        candidate.accept();
                    }
                    Err(CapabilityError::Store(sleuth_store::Error::Structural { detail })) => {
                        candidate.reject(detail)
                    }
                    Err(other) => return Err(fail(other)),
                }
            }

            match candidate.status {
                ValidationStatus::Valid => {
                    info!(attempt, sql = %candidate.sql, "Query validated");
                    let sql = candidate.sql;
                    self.emit(|run_id| InvestigationEvent::QueryValidated {
                        run_id,
                        attempt,
                        sql: sql.clone(),
                    });
                    return Ok(sql);
                }
                ValidationStatus::Invalid { reason } => {
                    warn!(attempt, reason = %reason, "Candidate query rejected");
                    self.emit(|run_id| InvestigationEvent::QueryRejected {
                        run_id,
                        attempt,
                        reason: reason.clone(),
                    });
                    feedback.push(format!("Query `{}` was rejected: {}", candidate.sql, reason));
                    last_rejection = reason;
                }
                ValidationStatus::Unvalidated => {}
            }
        }

        Err(Error::ExhaustedRetries {
            attempts: self.max_attempts,
            last_error: Box::new(Error::StructuralValidation {
                detail: last_rejection,
            }),
        })
    }
}

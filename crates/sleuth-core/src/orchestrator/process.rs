//! Orchestrator main execution loop
//!
//! Contains the `run` method: one node at a time from `Decide` until a node
//! completes the run or fails.

use crate::error::{Error, Result};
use crate::event_bus::InvestigationEvent;
use crate::nodes::{Node, NodeContext, NodeOutcome};
use crate::state::InvestigationState;
use crate::types::NodeKind;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::core::Orchestrator;
use super::types::RunReport;

impl Orchestrator {
    /// Investigate from `seed` until a report is produced.
    ///
    /// The seed becomes the first narrative entry. Each run owns a fresh
    /// state; nothing is shared between runs.
    ///
    /// # Errors
    /// Any node failure aborts the run; see [`Error`] for the variants.
    #[tracing::instrument(skip_all)]
    pub async fn run(&self, seed: impl Into<String>) -> Result<RunReport> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4();
        let mut state = InvestigationState::new(run_id, seed);
        let mut queries = Vec::new();

        info!(run_id = %run_id, "Starting investigation");
        self.emit(InvestigationEvent::RunStarted { run_id });

        let ctx = NodeContext {
            generator: self.generator.as_ref(),
            validator: self.validator.as_ref(),
            executor: self.executor.as_ref(),
            schema: &self.schema,
            config: &self.config,
            events: self.event_bus.as_deref(),
            run_id,
        };

        let outcome = self
            .drive(&ctx, &mut state, &mut queries, start_time)
            .await;
        let duration_ms = start_time.elapsed().as_millis() as u64;
        let turns = state.turns_completed();

        match outcome {
            Ok(report) => {
                info!(run_id = %run_id, turns, duration_ms, "Investigation complete");
                self.emit(InvestigationEvent::RunCompleted {
                    run_id,
                    turns,
                    duration_ms,
                });
                Ok(RunReport {
                    run_id,
                    report,
                    started_at: state.started_at(),
                    narrative: state.into_entries(),
                    queries,
                    turns,
                    duration_ms,
                })
            }
            Err(e) => {
                error!(run_id = %run_id, node = ?e.node(), turns, error = %e, "Investigation failed");
                self.emit(InvestigationEvent::RunFailed {
                    run_id,
                    node: e.node(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        ctx: &NodeContext<'_>,
        state: &mut InvestigationState,
        queries: &mut Vec<String>,
        start_time: Instant,
    ) -> Result<String> {
        // A budget too large to represent as an instant never fires
        let deadline = self.config.max_run_secs.and_then(|secs| {
            let at = start_time.checked_add(Duration::from_secs(secs));
            if at.is_none() {
                warn!(secs, "Run budget exceeds the clock range; running without a deadline");
            }
            at.map(|at| (secs, at))
        });
        let mut node = Node::Decide;

        loop {
            let kind = node.kind();
            if let Some((secs, at)) = deadline {
                if Instant::now() >= at {
                    return Err(Error::DeadlineExceeded { secs, node: kind });
                }
            }
            if let (NodeKind::Decide, Some(max_turns)) = (kind, self.config.max_turns) {
                if state.turns_completed() >= max_turns {
                    return Err(Error::TurnLimitExceeded { max_turns });
                }
            }

            // Finalize closes the last analysed turn rather than opening one
            let turn = match kind {
                NodeKind::Finalize => state.turns_completed(),
                _ => state.turns_completed() + 1,
            };
            debug!(node = %kind, turn, "Entering node");
            ctx.emit(InvestigationEvent::NodeEntered {
                run_id: ctx.run_id,
                node: kind,
                turn,
            });

            let outcome = match deadline {
                Some((secs, at)) => tokio::time::timeout_at(at, node.run(ctx, state))
                    .await
                    .map_err(|_| Error::DeadlineExceeded { secs, node: kind })??,
                None => node.run(ctx, state).await?,
            };

            node = match outcome {
                NodeOutcome::Complete(report) => return Ok(report),
                NodeOutcome::Next(next) => {
                    if let Node::Analyze(result) = &next {
                        queries.extend(result.queries.iter().cloned());
                    }
                    next
                }
            };
        }
    }
}

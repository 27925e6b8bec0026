use super::{Node, NodeContext, NodeOutcome};
use crate::capability::bounded;
use crate::error::{Error, Result};
use crate::generator::{GenerationError, GenerationRequest};
use crate::prompts;
use crate::state::InvestigationState;
use crate::types::{Instruction, NodeKind};
use std::sync::Arc;
use tracing::{info, instrument};

/// Ask for the next retrieval goal. Reads the narrative, never appends.
#[instrument(skip_all, fields(run_id = %ctx.run_id, turn = state.turns_completed() + 1))]
pub(super) async fn run(ctx: &NodeContext<'_>, state: &InvestigationState) -> Result<NodeOutcome> {
    let request = GenerationRequest::new(prompts::DECIDE)
        .with_schema(Arc::clone(ctx.schema))
        .with_section("findings_notes", state.narrative());

    let text = bounded(
        ctx.config.capability_timeout(),
        ctx.generator.next_instruction(&request),
    )
    .await
    .map_err(|e| Error::capability(NodeKind::Decide, e))?;

    let instruction = Instruction::new(text)
        .ok_or_else(|| Error::capability(NodeKind::Decide, GenerationError::Empty("instruction")))?;

    info!(instruction = %instruction, "Next step decided");
    Ok(NodeOutcome::Next(Node::SynthesizeValidate(instruction)))
}

use super::{Node, NodeContext, NodeOutcome};
use crate::error::Result;
use crate::synthesis::SynthesisLoop;
use crate::types::Instruction;
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip_all, fields(run_id = %ctx.run_id))]
pub(super) async fn run(ctx: &NodeContext<'_>, instruction: &Instruction) -> Result<NodeOutcome> {
    let mut synthesis = SynthesisLoop::new(
        ctx.generator,
        ctx.validator,
        Arc::clone(ctx.schema),
        ctx.config.max_synthesis_attempts,
    )
    .with_call_timeout(ctx.config.capability_timeout());
    if let Some(bus) = ctx.events {
        synthesis = synthesis.with_events(bus, ctx.run_id);
    }

    let sql = synthesis.run(instruction).await?;
    Ok(NodeOutcome::Next(Node::Execute(sql)))
}

use super::{NodeContext, NodeOutcome};
use crate::capability::bounded;
use crate::error::{Error, Result};
use crate::generator::GenerationRequest;
use crate::prompts;
use crate::state::InvestigationState;
use crate::types::NodeKind;
use tracing::{info, instrument};

/// Write the report from the whole narrative. Any text is accepted.
#[instrument(skip_all, fields(run_id = %ctx.run_id, entries = state.len()))]
pub(super) async fn run(ctx: &NodeContext<'_>, state: &InvestigationState) -> Result<NodeOutcome> {
    let request =
        GenerationRequest::new(prompts::REPORT).with_section("findings_notes", state.narrative());

    let report = bounded(ctx.config.capability_timeout(), ctx.generator.report(&request))
        .await
        .map_err(|e| Error::capability(NodeKind::Finalize, e))?;

    info!(report_len = report.len(), "Report written");
    Ok(NodeOutcome::Complete(report))
}

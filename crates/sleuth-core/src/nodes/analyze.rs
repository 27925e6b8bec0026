use super::{Node, NodeContext, NodeOutcome};
use crate::capability::bounded;
use crate::error::{Error, Result};
use crate::event_bus::InvestigationEvent;
use crate::generator::GenerationRequest;
use crate::prompts;
use crate::state::InvestigationState;
use crate::types::{NodeKind, QueryResult};
use sleuth_store::Row;
use tracing::{info, instrument};

/// Summarise the turn, append the summary, then branch on the culprit flag.
#[instrument(skip_all, fields(run_id = %ctx.run_id, turn = state.turns_completed() + 1, rows = result.rows.len()))]
pub(super) async fn run(
    ctx: &NodeContext<'_>,
    state: &mut InvestigationState,
    result: QueryResult,
) -> Result<NodeOutcome> {
    let turn = state.turns_completed() + 1;
    let request = GenerationRequest::new(prompts::ANALYZE)
        .with_section("turn_number", turn.to_string())
        .with_section("queries_used", result.queries.join("\n"))
        .with_section("results", render_rows(&result.rows, ctx.config.max_rows_in_prompt))
        .with_section("findings_notes", state.narrative());

    let summary = bounded(ctx.config.capability_timeout(), ctx.generator.analyze(&request))
        .await
        .map_err(|e| Error::capability(NodeKind::Analyze, e))?;

    state.record_turn(summary.notes);
    info!(turn, culprit_found = summary.culprit_found, "Turn analysed");
    ctx.emit(InvestigationEvent::TurnCompleted {
        run_id: ctx.run_id,
        turn,
        culprit_found: summary.culprit_found,
    });

    let next = if summary.culprit_found {
        Node::Finalize
    } else {
        Node::Decide
    };
    Ok(NodeOutcome::Next(next))
}

/// JSON rows, one per line, capped at `max_rows`
fn render_rows(rows: &[Row], max_rows: usize) -> String {
    if rows.is_empty() {
        return "The query returned no rows.".to_string();
    }

    let shown = &rows[..rows.len().min(max_rows)];
    let mut lines: Vec<String> = shown
        .iter()
        .map(|row| serde_json::to_string(row).unwrap_or_default())
        .collect();

    let omitted = rows.len() - shown.len();
    if omitted > 0 {
        lines.push(format!("({} more rows omitted)", omitted));
    }
    lines.join("\n")
}

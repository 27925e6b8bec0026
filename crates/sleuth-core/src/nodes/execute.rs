use super::{Node, NodeContext, NodeOutcome};
use crate::capability::bounded;
use crate::error::{Error, Result};
use crate::event_bus::InvestigationEvent;
use crate::types::{NodeKind, QueryResult};
use std::time::Instant;
use tracing::{info, instrument};

/// Run one validated statement and carry its rows to analysis.
#[instrument(skip_all, fields(run_id = %ctx.run_id))]
pub(super) async fn run(ctx: &NodeContext<'_>, sql: String) -> Result<NodeOutcome> {
    let started = Instant::now();
    let rows = bounded(ctx.config.capability_timeout(), ctx.executor.execute(&sql))
        .await
        .map_err(|e| Error::capability(NodeKind::Execute, e))?;
    let duration_ms = started.elapsed().as_millis() as u64;

    info!(rows = rows.len(), duration_ms, "Query executed");
    ctx.emit(InvestigationEvent::QueryExecuted {
        run_id: ctx.run_id,
        sql: sql.clone(),
        rows: rows.len(),
        duration_ms,
    });

    Ok(NodeOutcome::Next(Node::Analyze(QueryResult {
        queries: vec![sql],
        rows,
    })))
}

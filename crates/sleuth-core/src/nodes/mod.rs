//! Workflow nodes
//!
//! Each node receives the run context and the investigation state, makes
//! its capability calls and names its successor through `NodeOutcome`.
//!
//! ```text
//! Decide -> SynthesizeValidate -> Execute -> Analyze -> Decide | Finalize -> end
//! ```

mod analyze;
mod decide;
mod execute;
mod finalize;
mod synthesize;

use crate::error::Result;
use crate::event_bus::{EventBus, InvestigationEvent};
use crate::generator::TextGenerator;
use crate::orchestrator::OrchestratorConfig;
use crate::state::InvestigationState;
use crate::types::{Instruction, NodeKind, QueryResult};
use sleuth_store::{QueryExecutor, QueryValidator};
use std::sync::Arc;
use uuid::Uuid;

/// Active node, carrying the input it was handed
#[derive(Debug, Clone)]
pub enum Node {
    /// Choose the next retrieval goal
    Decide,
    /// Turn the instruction into a validated statement
    SynthesizeValidate(Instruction),
    /// Run the validated statement
    Execute(String),
    /// Interpret the turn's rows
    Analyze(QueryResult),
    /// Write the report
    Finalize,
}

/// What a node hands back to the orchestrator
#[derive(Debug, Clone)]
pub enum NodeOutcome {
    /// Continue with this node
    Next(Node),
    /// Run finished with this report
    Complete(String),
}

impl Node {
    /// Identity of the node
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Decide => NodeKind::Decide,
            Self::SynthesizeValidate(_) => NodeKind::SynthesizeValidate,
            Self::Execute(_) => NodeKind::Execute,
            Self::Analyze(_) => NodeKind::Analyze,
            Self::Finalize => NodeKind::Finalize,
        }
    }

    /// Run this node against the state
    pub async fn run(
        self,
        ctx: &NodeContext<'_>,
        state: &mut InvestigationState,
    ) -> Result<NodeOutcome> {
        match self {
            Self::Decide => decide::run(ctx, state).await,
            Self::SynthesizeValidate(instruction) => synthesize::run(ctx, &instruction).await,
            Self::Execute(sql) => execute::run(ctx, sql).await,
            Self::Analyze(result) => analyze::run(ctx, state, result).await,
            Self::Finalize => finalize::run(ctx, state).await,
        }
    }
}

/// Collaborators and settings shared by the nodes of one run
pub struct NodeContext<'a> {
    /// Text generation
    pub generator: &'a dyn TextGenerator,
    /// Plan-only statement check
    pub validator: &'a dyn QueryValidator,
    /// Statement execution
    pub executor: &'a dyn QueryExecutor,
    /// Schema reference text
    pub schema: &'a Arc<str>,
    /// Limits
    pub config: &'a OrchestratorConfig,
    /// Progress events, if anyone listens
    pub events: Option<&'a EventBus>,
    /// Run identifier
    pub run_id: Uuid,
}

impl NodeContext<'_> {
    pub(crate) fn emit(&self, event: InvestigationEvent) {
        if let Some(bus) = self.events {
            bus.publish(event);
        }
    }
}

//! Sleuth Core - Investigation Engine
//!
//! This crate sequences an iterative investigation over a relational store:
//! - Nodes: decide, synthesize and validate, execute, analyze, finalize
//! - Synthesis: bounded generate-then-validate loop with corrective feedback
//! - State: append-only narrative owned by one run
//! - Orchestrator: the node loop, with optional turn and time limits
//! - Events: broadcast progress for subscribers such as the CLI

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capability;
pub mod error;
pub mod event_bus;
pub mod generator;
pub mod nodes;
pub mod orchestrator;
pub mod prompts;
pub mod state;
pub mod synthesis;
pub mod types;

#[cfg(test)]
mod test_support;

pub use error::{format_error_for_cli, CapabilityError, Error, Result, UserFriendlyError};
pub use event_bus::{EventBus, InvestigationEvent};
pub use generator::{GenerationError, GenerationRequest, LlmGenerator, Section, TextGenerator};
pub use nodes::{Node, NodeContext, NodeOutcome};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunReport};
pub use state::InvestigationState;
pub use synthesis::SynthesisLoop;
pub use types::{
    CandidateQuery, Instruction, NodeKind, QueryResult, SynthesisResponse, TurnSummary,
    ValidationStatus,
};

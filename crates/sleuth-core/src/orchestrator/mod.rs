//! Orchestrator - investigation run loop
//!
//! # Module Structure
//!
//! - `types`: Run output (`RunReport`)
//! - `config`: Limits (`OrchestratorConfig`)
//! - `core`: Orchestrator struct and builder methods
//! - `process`: The node loop

mod config;
mod core;
mod process;
mod types;

#[cfg(test)]
mod tests;

pub use config::OrchestratorConfig;
pub use core::Orchestrator;
pub use types::RunReport;

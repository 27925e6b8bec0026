//! EventBus - broadcast-based progress events for investigation runs.
//!
//! The orchestrator publishes as it moves between nodes, so the CLI (or any
//! other subscriber) can follow a run without touching its state.

/// Core event bus implementation (broadcast channel).
pub mod bus;
/// Event type definitions for the run lifecycle.
pub mod types;

pub use bus::EventBus;
pub use types::InvestigationEvent;

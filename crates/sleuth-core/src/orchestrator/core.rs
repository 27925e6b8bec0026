//! Orchestrator core structure
//!
//! Contains the main `Orchestrator` struct and its builder methods.

use crate::error::Result;
use crate::event_bus::{EventBus, InvestigationEvent};
use crate::generator::TextGenerator;
use sleuth_store::{DataStore, QueryExecutor, QueryValidator};
use std::sync::Arc;

use super::config::OrchestratorConfig;

/// Drives investigation runs.
///
/// Holds no per-run state, so one orchestrator can serve concurrent runs.
pub struct Orchestrator {
    pub(crate) generator: Arc<dyn TextGenerator>,
    pub(crate) validator: Arc<dyn QueryValidator>,
    pub(crate) executor: Arc<dyn QueryExecutor>,
    pub(crate) schema: Arc<str>,
    pub(crate) event_bus: Option<Arc<EventBus>>,
    pub(crate) config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// # Errors
    /// Returns `Error::Configuration` if `config` fails validation
    pub fn new<S>(
        generator: Arc<dyn TextGenerator>,
        store: Arc<S>,
        schema: impl Into<Arc<str>>,
        config: OrchestratorConfig,
    ) -> Result<Self>
    where
        S: DataStore + 'static,
    {
        config.validate()?;
        let validator: Arc<dyn QueryValidator> = store.clone();
        let executor: Arc<dyn QueryExecutor> = store;

        Ok(Self {
            generator,
            validator,
            executor,
            schema: schema.into(),
            event_bus: None,
            config,
        })
    }

    /// Set the event bus for progress broadcasting
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Get a reference to the event bus (if set)
    #[must_use]
    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.event_bus.as_ref()
    }

    /// Active limits
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Schema reference handed to the generator
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub(crate) fn emit(&self, event: InvestigationEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

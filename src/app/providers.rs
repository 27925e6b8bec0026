//! Component construction
//!
//! Resolves the LLM provider, opens the store and assembles the orchestrator.

use super::config::{AppConfig, LlmConfig, StoreConfig};
use anyhow::{bail, Context, Result};
use sleuth_core::{EventBus, LlmGenerator, Orchestrator, TextGenerator};
use sleuth_llm::{LlmProvider, OpenAiConfig, OpenAiProvider};
use sleuth_store::SqliteStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Resolve the configured LLM provider
pub fn resolve_llm_provider(llm_config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    match llm_config.provider.as_str() {
        "openai" => {
            let mut config = OpenAiConfig::from_env()
                .context("OpenAI provider selected but OPENAI_API_KEY is not set")?
                .with_timeout(Duration::from_secs(llm_config.timeout_secs));
            if let Some(base_url) = &llm_config.base_url {
                config = config.with_base_url(base_url);
            }
            if let Some(model) = &llm_config.model {
                config = config.with_model(model);
            }
            info!(config = ?config, "Registered OpenAI provider");
            Ok(Arc::new(OpenAiProvider::new(config)))
        }
        other => bail!("Unsupported LLM provider '{}'", other),
    }
}

/// Generator over the configured provider
pub fn build_generator(llm_config: &LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    let provider = resolve_llm_provider(llm_config)?;
    let mut generator = LlmGenerator::new(provider);
    if let Some(model) = &llm_config.model {
        generator = generator.with_model(model);
    }
    if let Some(temperature) = llm_config.temperature {
        generator = generator.with_temperature(temperature);
    }
    if let Some(max_tokens) = llm_config.max_tokens {
        generator = generator.with_max_tokens(max_tokens);
    }
    info!(provider = generator.provider_name(), "Text generator ready");
    Ok(Arc::new(generator))
}

/// Open the configured database read-only
pub fn open_store(store_config: &StoreConfig) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(&store_config.database_path)
        .with_context(|| format!("Cannot use database '{}'", store_config.database_path))?
        .with_max_rows(store_config.max_rows);
    Ok(Arc::new(store))
}

/// Assemble an orchestrator from configuration
pub fn build_orchestrator(config: &AppConfig, bus: Arc<EventBus>) -> Result<Orchestrator> {
    let schema = std::fs::read_to_string(&config.schema.path)
        .with_context(|| format!("Failed to read schema file '{}'", config.schema.path))?;
    let store = open_store(&config.store)?;
    let generator = build_generator(&config.llm)?;

    let orchestrator = Orchestrator::new(
        generator,
        store,
        schema,
        config.investigation.to_orchestrator_config(),
    )?
    .with_event_bus(bus);

    info!(
        database = %config.store.database_path,
        schema = %config.schema.path,
        "Orchestrator ready"
    );
    Ok(orchestrator)
}

//! Application configuration types

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use sleuth_core::OrchestratorConfig;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub schema: SchemaConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub investigation: InvestigationConfig,
}

/// `[store]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub database_path: String,
    /// Rows fetched per statement before the rest is dropped
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

/// `[schema]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub path: String,
}

/// `[llm]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[investigation]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationConfig {
    #[serde(default = "default_max_synthesis_attempts")]
    pub max_synthesis_attempts: usize,
    /// Turn cap (unset = no limit)
    #[serde(default)]
    pub max_turns: Option<usize>,
    /// Run budget in seconds (unset = no limit)
    #[serde(default)]
    pub max_run_secs: Option<u64>,
    /// Per-call budget in seconds (0 = no limit)
    #[serde(default = "default_capability_timeout_secs")]
    pub capability_timeout_secs: u64,
    #[serde(default = "default_max_rows_in_prompt")]
    pub max_rows_in_prompt: usize,
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            max_synthesis_attempts: default_max_synthesis_attempts(),
            max_turns: None,
            max_run_secs: None,
            capability_timeout_secs: default_capability_timeout_secs(),
            max_rows_in_prompt: default_max_rows_in_prompt(),
        }
    }
}

fn default_max_rows() -> usize {
    sleuth_store::DEFAULT_MAX_ROWS
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_max_synthesis_attempts() -> usize {
    3
}
fn default_capability_timeout_secs() -> u64 {
    120
}
fn default_max_rows_in_prompt() -> usize {
    200
}

impl InvestigationConfig {
    /// Orchestrator limits for these settings
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new()
            .with_max_synthesis_attempts(self.max_synthesis_attempts)
            .with_max_turns(self.max_turns)
            .with_max_run_secs(self.max_run_secs)
            .with_capability_timeout_secs(self.capability_timeout_secs)
            .with_max_rows_in_prompt(self.max_rows_in_prompt)
    }
}

/// Known LLM provider names
const VALID_PROVIDERS: &[&str] = &["openai"];

impl AppConfig {
    /// Check values that deserialization alone cannot catch
    pub fn validate(&self) -> Result<()> {
        if !VALID_PROVIDERS.contains(&self.llm.provider.as_str()) {
            bail!(
                "Invalid provider '{}'. Valid: {}",
                self.llm.provider,
                VALID_PROVIDERS.join(", ")
            );
        }
        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                bail!("llm.temperature must be between 0.0 and 2.0 (got {})", temperature);
            }
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be at least 1");
        }
        if self.store.database_path.trim().is_empty() {
            bail!("store.database_path is empty");
        }
        if self.store.max_rows == 0 {
            bail!("store.max_rows must be at least 1");
        }
        if self.store.max_rows < self.investigation.max_rows_in_prompt {
            bail!(
                "store.max_rows ({}) is below investigation.max_rows_in_prompt ({})",
                self.store.max_rows,
                self.investigation.max_rows_in_prompt
            );
        }
        if self.schema.path.trim().is_empty() {
            bail!("schema.path is empty");
        }
        self.investigation.to_orchestrator_config().validate()?;
        Ok(())
    }
}

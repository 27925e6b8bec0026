//! Application wiring
//!
//! Configuration loading and construction of the store, generator and
//! orchestrator from it.

pub mod config;
pub mod loader;
pub mod providers;

pub use config::AppConfig;
pub use loader::{load_config, DEFAULT_CONFIG};
pub use providers::{build_generator, build_orchestrator, open_store};

//! `sleuth config`
//!
//! Prints the effective configuration after all layers are applied.

use crate::app::load_config;
use anyhow::{Context, Result};
use sleuth_llm::util::mask_api_key;

pub fn run() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;

    println!("{}", rendered.trim_end());
    println!();
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) => println!("# OPENAI_API_KEY = {}", mask_api_key(&key)),
        Err(_) => println!("# OPENAI_API_KEY is not set"),
    }
    Ok(())
}

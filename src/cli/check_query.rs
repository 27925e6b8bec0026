//! `sleuth check-query`
//!
//! Runs the plan-only validator against one statement. Useful for telling a
//! schema mismatch apart from a generation problem.

use crate::app::{load_config, open_store};
use anyhow::Result;
use sleuth_store::QueryValidator;
use std::process::ExitCode;

pub async fn run(sql: &str, db: Option<String>) -> Result<ExitCode> {
    let mut config = load_config()?;
    if let Some(db) = db {
        config.store.database_path = db;
    }
    let store = open_store(&config.store)?;

    match store.validate(sql).await {
        Ok(statement) => {
            println!("✅ valid against {}", store.path().display());
            println!("{}", statement);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_structural() => {
            println!("❌ invalid: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

//! Sleuth - iterative SQL investigation engine
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    init_tracing(cli.json_logs);

    debug!("Starting Sleuth v{}", env!("CARGO_PKG_VERSION"));
    if !std::path::Path::new(".env").exists() {
        debug!(".env file not found; using the process environment only");
    }

    cli::run(cli).await
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sleuth=info,sleuth_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries the report.
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

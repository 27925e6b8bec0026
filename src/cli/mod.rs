//! CLI module for Sleuth
//!
//! Provides commands:
//! - `investigate`: run an investigation and print the report
//! - `check-query`: run only the validator against a statement
//! - `config`: show the effective configuration

use clap::{Parser, Subcommand};
use std::process::ExitCode;

pub mod check_query;
pub mod config;
pub mod investigate;

/// Sleuth investigation CLI
#[derive(Parser, Debug)]
#[command(name = "sleuth")]
#[command(about = "Iterative SQL investigation engine driven by an LLM")]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an investigation from a case description
    Investigate(investigate::InvestigateArgs),
    /// Validate a statement against the database without running it
    CheckQuery {
        /// Statement to validate
        sql: String,
        /// Database file (overrides store.database_path)
        #[arg(long)]
        db: Option<String>,
    },
    /// Show the effective configuration
    Config,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Some(Commands::Investigate(args)) => investigate::run(args).await,
        Some(Commands::CheckQuery { sql, db }) => check_query::run(&sql, db).await,
        Some(Commands::Config) => config::run().map(|()| ExitCode::SUCCESS),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(ExitCode::SUCCESS)
        }
    }
}

//! `sleuth investigate`
//!
//! Runs one investigation, streaming progress from the event bus to stderr
//! and printing the final report to stdout.

use crate::app::{build_orchestrator, load_config};
use anyhow::Result;
use clap::Args;
use sleuth_core::{format_error_for_cli, EventBus, InvestigationEvent};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Event bus capacity for one CLI run
const EVENT_CAPACITY: usize = 256;

#[derive(Args, Debug)]
pub struct InvestigateArgs {
    /// Case description: crime type, date, location
    #[arg(long)]
    pub seed: String,
    /// Database file (overrides store.database_path)
    #[arg(long)]
    pub db: Option<String>,
    /// Schema reference file (overrides schema.path)
    #[arg(long)]
    pub schema: Option<String>,
    /// Stop after this many turns
    #[arg(long)]
    pub max_turns: Option<usize>,
    /// Stop after this many seconds
    #[arg(long)]
    pub max_run_secs: Option<u64>,
    /// Print the full run report as JSON
    #[arg(long)]
    pub json: bool,
    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn run(args: InvestigateArgs) -> Result<ExitCode> {
    let mut config = load_config()?;
    if let Some(db) = args.db {
        config.store.database_path = db;
    }
    if let Some(schema) = args.schema {
        config.schema.path = schema;
    }
    if args.max_turns.is_some() {
        config.investigation.max_turns = args.max_turns;
    }
    if args.max_run_secs.is_some() {
        config.investigation.max_run_secs = args.max_run_secs;
    }
    config.validate()?;

    let bus = Arc::new(EventBus::new(EVENT_CAPACITY));
    let orchestrator = build_orchestrator(&config, Arc::clone(&bus))?;
    let progress = (!args.quiet).then(|| spawn_progress(&bus));

    let outcome = orchestrator.run(args.seed).await;
    if let Some(handle) = progress {
        let _ = handle.await;
    }

    match outcome {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.report);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn spawn_progress(bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = describe(&event) {
                        eprintln!("{}", line);
                    }
                    if event.is_terminal() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    eprintln!("   … {} progress events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// One progress line per event, `None` for events not worth a line
fn describe(event: &InvestigationEvent) -> Option<String> {
    match event {
        InvestigationEvent::RunStarted { run_id } => {
            Some(format!("🕵️ Investigation {} started", run_id))
        }
        InvestigationEvent::NodeEntered { node, turn, .. } => {
            Some(format!("── turn {} · {}", turn, node))
        }
        InvestigationEvent::QueryRejected { attempt, reason, .. } => {
            Some(format!("   ✗ attempt {} rejected: {}", attempt, reason))
        }
        InvestigationEvent::QueryValidated { .. } => None,
        InvestigationEvent::QueryExecuted {
            sql,
            rows,
            duration_ms,
            ..
        } => Some(format!(
            "   ▶ {} ({} rows, {} ms)",
            sql.split_whitespace().collect::<Vec<_>>().join(" "),
            rows,
            duration_ms
        )),
        InvestigationEvent::TurnCompleted {
            turn,
            culprit_found,
            ..
        } => Some(if *culprit_found {
            format!("   ✔ turn {} named a culprit", turn)
        } else {
            format!("   ✔ turn {} recorded", turn)
        }),
        InvestigationEvent::RunCompleted {
            turns, duration_ms, ..
        } => Some(format!(
            "✅ Finished after {} turns in {:.1}s\n",
            turns,
            *duration_ms as f64 / 1000.0
        )),
        InvestigationEvent::RunFailed { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_core::NodeKind;
    use uuid::Uuid;

    #[test]
    fn test_describe_flattens_query_text() {
        let line = describe(&InvestigationEvent::QueryExecuted {
            run_id: Uuid::new_v4(),
            sql: "SELECT *\n  FROM crime_scene_report\n  WHERE city = 'SQL City'".to_string(),
            rows: 3,
            duration_ms: 4,
        })
        .unwrap();

        assert_eq!(
            line,
            "   ▶ SELECT * FROM crime_scene_report WHERE city = 'SQL City' (3 rows, 4 ms)"
        );
    }

    #[test]
    fn test_describe_node_and_rejection() {
        let run_id = Uuid::new_v4();
        let entered = describe(&InvestigationEvent::NodeEntered {
            run_id,
            node: NodeKind::SynthesizeValidate,
            turn: 2,
        })
        .unwrap();
        assert_eq!(entered, "── turn 2 · synthesize_validate");

        let rejected = describe(&InvestigationEvent::QueryRejected {
            run_id,
            attempt: 1,
            reason: "no such table: suspects".to_string(),
        })
        .unwrap();
        assert!(rejected.contains("no such table: suspects"));
    }

    #[test]
    fn test_describe_skips_quiet_events() {
        let run_id = Uuid::new_v4();
        assert!(describe(&InvestigationEvent::QueryValidated {
            run_id,
            attempt: 1,
            sql: "SELECT 1".to_string(),
        })
        .is_none());
        assert!(describe(&InvestigationEvent::RunFailed {
            run_id,
            node: Some(NodeKind::Analyze),
            error: "analyze failed".to_string(),
        })
        .is_none());
    }

    #[tokio::test]
    async fn test_progress_task_stops_on_terminal_event() {
        let bus = EventBus::new(16);
        let handle = spawn_progress(&bus);
        let run_id = Uuid::new_v4();

        bus.publish(InvestigationEvent::RunStarted { run_id });
        bus.publish(InvestigationEvent::RunCompleted {
            run_id,
            turns: 1,
            duration_ms: 10,
        });

        handle.await.unwrap();
    }
}

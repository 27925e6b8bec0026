//! Orchestrator tests

#[cfg(test)]
mod tests {
    use super::super::config::OrchestratorConfig;
    use super::super::core::Orchestrator;
    use crate::error::{CapabilityError, Error};
    use crate::event_bus::{EventBus, InvestigationEvent};
    use crate::generator::{GenerationError, GenerationRequest, MockTextGenerator, TextGenerator};
    use crate::test_support::ScriptedStore;
    use crate::types::{NodeKind, SynthesisResponse, TurnSummary};
    use async_trait::async_trait;
    use sleuth_store::Row;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const SEED: &str = "Case opened, location SQL City, date 2018-01-15";
    const SCHEMA: &str = "CREATE TABLE crime_scene_report (date INTEGER, type TEXT, description TEXT, city TEXT)";

    /// Generator that needs `turns` turns to find the culprit and reports the
    /// narrative it was given verbatim.
    fn solving_generator(turns: usize) -> MockTextGenerator {
        let mut generator = MockTextGenerator::new();

        let mut decided = 0;
        generator
            .expect_next_instruction()
            .times(turns)
            .returning(move |_| {
                decided += 1;
                Ok(format!("Lead {}", decided))
            });
        generator
            .expect_synthesize_query()
            .times(turns)
            .returning(|request| {
                let lead = request.section("instruction").unwrap_or_default();
                Ok(SynthesisResponse::Success(format!(
                    "SELECT * FROM crime_scene_report WHERE description LIKE '%{}%'",
                    lead
                )))
            });
        let mut analysed = 0;
        generator.expect_analyze().times(turns).returning(move |_| {
            analysed += 1;
            Ok(TurnSummary {
                notes: format!("## Turn {}", analysed),
                culprit_found: analysed == turns,
            })
        });
        generator
            .expect_report()
            .times(1)
            .returning(|request| Ok(request.section("findings_notes").unwrap_or_default().to_string()));
        generator
    }

    fn orchestrator(
        generator: impl TextGenerator + 'static,
        store: Arc<ScriptedStore>,
        config: OrchestratorConfig,
    ) -> Orchestrator {
        Orchestrator::new(Arc::new(generator), store, SCHEMA, config).unwrap()
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<InvestigationEvent>) -> Vec<InvestigationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_orchestrator_config() {
        let config = OrchestratorConfig::new()
            .with_max_turns(Some(5))
            .with_max_synthesis_attempts(2)
            .with_capability_timeout_secs(0);

        assert_eq!(config.max_turns, Some(5));
        assert_eq!(config.max_synthesis_attempts, 2);
        assert_eq!(config.capability_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_orchestrator_config_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_synthesis_attempts, 3);
        assert_eq!(config.max_turns, None);
        assert_eq!(config.max_run_secs, None);
        assert_eq!(config.max_rows_in_prompt, 200);
        assert_eq!(config.capability_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = OrchestratorConfig::new().with_max_synthesis_attempts(0);
        let result = Orchestrator::new(
            Arc::new(MockTextGenerator::new()),
            Arc::new(ScriptedStore::new()),
            SCHEMA,
            config,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));

        let config = OrchestratorConfig::new().with_max_turns(Some(0));
        assert!(config.validate().is_err());
    }

    // ── Full runs ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_run_finalizes_with_whole_narrative() {
        let store = Arc::new(ScriptedStore::new());
        let orchestrator = orchestrator(solving_generator(2), Arc::clone(&store), OrchestratorConfig::default());

        let report = orchestrator.run(SEED).await.unwrap();

        assert_eq!(report.turns, 2);
        assert_eq!(
            report.narrative,
            vec![SEED.to_string(), "## Turn 1".to_string(), "## Turn 2".to_string()]
        );
        assert_eq!(report.report, report.narrative.join("\n\n"));
        assert_eq!(report.queries.len(), 2);
        assert_eq!(report.queries, store.executed());
        assert_eq!(store.validated(), store.executed());
    }

    #[tokio::test]
    async fn test_empty_turn_without_culprit_continues() {
        let seen = Arc::new(Mutex::new(Vec::<GenerationRequest>::new()));
        let recorder = Arc::clone(&seen);

        let mut generator = MockTextGenerator::new();
        generator
            .expect_next_instruction()
            .times(2)
            .returning(move |request| {
                recorder.lock().unwrap().push(request.clone());
                Ok("Find the crime scene report".to_string())
            });
        generator
            .expect_synthesize_query()
            .returning(|_| Ok(SynthesisResponse::Success("SELECT * FROM crime_scene_report".to_string())));
        let mut analysed = 0;
        generator.expect_analyze().times(2).returning(move |_| {
            analysed += 1;
            Ok(TurnSummary {
                notes: format!("## Turn {}\nNo rows.", analysed),
                culprit_found: analysed == 2,
            })
        });
        generator.expect_report().returning(|_| Ok("closed".to_string()));

        let store = Arc::new(ScriptedStore::new());
        let report = orchestrator(generator, store, OrchestratorConfig::default())
            .run(SEED)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].section("findings_notes"), Some(SEED));
        assert_eq!(
            seen[1].section("findings_notes"),
            Some(format!("{}\n\n## Turn 1\nNo rows.", SEED).as_str())
        );
        assert_eq!(report.narrative[..2], [SEED.to_string(), "## Turn 1\nNo rows.".to_string()]);
    }

    #[tokio::test]
    async fn test_rejected_candidate_is_never_executed() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_next_instruction()
            .returning(|_| Ok("Find the crime scene report".to_string()));
        let mut attempts = 0;
        generator
            .expect_synthesize_query()
            .times(2)
            .returning(move |request| {
                attempts += 1;
                if attempts == 1 {
                    assert!(request.feedback.is_empty());
                    Ok(SynthesisResponse::Success("SELECT * FORM crime_scene_report".to_string()))
                } else {
                    assert!(request.feedback[0].contains("near \"FORM\": syntax error"));
                    Ok(SynthesisResponse::Success("SELECT * FROM crime_scene_report".to_string()))
                }
            });
        generator.expect_analyze().returning(|_| {
            Ok(TurnSummary {
                notes: "## Turn 1".to_string(),
                culprit_found: true,
            })
        });
        generator.expect_report().returning(|_| Ok("closed".to_string()));

        let store = Arc::new(ScriptedStore::new());
        store.reject_next("near \"FORM\": syntax error");
        let bus = Arc::new(EventBus::new(64));
        let mut rx = bus.subscribe();

        let report = orchestrator(generator, Arc::clone(&store), OrchestratorConfig::default())
            .with_event_bus(bus)
            .run(SEED)
            .await
            .unwrap();

        assert_eq!(report.queries, vec!["SELECT * FROM crime_scene_report".to_string()]);
        assert_eq!(store.executed(), report.queries);

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, InvestigationEvent::QueryRejected { attempt: 1, reason, .. } if reason.contains("FORM"))));
        assert!(matches!(events.first(), Some(InvestigationEvent::RunStarted { .. })));
        assert!(matches!(events.last(), Some(InvestigationEvent::RunCompleted { turns: 1, .. })));
    }

    #[tokio::test]
    async fn test_analysis_failure_aborts_naming_analyze() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_next_instruction()
            .times(1)
            .returning(|_| Ok("Find the crime scene report".to_string()));
        generator
            .expect_synthesize_query()
            .returning(|_| Ok(SynthesisResponse::Success("SELECT 1".to_string())));
        generator
            .expect_analyze()
            .times(1)
            .returning(|_| Err(GenerationError::Provider(sleuth_llm::Error::Api("overloaded".into()))));
        generator.expect_report().never();

        let store = Arc::new(ScriptedStore::new());
        store.return_rows(vec![Row::new().with("id", 1)]);
        let bus = Arc::new(EventBus::new(64));
        let mut rx = bus.subscribe();

        let err = orchestrator(generator, store, OrchestratorConfig::default())
            .with_event_bus(bus)
            .run(SEED)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Capability {
                node: NodeKind::Analyze,
                source: CapabilityError::Generation(_)
            }
        ));
        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(InvestigationEvent::RunFailed {
                node: Some(NodeKind::Analyze),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_insufficient_information_aborts_without_execution() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_next_instruction()
            .returning(|_| Ok("Check the weather that night".to_string()));
        generator.expect_synthesize_query().times(1).returning(|_| {
            Ok(SynthesisResponse::InsufficientInformation(
                "no weather table".to_string(),
            ))
        });

        let store = Arc::new(ScriptedStore::new());
        let err = orchestrator(generator, Arc::clone(&store), OrchestratorConfig::default())
            .run(SEED)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientInformation { .. }));
        assert!(store.executed().is_empty());
    }

    // ── Limits ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_turn_limit() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_next_instruction()
            .times(2)
            .returning(|_| Ok("Another lead".to_string()));
        generator
            .expect_synthesize_query()
            .returning(|_| Ok(SynthesisResponse::Success("SELECT 1".to_string())));
        generator.expect_analyze().times(2).returning(|_| {
            Ok(TurnSummary {
                notes: "Nothing conclusive".to_string(),
                culprit_found: false,
            })
        });

        let config = OrchestratorConfig::new().with_max_turns(Some(2));
        let err = orchestrator(generator, Arc::new(ScriptedStore::new()), config)
            .run(SEED)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TurnLimitExceeded { max_turns: 2 }));
        assert_eq!(err.node(), None);
    }

    /// Generator whose decide call never returns in reasonable time
    struct StalledGenerator;

    #[async_trait]
    impl TextGenerator for StalledGenerator {
        async fn next_instruction(&self, _: &GenerationRequest) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
            Ok("too late".to_string())
        }

        async fn synthesize_query(
            &self,
            _: &GenerationRequest,
        ) -> Result<SynthesisResponse, GenerationError> {
            unreachable!("decide never finishes")
        }

        async fn analyze(&self, _: &GenerationRequest) -> Result<TurnSummary, GenerationError> {
            unreachable!("decide never finishes")
        }

        async fn report(&self, _: &GenerationRequest) -> Result<String, GenerationError> {
            unreachable!("decide never finishes")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_capability_times_out() {
        let config = OrchestratorConfig::new().with_capability_timeout_secs(30);
        let err = orchestrator(StalledGenerator, Arc::new(ScriptedStore::new()), config)
            .run(SEED)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Capability {
                node: NodeKind::Decide,
                source: CapabilityError::Timeout { secs: 30 }
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_deadline() {
        let config = OrchestratorConfig::new()
            .with_capability_timeout_secs(0)
            .with_max_run_secs(Some(60));
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let err = orchestrator(StalledGenerator, Arc::new(ScriptedStore::new()), config)
            .with_event_bus(bus)
            .run(SEED)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::DeadlineExceeded {
                secs: 60,
                node: NodeKind::Decide
            }
        ));
        assert_eq!(err.node(), Some(NodeKind::Decide));

        let failed = drain(&mut rx).pop().unwrap();
        assert!(matches!(
            failed,
            InvestigationEvent::RunFailed {
                node: Some(NodeKind::Decide),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unrepresentable_run_budget_means_no_deadline() {
        let config = OrchestratorConfig::new().with_max_run_secs(Some(u64::MAX));
        assert!(config.validate().is_ok());

        let report = orchestrator(solving_generator(1), Arc::new(ScriptedStore::new()), config)
            .run(SEED)
            .await
            .unwrap();

        assert_eq!(report.turns, 1);
    }

    #[tokio::test]
    async fn test_finalize_is_reported_on_the_last_turn() {
        let bus = Arc::new(EventBus::new(64));
        let mut rx = bus.subscribe();
        let report = orchestrator(solving_generator(2), Arc::new(ScriptedStore::new()), OrchestratorConfig::default())
            .with_event_bus(bus)
            .run(SEED)
            .await
            .unwrap();

        let finalize_turn = drain(&mut rx).into_iter().find_map(|event| match event {
            InvestigationEvent::NodeEntered {
                node: NodeKind::Finalize,
                turn,
                ..
            } => Some(turn),
            _ => None,
        });
        assert_eq!(report.turns, 2);
        assert_eq!(finalize_turn, Some(2));
    }

    // ── Concurrency ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_independent_runs_do_not_share_state() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_next_instruction()
            .times(2)
            .returning(|_| Ok("Find the report".to_string()));
        generator
            .expect_synthesize_query()
            .returning(|_| Ok(SynthesisResponse::Success("SELECT 1".to_string())));
        generator.expect_analyze().times(2).returning(|request| {
            Ok(TurnSummary {
                notes: format!("Seen: {}", request.section("findings_notes").unwrap_or_default()),
                culprit_found: true,
            })
        });
        generator.expect_report().times(2).returning(|_| Ok("closed".to_string()));

        let orchestrator = orchestrator(generator, Arc::new(ScriptedStore::new()), OrchestratorConfig::default());
        let (a, b) = tokio::join!(orchestrator.run("case A"), orchestrator.run("case B"));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.narrative, vec!["case A".to_string(), "Seen: case A".to_string()]);
        assert_eq!(b.narrative, vec!["case B".to_string(), "Seen: case B".to_string()]);
    }
}

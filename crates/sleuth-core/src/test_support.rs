//! Scripted store fake for unit tests
//!
//! Validations and executions are answered from queues; an empty queue
//! accepts the statement through the read-only policy (validate) or returns
//! no rows (execute).

use async_trait::async_trait;
use sleuth_store::{check_statement, Error, QueryExecutor, QueryValidator, Result, Row};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct ScriptedStore {
    validations: Mutex<VecDeque<Result<()>>>,
    executions: Mutex<VecDeque<Result<Vec<Row>>>>,
    validated: Mutex<Vec<String>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Next validation fails structurally with `detail`
    pub(crate) fn reject_next(&self, detail: &str) {
        self.validations
            .lock()
            .unwrap()
            .push_back(Err(Error::structural(detail)));
    }

    pub(crate) fn fail_next_validation(&self, error: Error) {
        self.validations.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn return_rows(&self, rows: Vec<Row>) {
        self.executions.lock().unwrap().push_back(Ok(rows));
    }

    pub(crate) fn fail_next_execution(&self, error: Error) {
        self.executions.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn validated(&self) -> Vec<String> {
        self.validated.lock().unwrap().clone()
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryValidator for ScriptedStore {
    async fn validate(&self, statement: &str) -> Result<String> {
        let scripted = self.validations.lock().unwrap().pop_front().unwrap_or(Ok(()));
        scripted?;
        let normalized = check_statement(statement)?;
        self.validated.lock().unwrap().push(normalized.clone());
        Ok(normalized)
    }
}

#[async_trait]
impl QueryExecutor for ScriptedStore {
    async fn execute(&self, statement: &str) -> Result<Vec<Row>> {
        self.executed.lock().unwrap().push(statement.to_string());
        self.executions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

//! Text generation capability
//!
//! `TextGenerator` is the seam between the workflow and whatever produces
//! text. Each call site has its own typed answer, so nodes never parse
//! free text. `LlmGenerator` implements it over any `LlmProvider` by forcing
//! a single call to a per-site answer tool and decoding its arguments.

use crate::types::{SynthesisResponse, TurnSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use sleuth_llm::util::truncate_safe;
use sleuth_llm::{CompletionRequest, LlmProvider, Message, ToolDefinition};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Bytes of a bad response quoted in the error
const MALFORMED_EXCERPT_BYTES: usize = 200;

/// Generation failure
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Backend call failed
    #[error("generation: {0}")]
    Provider(#[from] sleuth_llm::Error),

    /// Answer did not have the requested shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Answer was blank where text is required
    #[error("empty {0} in response")]
    Empty(&'static str),
}

impl GenerationError {
    /// Whether retrying the same call later could succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_transient())
    }
}

/// Named block of dynamic content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Tag name
    pub name: &'static str,
    /// Content
    pub body: String,
}

/// Structured generation request
///
/// Task instructions and schema are fixed per call site; sections and
/// feedback carry the per-call content.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// What the generator is asked to do, including the answer shape
    pub instructions: &'static str,
    /// Schema reference, for calls that reason about the store
    pub schema: Option<Arc<str>>,
    /// Dynamic content in render order
    pub sections: Vec<Section>,
    /// Corrective feedback from earlier attempts, oldest first
    pub feedback: Vec<String>,
}

impl GenerationRequest {
    /// Create a request with the given task instructions
    #[must_use]
    pub fn new(instructions: &'static str) -> Self {
        Self {
            instructions,
            schema: None,
            sections: Vec::new(),
            feedback: Vec::new(),
        }
    }

    /// Attach the schema reference
    #[must_use]
    pub fn with_schema(mut self, schema: Arc<str>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Add a named content section
    #[must_use]
    pub fn with_section(mut self, name: &'static str, body: impl Into<String>) -> Self {
        self.sections.push(Section {
            name,
            body: body.into(),
        });
        self
    }

    /// Attach feedback from earlier attempts
    #[must_use]
    pub fn with_feedback(mut self, feedback: Vec<String>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Body of the named section, if present
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.body.as_str())
    }

    /// Instructions followed by the schema
    #[must_use]
    pub fn render_system(&self) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}\n\n<db_schema>\n{}\n</db_schema>",
                self.instructions,
                schema.trim_end()
            ),
            None => self.instructions.to_string(),
        }
    }

    /// Sections as `<name>` tagged blocks, then any feedback
    #[must_use]
    pub fn render_user(&self) -> String {
        let mut blocks: Vec<String> = self
            .sections
            .iter()
            .map(|s| format!("<{0}>\n{1}\n</{0}>", s.name, s.body))
            .collect();

        if !self.feedback.is_empty() {
            let items = self
                .feedback
                .iter()
                .enumerate()
                .map(|(i, f)| format!("{}. {}", i + 1, f))
                .collect::<Vec<_>>()
                .join("\n");
            blocks.push(format!(
                "<feedback>\nEarlier attempts were rejected:\n{}\n</feedback>",
                items
            ));
        }

        blocks.join("\n\n")
    }
}

/// Text generation capability, one method per call site
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Next retrieval goal, given the narrative
    async fn next_instruction(&self, request: &GenerationRequest)
        -> Result<String, GenerationError>;

    /// One statement for an instruction, or why none can be written
    async fn synthesize_query(
        &self,
        request: &GenerationRequest,
    ) -> Result<SynthesisResponse, GenerationError>;

    /// Narrative block and culprit judgment for a turn's rows
    async fn analyze(&self, request: &GenerationRequest) -> Result<TurnSummary, GenerationError>;

    /// Final report from the whole narrative
    async fn report(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

fn instruction_tool() -> ToolDefinition {
    ToolDefinition::new(
        "submit_instruction",
        "Submit the next retrieval goal",
        json!({
            "type": "object",
            "properties": {
                "instruction": { "type": "string", "description": "What to retrieve and why" }
            },
            "required": ["instruction"]
        }),
    )
}

fn query_tool() -> ToolDefinition {
    ToolDefinition::new(
        "submit_query",
        "Submit one read-only statement, or explain why none can be written",
        json!({
            "type": "object",
            "properties": {
                "sql_query": { "type": "string" },
                "insufficient_information": { "type": "string" }
            }
        }),
    )
}

fn analysis_tool() -> ToolDefinition {
    ToolDefinition::new(
        "submit_analysis",
        "Submit this turn's notes and whether the culprit is identified",
        json!({
            "type": "object",
            "properties": {
                "turn_notes": { "type": "string" },
                "culprit_found": { "type": "boolean" }
            },
            "required": ["turn_notes", "culprit_found"]
        }),
    )
}

fn report_tool() -> ToolDefinition {
    ToolDefinition::new(
        "submit_report",
        "Submit the final case report",
        json!({
            "type": "object",
            "properties": { "report": { "type": "string" } },
            "required": ["report"]
        }),
    )
}

#[derive(Deserialize)]
struct InstructionAnswer {
    instruction: String,
}

#[derive(Deserialize)]
struct SynthesisAnswer {
    #[serde(default)]
    sql_query: Option<String>,
    #[serde(default)]
    insufficient_information: Option<String>,
}

#[derive(Deserialize)]
struct AnalysisAnswer {
    turn_notes: String,
    culprit_found: bool,
}

#[derive(Deserialize)]
struct ReportAnswer {
    report: String,
}

/// `TextGenerator` backed by an LLM provider
pub struct LlmGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmGenerator {
    /// Use the provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: String::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token cap
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Provider name
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn complete_json<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
        answer_tool: ToolDefinition,
    ) -> Result<T, GenerationError> {
        let mut completion = CompletionRequest::new(self.model.clone())
            .with_message(Message::system(request.render_system()))
            .with_message(Message::user(request.render_user()))
            .with_answer_tool(answer_tool);
        if let Some(temperature) = self.temperature {
            completion = completion.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            completion = completion.with_max_tokens(max_tokens);
        }

        let response = self.provider.complete(completion).await?;
        let usage = response.usage.unwrap_or_default();
        debug!(
            model = %response.model,
            content_len = response.content.len(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Generation response received"
        );

        decode_answer(&response.content)
    }
}

fn decode_answer<T: DeserializeOwned>(content: &str) -> Result<T, GenerationError> {
    serde_json::from_str(content.trim()).map_err(|e| {
        GenerationError::Malformed(format!(
            "{} in {:?}",
            e,
            truncate_safe(content, MALFORMED_EXCERPT_BYTES)
        ))
    })
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    #[instrument(skip_all)]
    async fn next_instruction(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let answer: InstructionAnswer = self.complete_json(request, instruction_tool()).await?;
        Ok(answer.instruction)
    }

    #[instrument(skip_all)]
    async fn synthesize_query(
        &self,
        request: &GenerationRequest,
    ) -> Result<SynthesisResponse, GenerationError> {
        let answer: SynthesisAnswer = self.complete_json(request, query_tool()).await?;

        let reason = answer
            .insufficient_information
            .filter(|reason| !reason.trim().is_empty());
        match (answer.sql_query, reason) {
            (_, Some(reason)) => Ok(SynthesisResponse::InsufficientInformation(reason)),
            (Some(sql), None) => Ok(SynthesisResponse::Success(sql)),
            (None, None) => Err(GenerationError::Malformed(
                "expected `sql_query` or `insufficient_information`".to_string(),
            )),
        }
    }

    #[instrument(skip_all)]
    async fn analyze(&self, request: &GenerationRequest) -> Result<TurnSummary, GenerationError> {
        let answer: AnalysisAnswer = self.complete_json(request, analysis_tool()).await?;
        Ok(TurnSummary {
            notes: answer.turn_notes,
            culprit_found: answer.culprit_found,
        })
    }

    #[instrument(skip_all)]
    async fn report(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let answer: ReportAnswer = self.complete_json(request, report_tool()).await?;
        Ok(answer.report)
    }
}

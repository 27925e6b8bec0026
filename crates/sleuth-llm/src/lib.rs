//! Sleuth LLM - LLM Provider Abstraction
//!
//! This crate provides the text-generation backend for Sleuth:
//! - Provider: the `LlmProvider` trait every backend implements
//! - OpenAI: chat completions through async-openai
//! - Mock: queued responses for tests and offline runs
//! - Util: key masking and truncation helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage, ToolDefinition};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::LlmProvider;

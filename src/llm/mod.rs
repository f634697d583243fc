//! Gemini integration behind a provider trait.
//!
//! The orchestrator only sees `ChatModel`, so tests can substitute a stub
//! and the Gemini wire client stays swappable.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::tools::ToolDefinition;

/// A single function-call directive from the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Registered tool name, echoed verbatim.
    pub name: String,
    /// Arguments object as sent by the model.
    pub args: serde_json::Value,
}

/// What one model turn resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// The model asked for a tool invocation.
    FunctionCall(FunctionCall),
    /// Plain text answer.
    Text(String),
    /// Neither text nor a function call.
    Empty,
}

/// Single-turn chat model with function calling.
///
/// Each call is independent; no conversation state is carried between
/// inbound messages.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier for logs.
    fn model_name(&self) -> &str;

    /// Send one user message with the advertised tool catalog and resolve
    /// the response into a [`ModelTurn`].
    async fn generate(
        &self,
        user_text: &str,
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, LlmError>;
}

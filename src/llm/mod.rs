//! LLM capability used for classification and synthesis.
//!
//! The rest of the crate talks to the model through [`LlmBackend`]: a
//! prompt plus a tool definition in, the tool call's JSON arguments out.
//! [`OllamaBackend`] is the production implementation; tests inject a
//! deterministic stub.

pub mod classifier;
pub mod client;
pub mod synthesis;

pub use client::{OllamaBackend, OllamaConfig};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failures talking to the model service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to Ollama at {0}. Is Ollama running?")]
    Connect(String),

    #[error("Ollama API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to send request: {0}")]
    Request(String),

    #[error("failed to parse model response: {0}")]
    Parse(String),

    #[error("model returned no structured output")]
    NoStructuredOutput,
}

/// Tool definition for Ollama's tool-calling API.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

/// A model that answers prompts with structured JSON.
#[allow(async_fn_in_trait)] // Backends are used as generics, never boxed
pub trait LlmBackend {
    /// Ask the model to call `tool`; returns the call's arguments.
    async fn structured(
        &self,
        system: &str,
        prompt: &str,
        tool: &ToolDefinition,
    ) -> Result<Value, LlmError>;
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_serializes_for_ollama() {
        let tool = ToolDefinition::function("f", "does f", json!({"type": "object"}));
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "f");
        assert_eq!(value["function"]["parameters"]["type"], "object");
    }
}

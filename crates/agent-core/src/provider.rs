//! Response Generation Strategy
//!
//! The loop talks to a language model only through [`ResponseGenerator`]:
//! a [`Prompt`] goes in, a [`ModelResponse`] comes out. Transport, model
//! selection and retries live behind the trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::ResponseGenerator;
//!
//! let generator = OpenAiGenerator::from_env()?;
//! let response = generator.generate(&prompt).await?;
//! ```

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::language::Prompt;
use crate::tool::Invocation;

/// What a backend returned for one prompt
#[derive(Clone, Debug, PartialEq)]
pub enum ModelResponse {
    /// A native function call from a provider with tool-calling support
    StructuredInvocation(Invocation),

    /// Plain text, expected to hold a `{"tool", "args"}` JSON object
    RawText(String),
}

impl ModelResponse {
    /// The response as issued, for the assistant turn in memory
    pub fn as_text(&self) -> String {
        match self {
            Self::StructuredInvocation(invocation) => invocation.to_json(),
            Self::RawText(text) => text.clone(),
        }
    }
}

/// Tool-choice mode requested from function-calling backends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    #[default]
    Auto,
    Required,
    None,
}

impl ToolChoice {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Required => "required",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ToolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolChoice {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "required" => Ok(Self::Required),
            "none" => Ok(Self::None),
            other => Err(AgentError::Config(format!(
                "unknown tool choice '{other}' (expected auto, required or none)"
            ))),
        }
    }
}

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "llama-3.3-70b-versatile", "gpt-4o-mini")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Tool-choice mode
    #[serde(default)]
    pub tool_choice: ToolChoice,
}

const fn default_temperature() -> f32 {
    0.0
}
const fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            tool_choice: ToolChoice::default(),
        }
    }
}

/// Strategy trait for response generation
///
/// Implementations must not retry internally on behalf of the loop; any
/// failure is reported as an error and ends the run.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce exactly one response for `prompt`
    async fn generate(&self, prompt: &Prompt) -> Result<ModelResponse>;

    /// Short identifier for logs
    fn name(&self) -> &str {
        "generator"
    }
}

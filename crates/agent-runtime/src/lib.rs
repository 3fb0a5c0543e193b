//! # agent-runtime
//!
//! Response generators for the agent loop.
//!
//! ## Providers
//!
//! - **OpenAI-compatible** (default): any `/chat/completions` endpoint with
//!   function calling (OpenAI, Groq, Portkey, local gateways)
//!
//! `LLM_PROVIDER` picks a preset: `groq` (bearer auth, `tool_choice = auto`)
//! or `portkey` (`x-portkey-api-key` / `x-portkey-virtual-key` headers,
//! `tool_choice = required`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::openai::OpenAiGenerator;
//!
//! let generator = OpenAiGenerator::from_env()?;
//! let agent = Agent::builder()
//!     .generator(Arc::new(generator))
//!     .tools(registry)
//!     .build()?;
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiGenerator, Provider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, GenerationOptions, Memory, ModelResponse, ResponseGenerator, Result, Role,
    Tool, ToolRegistry,
};

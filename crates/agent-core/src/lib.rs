//! # agent-core
//!
//! Tool-calling agent runtime: a model is asked, one tool at a time, which
//! tool to run until it picks a terminal tool or the iteration budget runs out.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              Agent                               │
//! │  ┌────────────┐  ┌───────────────┐  ┌─────────────────────────┐  │
//! │  │ Reasoning  │──│ AgentLanguage │──│ ResponseGenerator       │  │
//! │  │   Loop     │  │ prompt/parse  │  │ (Strategy)              │  │
//! │  └────────────┘  └───────────────┘  └─────────────────────────┘  │
//! │        │                                                         │
//! │  ┌────────────┐  ┌───────────────┐  ┌─────────────────────────┐  │
//! │  │   Memory   │  │ ToolRegistry  │──│ Environment             │  │
//! │  │ (turn log) │  │ (tagged view) │  │ (fault isolation)       │  │
//! │  └────────────┘  └───────────────┘  └─────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ResponseGenerator` trait is the only link to a language model, so any
//! backend (or a scripted stub in tests) can drive the same loop.

pub mod environment;
pub mod error;
pub mod goal;
pub mod language;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use environment::{Environment, ResultEnvelope};
pub use error::{AgentError, Result};
pub use goal::Goal;
pub use language::{AgentLanguage, Prompt};
pub use message::{Content, Memory, Role, Turn};
pub use provider::{GenerationOptions, ModelResponse, ResponseGenerator, ToolChoice};
pub use reasoning::{
    Agent, AgentBuilder, AgentConfig, AgentRun, LoopState, RunOutcome, TerminationReason,
    UnknownToolPolicy,
};
pub use tool::{
    Arguments, Invocation, ParamType, ParameterSchema, Tool, ToolBuilder, ToolHandler,
    ToolRegistry, ToolSchema,
};

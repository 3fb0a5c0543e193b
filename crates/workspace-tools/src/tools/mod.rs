//! Service Kit - Agent Tools
//!
//! Concrete tools over a [`Workspace`](crate::Workspace). Each tool is a
//! stateful [`ToolHandler`](agent_core::ToolHandler) with a typed argument
//! struct its parameter schema is derived from.

mod file_ops;
mod output;
mod project;
mod system;

pub use file_ops::{ListFilesTool, ReadFileTool, SearchInFileTool};
pub use output::{OutputWritten, WriteOutputFileTool};
pub use project::ListProjectFilesTool;
pub use system::TerminateTool;

use agent_core::Arguments;
use anyhow::Context;
use serde::de::DeserializeOwned;

/// Capability tags used to build agent views
pub mod tags {
    pub const FILE_OPERATIONS: &str = "file_operations";
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const PROJECT: &str = "project";
    pub const SYSTEM: &str = "system";
}

fn parse_args<A: DeserializeOwned>(tool: &str, args: Arguments) -> anyhow::Result<A> {
    serde_json::from_value(serde_json::Value::Object(args))
        .with_context(|| format!("{tool}() argument mismatch"))
}

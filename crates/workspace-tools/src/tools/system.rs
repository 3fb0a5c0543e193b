//! Terminal tool.

use agent_core::{Arguments, Tool, ToolHandler, tool::infer_schema};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{parse_args, tags};

#[derive(Debug, Deserialize, JsonSchema)]
struct TerminateArgs {
    /// Termination message
    message: String,
}

/// Ends the run; echoes the final message back as its result
pub struct TerminateTool;

impl TerminateTool {
    pub const NAME: &'static str = "terminate";

    pub fn into_tool(self) -> agent_core::Result<Tool> {
        Tool::builder(Self::NAME)
            .description("Terminate the conversation with a helpful summary")
            .parameters(infer_schema::<TerminateArgs>())
            .terminal()
            .tag(tags::SYSTEM)
            .handler_impl(self)
            .build()
    }
}

#[async_trait]
impl ToolHandler for TerminateTool {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let args: TerminateArgs = parse_args(Self::NAME, args)?;
        Ok(Value::String(args.message))
    }
}

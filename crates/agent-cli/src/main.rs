//! game-agent
//!
//! Runs one of the built-in agents against a task and prints the transcript.

mod cli;
mod report;

use std::sync::Arc;

use agent_core::{AgentConfig, Memory};
use agent_runtime::{OpenAiConfig, OpenAiGenerator};
use clap::Parser;
use workspace_tools::Workspace;

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let args = Args::parse();
    args.init_tracing();

    // Initialize response generator
    let mut llm = OpenAiConfig::from_env_as(args.provider)?;
    if let Some(model) = &args.model {
        llm.options.model.clone_from(model);
    }
    if let Some(tool_choice) = args.tool_choice {
        llm.options.tool_choice = tool_choice;
    }
    if llm.api_key.is_empty() {
        tracing::warn!(provider = %llm.provider, "no API key set; requests will be sent unauthenticated");
    }
    tracing::info!(
        provider = %llm.provider,
        base_url = %llm.base_url,
        model = %llm.options.model,
        tool_choice = %llm.options.tool_choice,
        "using OpenAI-compatible backend"
    );
    let generator = Arc::new(OpenAiGenerator::from_config(llm)?);

    // Build the agent
    let mut config = AgentConfig::from_env()?;
    if let Some(max) = args.max_iterations {
        config.max_iterations = max;
    }
    let workspace = match &args.root {
        Some(root) => Workspace::new(root),
        None => Workspace::current_dir()?,
    };
    tracing::info!(agent = %args.agent, root = %workspace.root().display(), "preparing agent");
    let agent = args.agent.builder(generator, workspace)?.config(config).build()?;
    tracing::info!(tools = ?agent.tools().names(), "agent ready");

    let task = args.task()?;

    let mut memory = Memory::new();
    let result = agent.run(&task, &mut memory).await;

    match result {
        Ok(outcome) => {
            if args.json {
                report::print_json(&memory, Some(&outcome))?;
            } else {
                report::print_transcript(&memory);
                report::print_outcome(&outcome);
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                report::print_json(&memory, None)?;
            } else {
                report::print_transcript(&memory);
            }
            tracing::error!(error = %err, "run failed");
            anyhow::bail!(err.user_message())
        }
    }
}

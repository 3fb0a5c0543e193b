//! Command-line arguments.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use agent_core::ToolChoice;
use agent_runtime::Provider;
use workspace_tools::AgentKind;

/// Run a tool-calling agent over a local directory
#[derive(Debug, Parser)]
#[command(name = "game-agent", version, about)]
pub struct Args {
    /// Agent role: file or readme
    #[arg(short, long, default_value = "file")]
    pub agent: AgentKind,

    /// Directory the agent's tools operate in [default: working directory]
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Iteration budget (overrides AGENT_MAX_ITERATIONS)
    #[arg(short = 'n', long)]
    pub max_iterations: Option<usize>,

    /// Backend preset: groq or portkey (overrides LLM_PROVIDER)
    #[arg(short, long)]
    pub provider: Option<Provider>,

    /// Model identifier (overrides LLM_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Tool choice sent with each request: auto, required or none
    /// (overrides LLM_TOOL_CHOICE)
    #[arg(long)]
    pub tool_choice: Option<ToolChoice>,

    /// Print the transcript as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (use -v, -vv, ...)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Task for the agent; read from stdin when omitted
    pub task: Vec<String>,
}

impl Args {
    /// Initialize tracing from `RUST_LOG`, falling back to the verbosity flag
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let directive = match self.verbose {
                0 => "info",
                1 => "info,agent_core=debug,agent_runtime=debug",
                _ => "debug",
            };
            EnvFilter::new(directive)
        });

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Task from the positional words, or one line from stdin
    pub fn task(&self) -> anyhow::Result<String> {
        if !self.task.is_empty() {
            return Ok(self.task.join(" "));
        }

        eprint!("What would you like me to do? ");
        std::io::stderr().flush()?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read task from stdin")?;

        let task = line.trim();
        if task.is_empty() {
            bail!("no task given");
        }
        Ok(task.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["game-agent", "list", "the", "files"]);
        assert_eq!(args.agent, AgentKind::File);
        assert!(args.root.is_none());
        assert!(args.provider.is_none());
        assert!(args.tool_choice.is_none());
        assert_eq!(args.task().unwrap(), "list the files");
        assert!(!args.json);
    }

    #[test]
    fn test_agent_flag() {
        let args = Args::parse_from(["game-agent", "--agent", "readme", "-n", "4", "go"]);
        assert_eq!(args.agent, AgentKind::Readme);
        assert_eq!(args.max_iterations, Some(4));
    }

    #[test]
    fn test_backend_flags() {
        let args = Args::parse_from([
            "game-agent",
            "--provider",
            "portkey",
            "--tool-choice",
            "required",
            "--root",
            "/srv/project",
            "go",
        ]);
        assert_eq!(args.provider, Some(Provider::Portkey));
        assert_eq!(args.tool_choice, Some(ToolChoice::Required));
        assert_eq!(args.root, Some(PathBuf::from("/srv/project")));
    }

    #[test]
    fn test_unknown_tool_choice_is_rejected() {
        let err = Args::try_parse_from(["game-agent", "--tool-choice", "sometimes", "go"])
            .unwrap_err();
        assert!(err.to_string().contains("expected auto, required or none"));
    }

    #[test]
    fn test_unknown_agent_is_rejected() {
        let err = Args::try_parse_from(["game-agent", "--agent", "chat", "go"]).unwrap_err();
        assert!(err.to_string().contains("Available agents: file, readme"));
    }
}

//! Agent Roles
//!
//! A role is a goal preset plus a tag view over the shared workspace registry.
//! The full registry is built once per agent; each role sees only the tools
//! carrying one of its tags.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use agent_core::{Agent, AgentBuilder, Environment, Goal, ResponseGenerator, ToolRegistry};

use crate::error::ToolsError;
use crate::goals::{file_management_goals, readme_goals};
use crate::tools::{
    ListFilesTool, ListProjectFilesTool, ReadFileTool, SearchInFileTool, TerminateTool,
    WriteOutputFileTool, tags,
};
use crate::workspace::Workspace;

/// Upper bound on a single tool call
const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Build every workspace tool, tagged, in a fresh registry.
pub fn workspace_registry(workspace: &Arc<Workspace>) -> agent_core::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register_tagged(ListFilesTool::new(Arc::clone(workspace)).into_tool()?)?;
    registry.register_tagged(ReadFileTool::new(Arc::clone(workspace)).into_tool()?)?;
    registry.register_tagged(SearchInFileTool::new(Arc::clone(workspace)).into_tool()?)?;
    registry.register_tagged(ListProjectFilesTool::new(Arc::clone(workspace)).into_tool()?)?;
    registry.register_tagged(WriteOutputFileTool::new(Arc::clone(workspace)).into_tool()?)?;
    registry.register_tagged(TerminateTool.into_tool()?)?;
    Ok(registry)
}

/// Built-in agent roles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Explores and explains files in the workspace
    File,
    /// Writes a README for the project in the workspace
    Readme,
}

impl AgentKind {
    pub const ALL: [Self; 2] = [Self::File, Self::Readme];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Readme => "readme",
        }
    }

    /// Tags this role may use
    pub const fn tags(self) -> &'static [&'static str] {
        match self {
            Self::File => &[tags::FILE_OPERATIONS, tags::SYSTEM],
            Self::Readme => &[tags::PROJECT, tags::READ, tags::WRITE, tags::SYSTEM],
        }
    }

    pub fn goals(self) -> Vec<Goal> {
        match self {
            Self::File => file_management_goals(),
            Self::Readme => readme_goals(),
        }
    }

    /// Builder preloaded with this role's goals, tool view and environment
    pub fn builder(
        self,
        generator: Arc<dyn ResponseGenerator>,
        workspace: Workspace,
    ) -> agent_core::Result<AgentBuilder> {
        let workspace = Arc::new(workspace);
        let registry = workspace_registry(&workspace)?;

        Ok(Agent::builder()
            .goals(self.goals())
            .generator(generator)
            .tools(registry)
            .view(self.tags().iter().copied())
            .environment(Environment::default().with_timeout(TOOL_TIMEOUT)))
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = ToolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ToolsError::UnknownAgent(s.to_owned()))
    }
}

/// Build a ready-to-run agent of `kind` over the directory `root`.
pub fn build_agent(
    kind: AgentKind,
    generator: Arc<dyn ResponseGenerator>,
    root: impl Into<PathBuf>,
) -> agent_core::Result<Agent> {
    kind.builder(generator, Workspace::new(root))?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{ModelResponse, Prompt};
    use async_trait::async_trait;

    struct Idle;

    #[async_trait]
    impl ResponseGenerator for Idle {
        async fn generate(&self, _prompt: &Prompt) -> agent_core::Result<ModelResponse> {
            Ok(ModelResponse::RawText(String::new()))
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("file".parse::<AgentKind>().unwrap(), AgentKind::File);
        assert_eq!(" README ".parse::<AgentKind>().unwrap(), AgentKind::Readme);

        let err = "chat".parse::<AgentKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown agent type 'chat'. Available agents: file, readme"
        );
    }

    #[test]
    fn test_full_registry_is_tagged() {
        let registry = workspace_registry(&Arc::new(Workspace::new("."))).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "list_files",
                "read_file",
                "search_in_file",
                "list_project_files",
                "write_output_file",
                "terminate",
            ]
        );
        assert!(registry.tools().all(|tool| !tool.tags().is_empty()));
        assert!(registry.get("terminate").unwrap().is_terminal());
    }

    #[test]
    fn test_file_agent_view() {
        let agent = build_agent(AgentKind::File, Arc::new(Idle), ".").unwrap();
        assert_eq!(
            agent.tools().names(),
            vec!["list_files", "read_file", "search_in_file", "terminate"]
        );
        assert_eq!(agent.goals()[0].name, "file_management");
    }

    #[test]
    fn test_readme_agent_view() {
        let agent = build_agent(AgentKind::Readme, Arc::new(Idle), ".").unwrap();
        assert_eq!(
            agent.tools().names(),
            vec![
                "list_files",
                "read_file",
                "search_in_file",
                "list_project_files",
                "write_output_file",
                "terminate",
            ]
        );
        assert_eq!(agent.goals().len(), 5);
    }
}

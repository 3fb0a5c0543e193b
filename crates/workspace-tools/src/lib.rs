//! # workspace-tools
//!
//! File and project tools for the agent loop, plus the two built-in agent
//! roles that use them.
//!
//! | Tool                 | Tags                   | Terminal |
//! |----------------------|------------------------|----------|
//! | `list_files`         | file_operations, read  |          |
//! | `read_file`          | file_operations, read  |          |
//! | `search_in_file`     | file_operations, read  |          |
//! | `list_project_files` | project                |          |
//! | `write_output_file`  | write                  |          |
//! | `terminate`          | system                 | yes      |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use workspace_tools::{AgentKind, build_agent};
//!
//! let agent = build_agent(AgentKind::Readme, generator, ".")?;
//! let run = agent.run_task("Write a README for this project").await?;
//! ```

pub mod agents;
pub mod error;
pub mod goals;
pub mod tools;
pub mod workspace;

pub use agents::{AgentKind, build_agent, workspace_registry};
pub use error::{Result, ToolsError};
pub use goals::{file_management_goals, readme_goals};
pub use workspace::Workspace;

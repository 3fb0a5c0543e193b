//! Error Types for Workspace Tools

use std::path::Path;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolsError>;

#[derive(Error, Debug)]
pub enum ToolsError {
    #[error("Path escapes the workspace root: {0}")]
    OutsideRoot(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown agent type '{0}'. Available agents: file, readme")]
    UnknownAgent(String),
}

impl ToolsError {
    /// Attach `path` to an I/O failure
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

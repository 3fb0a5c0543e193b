//! Read-only file tools: listing, reading and searching.

use std::sync::Arc;

use agent_core::{Arguments, Tool, ToolHandler, tool::infer_schema};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{parse_args, tags};
use crate::error::ToolsError;
use crate::workspace::Workspace;

#[derive(Debug, Deserialize, JsonSchema)]
struct ListFilesArgs {
    /// Directory to list, relative to the workspace root (defaults to the root)
    #[serde(default)]
    dir_path: Option<String>,
}

/// Lists the entries of a directory
pub struct ListFilesTool {
    workspace: Arc<Workspace>,
}

impl ListFilesTool {
    pub const NAME: &'static str = "list_files";

    pub const fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub fn into_tool(self) -> agent_core::Result<Tool> {
        Tool::builder(Self::NAME)
            .description("List all files in the current directory")
            .parameters(infer_schema::<ListFilesArgs>())
            .tags([tags::FILE_OPERATIONS, tags::READ])
            .handler_impl(self)
            .build()
    }
}

#[async_trait]
impl ToolHandler for ListFilesTool {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let args: ListFilesArgs = parse_args(Self::NAME, args)?;
        let dir = self
            .workspace
            .resolve(args.dir_path.as_deref().unwrap_or("."))?;

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(ToolsError::io(&dir))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(ToolsError::io(&dir))? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(json!(names))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ReadFileArgs {
    /// File to read, relative to the workspace root
    file_name: String,
}

/// Returns the full text of one file
pub struct ReadFileTool {
    workspace: Arc<Workspace>,
}

impl ReadFileTool {
    pub const NAME: &'static str = "read_file";

    pub const fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub fn into_tool(self) -> agent_core::Result<Tool> {
        Tool::builder(Self::NAME)
            .description("Read the contents of a specific file")
            .parameters(infer_schema::<ReadFileArgs>())
            .tags([tags::FILE_OPERATIONS, tags::READ])
            .handler_impl(self)
            .build()
    }
}

#[async_trait]
impl ToolHandler for ReadFileTool {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let args: ReadFileArgs = parse_args(Self::NAME, args)?;
        let path = self.workspace.resolve(&args.file_name)?;

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(ToolsError::io(&path))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "read file");

        Ok(Value::String(text))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchInFileArgs {
    /// File to search, relative to the workspace root
    file_name: String,
    /// Substring to look for
    search_term: String,
}

/// Finds the lines of a file containing a term.
///
/// Returns `[line_number, trimmed_line]` pairs, 1-based.
pub struct SearchInFileTool {
    workspace: Arc<Workspace>,
}

impl SearchInFileTool {
    pub const NAME: &'static str = "search_in_file";

    pub const fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub fn into_tool(self) -> agent_core::Result<Tool> {
        Tool::builder(Self::NAME)
            .description("Search for a term in a specific file")
            .parameters(infer_schema::<SearchInFileArgs>())
            .tags([tags::FILE_OPERATIONS, tags::READ])
            .handler_impl(self)
            .build()
    }
}

fn matching_lines(text: &str, term: &str) -> Vec<(usize, String)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.contains(term))
        .map(|(i, line)| (i + 1, line.trim().to_owned()))
        .collect()
}

#[async_trait]
impl ToolHandler for SearchInFileTool {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let args: SearchInFileArgs = parse_args(Self::NAME, args)?;
        let path = self.workspace.resolve(&args.file_name)?;

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(ToolsError::io(&path))?;

        Ok(json!(matching_lines(&text, &args.search_term)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        let Value::Object(map) = value else {
            panic!("arguments must be an object")
        };
        map
    }

    fn workspace() -> (tempfile::TempDir, Arc<Workspace>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "alpha\n  beta gamma\ngamma\n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        let ws = Arc::new(Workspace::new(dir.path()));
        (dir, ws)
    }

    #[tokio::test]
    async fn test_list_files_sorted() {
        let (_dir, ws) = workspace();
        let result = ListFilesTool::new(ws).call(Arguments::new()).await.unwrap();
        assert_eq!(result, json!(["a.txt", "notes.txt"]));
    }

    #[tokio::test]
    async fn test_read_file() {
        let (_dir, ws) = workspace();
        let result = ReadFileTool::new(ws)
            .call(args(json!({"file_name": "notes.txt"})))
            .await
            .unwrap();
        assert_eq!(result, json!("alpha\n  beta gamma\ngamma\n"));
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let (_dir, ws) = workspace();
        let err = ReadFileTool::new(ws)
            .call(args(json!({"file_name": "missing.txt"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_read_outside_root_fails() {
        let (_dir, ws) = workspace();
        let err = ReadFileTool::new(ws)
            .call(args(json!({"file_name": "../etc/passwd"})))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ToolsError>().is_some());
    }

    #[tokio::test]
    async fn test_search_in_file() {
        let (_dir, ws) = workspace();
        let result = SearchInFileTool::new(ws)
            .call(args(json!({"file_name": "notes.txt", "search_term": "gamma"})))
            .await
            .unwrap();
        assert_eq!(result, json!([[2, "beta gamma"], [3, "gamma"]]));
    }

    #[test]
    fn test_inferred_schema() {
        let tool = SearchInFileTool::new(Arc::new(Workspace::new(".")))
            .into_tool()
            .unwrap();
        assert_eq!(tool.required_params(), vec!["file_name", "search_term"]);
        assert!(tool.has_any_tag(&[tags::READ.to_owned()].into()));

        let list = ListFilesTool::new(Arc::new(Workspace::new(".")))
            .into_tool()
            .unwrap();
        assert!(list.required_params().is_empty());
    }
}

//! Project source discovery.

use std::path::Path;
use std::sync::Arc;

use agent_core::{Arguments, Tool, ToolHandler, tool::infer_schema};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{parse_args, tags};
use crate::error::ToolsError;
use crate::workspace::Workspace;

/// Extensions reported as project source files
const SOURCE_EXTENSIONS: &[&str] = &["rs", "py"];

#[derive(Debug, Deserialize, JsonSchema)]
struct ListProjectFilesArgs {
    /// Directory to scan, relative to the workspace root
    dir_path: String,
}

/// Lists the source files directly inside a directory, sorted by name
pub struct ListProjectFilesTool {
    workspace: Arc<Workspace>,
}

impl ListProjectFilesTool {
    pub const NAME: &'static str = "list_project_files";

    pub const fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub fn into_tool(self) -> agent_core::Result<Tool> {
        Tool::builder(Self::NAME)
            .description("Lists all source files in the project.")
            .parameters(infer_schema::<ListProjectFilesArgs>())
            .tag(tags::PROJECT)
            .handler_impl(self)
            .build()
    }
}

fn is_source_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

#[async_trait]
impl ToolHandler for ListProjectFilesTool {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let args: ListProjectFilesArgs = parse_args(Self::NAME, args)?;
        let dir = self.workspace.resolve(&args.dir_path)?;

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(ToolsError::io(&dir))?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(ToolsError::io(&dir))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_file = entry
                .file_type()
                .await
                .map_err(ToolsError::io(&entry.path()))?
                .is_file();
            if is_file && is_source_file(&name) {
                files.push(name);
            }
        }
        files.sort();

        Ok(json!(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file("main.rs"));
        assert!(is_source_file("agent.py"));
        assert!(!is_source_file("README.md"));
        assert!(!is_source_file("rs"));
    }

    #[tokio::test]
    async fn test_lists_sorted_sources_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.py", "lib.rs", "notes.md", "alpha.py"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.rs")).unwrap();

        let tool = ListProjectFilesTool::new(Arc::new(Workspace::new(dir.path())));
        let Value::Object(args) = json!({"dir_path": "."}) else {
            unreachable!()
        };
        let result = tool.call(args).await.unwrap();

        assert_eq!(result, json!(["alpha.py", "lib.rs", "zeta.py"]));
    }
}

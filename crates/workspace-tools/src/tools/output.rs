//! Output writer.

use std::path::Path;
use std::sync::Arc;

use agent_core::{Arguments, Tool, ToolHandler, tool::infer_schema};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_args, tags};
use crate::error::ToolsError;
use crate::workspace::Workspace;

fn default_output_dir() -> String {
    "output".into()
}

#[derive(Debug, Deserialize, JsonSchema)]
struct WriteOutputFileArgs {
    /// Name of the file to create or overwrite
    filename: String,
    /// Full text to write
    content: String,
    /// Directory for generated files, relative to the workspace root
    #[serde(default = "default_output_dir")]
    output_dir: String,
}

/// Result of [`WriteOutputFileTool`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputWritten {
    /// Written path, relative to the workspace root
    pub output_path: String,
    /// UTF-8 byte length of the content
    pub bytes_written: usize,
}

/// Writes generated content into the output directory, creating it as needed
pub struct WriteOutputFileTool {
    workspace: Arc<Workspace>,
}

impl WriteOutputFileTool {
    pub const NAME: &'static str = "write_output_file";

    pub const fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }

    pub fn into_tool(self) -> agent_core::Result<Tool> {
        Tool::builder(Self::NAME)
            .description(
                "Write content to a file inside the output directory. \
                 Creates the directory if it does not exist.",
            )
            .parameters(infer_schema::<WriteOutputFileArgs>())
            .tag(tags::WRITE)
            .handler_impl(self)
            .build()
    }
}

#[async_trait]
impl ToolHandler for WriteOutputFileTool {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let args: WriteOutputFileArgs = parse_args(Self::NAME, args)?;

        let relative = Path::new(&args.output_dir).join(&args.filename);
        let relative = relative.to_string_lossy();
        let dir = self.workspace.resolve(&args.output_dir)?;
        let path = self.workspace.resolve(&relative)?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(ToolsError::io(&dir))?;
        tokio::fs::write(&path, args.content.as_bytes())
            .await
            .map_err(ToolsError::io(&path))?;

        let written = OutputWritten {
            output_path: relative.into_owned(),
            bytes_written: args.content.len(),
        };
        tracing::info!(path = %written.output_path, bytes = written.bytes_written, "wrote output file");

        Ok(serde_json::to_value(written)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        let Value::Object(map) = value else {
            panic!("arguments must be an object")
        };
        map
    }

    #[tokio::test]
    async fn test_writes_into_default_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteOutputFileTool::new(Arc::new(Workspace::new(dir.path())));

        let result = tool
            .call(args(json!({"filename": "README.md", "content": "# Título\n"})))
            .await
            .unwrap();

        let written: OutputWritten = serde_json::from_value(result).unwrap();
        assert_eq!(written.output_path, "output/README.md");
        assert_eq!(written.bytes_written, "# Título\n".len());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("output/README.md")).unwrap(),
            "# Título\n"
        );
    }

    #[tokio::test]
    async fn test_refuses_escaping_filename() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteOutputFileTool::new(Arc::new(Workspace::new(dir.path())));

        let err = tool
            .call(args(json!({"filename": "../../evil.sh", "content": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolsError>(),
            Some(ToolsError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_output_dir_is_optional() {
        let tool = WriteOutputFileTool::new(Arc::new(Workspace::new(".")))
            .into_tool()
            .unwrap();
        let mut required = tool.required_params();
        required.sort_unstable();
        assert_eq!(required, vec!["content", "filename"]);
    }
}

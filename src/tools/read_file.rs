use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::fileops::FileOps;
use super::{Tool, ToolError};

pub struct ReadFileTool {
    ops: Arc<dyn FileOps>,
}

impl ReadFileTool {
    pub fn new(ops: Arc<dyn FileOps>) -> Self {
        Self { ops }
    }
}

#[derive(Deserialize)]
struct ReadFileInput {
    path: String,
}

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of any file from the filesystem"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to read (supports ~ for home directory)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let input: ReadFileInput = serde_json::from_str(arguments)?;
        Ok(self.ops.read_file(&input.path).await?)
    }
}

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::fileops::FileOps;
use super::{Tool, ToolError};

pub struct GrepFilesTool {
    ops: Arc<dyn FileOps>,
}

impl GrepFilesTool {
    pub fn new(ops: Arc<dyn FileOps>) -> Self {
        Self { ops }
    }
}

#[derive(Deserialize)]
struct GrepFilesInput {
    pattern: String,
    path: String,
    #[serde(default)]
    ignore_case: bool,
}

#[async_trait::async_trait]
impl Tool for GrepFilesTool {
    fn name(&self) -> &str {
        "grep_files"
    }

    fn description(&self) -> &str {
        "Search for patterns in files using regex and glob patterns"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regular expression pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File path or glob pattern (e.g., '*.go', 'src/**/*.js')"
                },
                "ignore_case": {
                    "type": "boolean",
                    "description": "Perform case-insensitive search (default: false)"
                }
            },
            "required": ["pattern", "path"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let input: GrepFilesInput = serde_json::from_str(arguments)?;
        Ok(self
            .ops
            .grep_files(&input.pattern, &input.path, input.ignore_case)
            .await?)
    }
}

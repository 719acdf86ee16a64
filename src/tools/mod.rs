pub mod fileops;
pub mod grep_files;
pub mod read_file;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use fileops::FileOps;
use grep_files::GrepFilesTool;
use read_file::ReadFileTool;

/// Why a tool call could not produce a result.
///
/// The loop never propagates these; it renders them as text and hands them
/// back to the model as the tool's output.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),
    #[error("{0}")]
    Failed(String),
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(format!("{err:#}"))
    }
}

/// Definition sent to the model so it knows what tools are available.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description sent alongside the schema.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Decode the raw JSON argument string and run the tool.
    async fn execute(&self, arguments: &str) -> Result<String, ToolError>;
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(Arc::from(tool));
    }

    /// Produce definitions for the model (sent in every API request).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// Look up a tool by name and execute it with the raw argument JSON.
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownFunction(name.to_string()))?;
        tool.execute(arguments).await
    }

    /// How many tools are registered.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl ToolRegistry {
    /// Create a registry with both file-inspection tools backed by `ops`.
    pub fn with_builtins(ops: Arc<dyn FileOps>) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ReadFileTool::new(Arc::clone(&ops))));
        registry.register(Box::new(GrepFilesTool::new(ops)));
        registry
    }
}

#[cfg(test)]
mod tests;

//! MCP stdio server exposing the `consult` tool.
//!
//! stdout carries JSON-RPC, so nothing here prints; logs go to stderr through
//! `tracing`.

use anyhow::{Context, Result};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, JsonObject, ServerCapabilities, ServerInfo,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::constants::CONSULT_TOOL_NAME;
use crate::consult::{ConsultOutcome, ConsultRequest, Consultant};

const SERVER_INSTRUCTIONS: &str = "\
Consult a reasoning model on hard problems. The model can read files and grep the \
project on its own. When the prompt names source files or functions and no \
gathered_context is given, the tool replies with a list of the code it needs; \
gather it and call again with gathered_context.";

/// Arguments of the `consult` tool, as advertised in its input schema.
///
/// Calls are decoded leniently with [`ConsultArgs::from_arguments`]: only a
/// missing or non-string `prompt` is rejected, and that as an error result
/// rather than a protocol error.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConsultArgs {
    /// The question or problem to analyze
    pub prompt: String,
    /// Continue the previous conversation (default true). Set false to start fresh.
    #[serde(rename = "continue", default = "default_true")]
    pub continue_conversation: bool,
    /// JSON object with gathered code: {"files": {path: content}, "functions": {name: code}, "metadata": {key: value}}
    #[serde(default)]
    pub gathered_context: String,
    /// Ask for code context when the prompt references files or functions (default true)
    #[serde(default = "default_true")]
    pub auto_gather_context: bool,
}

fn default_true() -> bool {
    true
}

impl ConsultArgs {
    pub fn from_arguments(arguments: &JsonObject) -> Result<Self, String> {
        let prompt = match arguments.get("prompt") {
            Some(Value::String(prompt)) => prompt.clone(),
            Some(_) => return Err(r#"argument "prompt" is not a string"#.into()),
            None => return Err(r#"required argument "prompt" not found"#.into()),
        };
        Ok(Self {
            prompt,
            continue_conversation: flag(arguments, "continue"),
            gathered_context: arguments
                .get("gathered_context")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            auto_gather_context: flag(arguments, "auto_gather_context"),
        })
    }
}

/// A boolean argument that defaults to true. Strings like `"false"` and
/// numbers are accepted; anything unreadable falls back to the default.
fn flag(arguments: &JsonObject, key: &str) -> bool {
    match arguments.get(key) {
        Some(Value::Bool(value)) => *value,
        Some(Value::String(text)) => match text.as_str() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => true,
            "0" | "f" | "F" | "false" | "FALSE" | "False" => false,
            _ => true,
        },
        Some(Value::Number(n)) => n.as_f64().map_or(true, |n| n != 0.0),
        _ => true,
    }
}

impl From<ConsultArgs> for ConsultRequest {
    fn from(args: ConsultArgs) -> Self {
        Self {
            prompt: args.prompt,
            continue_conversation: args.continue_conversation,
            gathered_context: args.gathered_context,
            auto_gather_context: args.auto_gather_context,
        }
    }
}

#[derive(Clone)]
pub struct ConsultServer {
    consultant: Arc<Consultant>,
    tool_router: ToolRouter<Self>,
}

impl ConsultServer {
    pub fn new(consultant: Arc<Consultant>) -> Self {
        Self {
            consultant,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ConsultServer {
    #[tool(
        description = "Consult an expert reasoning model for deep analysis of complex problems. It can read files and search code with grep on its own, keeps the conversation across calls, and asks for code context when the prompt references files or functions.",
        input_schema = rmcp::handler::server::common::schema_for_type::<ConsultArgs>()
    )]
    pub async fn consult(
        &self,
        Parameters(arguments): Parameters<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let args = match ConsultArgs::from_arguments(&arguments) {
            Ok(args) => args,
            Err(message) => {
                warn!(error = %message, "rejected consult arguments");
                return Ok(CallToolResult::error(vec![Content::text(message)]));
            }
        };
        let result = match self.consultant.consult(args.into()).await {
            ConsultOutcome::Answer(text) | ConsultOutcome::NeedContext(text) => {
                CallToolResult::success(vec![Content::text(text)])
            }
            ConsultOutcome::Failed(message) => CallToolResult::error(vec![Content::text(message)]),
        };
        Ok(result)
    }
}

#[tool_handler]
impl ServerHandler for ConsultServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation::from_build_env();
        info.instructions = Some(SERVER_INSTRUCTIONS.into());
        info
    }
}

/// Serve `consultant` over stdin/stdout until the client disconnects.
pub async fn serve(consultant: Consultant) -> Result<()> {
    info!(tool = CONSULT_TOOL_NAME, "starting MCP server on stdio");
    let service = ConsultServer::new(Arc::new(consultant))
        .serve(rmcp::transport::stdio())
        .await
        .context("MCP handshake failed")?;
    let reason = service.waiting().await.context("MCP server task failed")?;
    info!(?reason, "MCP server stopped");
    Ok(())
}

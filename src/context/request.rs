//! The structured "context needed" reply and its plain-text rendering.

use serde::Serialize;
use std::fmt::Write;

use super::analyzer::ContextRequirements;

const CONTEXT_NEEDED_STATUS: &str = "context_needed";

const CONTEXT_NEEDED_MESSAGE: &str = "To provide accurate analysis, I need to see the actual code. \
Please gather the following context and re-call with gathered_context parameter:";

/// What kind of code the caller is asked to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    FileContent,
    FileSection,
    FunctionImplementation,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileContent => "file_content",
            Self::FileSection => "file_section",
            Self::FunctionImplementation => "function_implementation",
        }
    }
}

/// A single piece of code context the caller should gather.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextRequest {
    #[serde(rename = "type")]
    pub kind: ContextKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<String>,
    pub reason: String,
}

/// Returned instead of an answer when the prompt references code the model
/// has not been shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub context_requests: Vec<ContextRequest>,
}

/// Turn detected references into an ordered list of requests: files first,
/// then functions.
pub fn build_context_request(requirements: &ContextRequirements) -> ContextResponse {
    let files = requirements.files.iter().map(|path| {
        match requirements.line_refs.get(path) {
            Some(lines) => ContextRequest {
                kind: ContextKind::FileSection,
                path: Some(path.clone()),
                function: None,
                lines: Some(lines.clone()),
                reason: format!("lines {lines} mentioned in prompt"),
            },
            None => ContextRequest {
                kind: ContextKind::FileContent,
                path: Some(path.clone()),
                function: None,
                lines: None,
                reason: "file mentioned in prompt".into(),
            },
        }
    });

    let functions = requirements
        .functions
        .iter()
        .map(|(name, path)| ContextRequest {
            kind: ContextKind::FunctionImplementation,
            path: path.clone(),
            function: Some(name.clone()),
            lines: None,
            reason: "function referenced in prompt".into(),
        });

    ContextResponse {
        status: CONTEXT_NEEDED_STATUS,
        message: CONTEXT_NEEDED_MESSAGE,
        context_requests: files.chain(functions).collect(),
    }
}

/// Render a [`ContextResponse`] as the numbered text block returned to the
/// caller, ending with the `gathered_context` template.
pub fn format_context_request(response: &ContextResponse) -> String {
    let mut out = String::new();
    out.push_str(response.message);
    out.push_str("\n\nCONTEXT REQUESTS:\n");

    for (i, req) in response.context_requests.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "\n{}. {}", i + 1, req.kind.as_str());
        if let Some(path) = &req.path {
            let _ = writeln!(out, "   Path: {path}");
        }
        if let Some(function) = &req.function {
            let _ = writeln!(out, "   Function: {function}");
        }
        if let Some(lines) = &req.lines {
            let _ = writeln!(out, "   Lines: {lines}");
        }
        let _ = writeln!(out, "   Reason: {}", req.reason);
    }

    out.push_str("\n\nTo provide this context, please use the Read tool to gather file contents,");
    out.push_str(" then re-call this tool with the gathered_context parameter containing:");
    out.push_str("\n{\n");
    out.push_str("  \"files\": {\"path\": \"content\", ...},\n");
    out.push_str("  \"functions\": {\"name\": \"implementation\", ...},\n");
    out.push_str("  \"metadata\": {\"key\": \"value\", ...}\n");
    out.push_str("}\n");
    out
}

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt::Write;

use super::ContextError;

/// Code the caller gathered in response to a context request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatheredContext {
    pub files: IndexMap<String, String>,
    pub functions: IndexMap<String, String>,
    pub metadata: IndexMap<String, String>,
}

/// Merge gathered context into the prompt. An empty `gathered` leaves the
/// prompt untouched.
pub fn enrich_prompt(prompt: &str, gathered: &str) -> Result<String, ContextError> {
    if gathered.is_empty() {
        return Ok(prompt.to_string());
    }

    let context: GatheredContext = serde_json::from_str(gathered)?;

    let mut out = String::new();
    out.push_str("# ORIGINAL QUESTION\n\n");
    out.push_str(prompt);
    out.push_str("\n\n");

    write_section(&mut out, "RELEVANT CODE CONTEXT", "File: ", &context.files);
    write_section(&mut out, "FUNCTION IMPLEMENTATIONS", "Function: ", &context.functions);
    write_section(&mut out, "ADDITIONAL CONTEXT", "", &context.metadata);

    out.push_str("# ANALYSIS REQUEST\n\n");
    out.push_str("Given the code and context above, please answer the original question:\n\n");
    out.push_str(prompt);
    Ok(out)
}

fn write_section(out: &mut String, title: &str, label: &str, entries: &IndexMap<String, String>) {
    if entries.is_empty() {
        return;
    }
    let _ = write!(out, "# {title}\n\n");
    for (key, body) in entries {
        let _ = write!(out, "## {label}{key}\n\n```\n{body}\n```\n\n");
    }
}

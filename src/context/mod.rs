//! Pre-pass that runs before the model is called.
//!
//! A prompt that already carries gathered code is enriched and passed on. A
//! prompt that mentions code the model has not been shown is answered with a
//! request for that code instead of a model call.

pub mod analyzer;
pub mod enrich;
pub mod request;

use tracing::debug;

pub use analyzer::analyze_prompt;
pub use enrich::enrich_prompt;
pub use request::{build_context_request, format_context_request};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("invalid gathered_context JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Outcome of the pre-pass.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Send this prompt to the model.
    Proceed(String),
    /// Return this text to the caller without calling the model.
    NeedContext(String),
}

pub fn gate(prompt: &str, auto_gather: bool, gathered: &str) -> Result<GateDecision, ContextError> {
    if !gathered.is_empty() {
        let enriched = enrich_prompt(prompt, gathered)?;
        debug!(
            prompt_len = prompt.len(),
            enriched_len = enriched.len(),
            "prompt enriched with gathered context"
        );
        return Ok(GateDecision::Proceed(enriched));
    }

    if auto_gather {
        let requirements = analyze_prompt(prompt);
        if requirements.has_code_refs {
            let response = build_context_request(&requirements);
            debug!(
                files = requirements.files.len(),
                functions = requirements.functions.len(),
                requests = response.context_requests.len(),
                "code references detected, asking for context"
            );
            return Ok(GateDecision::NeedContext(format_context_request(&response)));
        }
    }

    Ok(GateDecision::Proceed(prompt.to_string()))
}

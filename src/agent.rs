//! The bounded tool-calling loop.
//!
//! [`agent_loop`] sends the prompt, and while the model keeps asking for
//! tools it runs them and sends the results back. It stops when the model
//! answers in plain text or after `max_iterations` requests. All
//! conversation changes land in the caller's [`ConversationState`], which the
//! caller commits only when this returns `Ok`.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::message::{ToolCall, ToolOutput};
use crate::provider::{ProviderAdapter, ProviderError};
use crate::session::ConversationState;
use crate::tools::ToolRegistry;

/// Why a consult call ended without an answer.
#[derive(Debug, thiserror::Error)]
pub enum ConsultError {
    /// The provider request failed. Terminal for the call.
    #[error("{api} error: {source}{}", hint_suffix(.hint))]
    Provider {
        api: &'static str,
        source: ProviderError,
        hint: Option<&'static str>,
    },
    #[error("No text content in response")]
    NoTextContent,
    #[error("Max function call iterations reached")]
    MaxIterations,
}

fn hint_suffix(hint: &Option<&'static str>) -> String {
    hint.map(|h| format!("\n\n{h}")).unwrap_or_default()
}

/// Runs one consult call to completion.
///
/// Iteration 0 starts the turn with `prompt`; every later iteration carries
/// the previous round's tool results. Tool failures never end the loop: they
/// are handed back to the model as `"Error: ..."` text.
pub async fn agent_loop(
    adapter: &ProviderAdapter,
    tools: &ToolRegistry,
    state: &mut ConversationState,
    instructions: &str,
    prompt: &str,
    max_iterations: usize,
) -> Result<String, ConsultError> {
    let definitions = tools.definitions();
    let mut results: Vec<ToolOutput> = Vec::new();

    for iteration in 0..max_iterations {
        let reply = if iteration == 0 {
            adapter
                .start_turn(state, instructions, prompt, &definitions)
                .await
        } else {
            adapter.continue_turn(state, &results, &definitions).await
        };
        let response = reply.map_err(|source| {
            warn!(iteration = iteration + 1, error = %source, "provider request failed");
            ConsultError::Provider {
                api: adapter.style().label(),
                source,
                hint: adapter.remediation_hint(),
            }
        })?;

        let calls = adapter.extract_tool_calls(&response);
        info!(iteration = iteration + 1, tool_calls = calls.len(), "model responded");

        if calls.is_empty() {
            let text = adapter.extract_final_text(&response);
            if text.is_empty() {
                warn!("response carried no text");
                return Err(ConsultError::NoTextContent);
            }
            return Ok(text);
        }

        results = execute_tools(tools, &calls).await;
    }

    warn!(max_iterations, "max iterations reached");
    Err(ConsultError::MaxIterations)
}

/// Runs every call of one round. Output order and ids follow `calls`.
async fn execute_tools(tools: &ToolRegistry, calls: &[ToolCall]) -> Vec<ToolOutput> {
    join_all(calls.iter().map(|call| async move {
        let content = match tools.execute(&call.name, &call.arguments).await {
            Ok(output) => {
                debug!(tool = %call.name, id = %call.id, result_len = output.len(), "tool succeeded");
                output
            }
            Err(e) => {
                warn!(tool = %call.name, id = %call.id, error = %e, "tool failed");
                format!("Error: {e}")
            }
        };
        ToolOutput {
            call_id: call.id.clone(),
            content,
        }
    }))
    .await
}

//! Model provider abstraction for consult-mcp.
//!
//! [`ProviderAdapter`] hides the two supported API shapes behind four
//! operations: start a turn, continue a turn with tool results, and pull tool
//! calls or final text out of a reply. The variant is chosen once at startup
//! from the resolved [`Endpoint`] and never changes per call.

mod chat;
mod client;
mod kind;
mod resolve;
mod responses;
mod types;

pub use chat::ChatCompletionsApi;
#[cfg(test)]
pub(crate) use client::scripted::ScriptedTransport;
pub use client::{HttpTransport, ProviderError, Transport};
pub use kind::ApiStyle;
pub use resolve::{resolve_endpoint, Endpoint};
pub use responses::ResponsesApi;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::message::{ToolCall, ToolOutput};
use crate::session::ConversationState;
use crate::tools::ToolDefinition;
use types::{ChoiceMessage, ResponsesResponse};

const RESPONSES_COMPATIBILITY_NOTE: &str = "\
COMPATIBILITY NOTE: This server is using the Responses API (/v1/responses), which most \
OpenAI-compatible endpoints, OpenRouter included, do not support. They only support the \
Chat Completions API (/v1/chat/completions).

Solutions:
1. Use the OpenAI API directly (set OPENAI_API_KEY without a custom base URL)
2. Set api = \"chat_completions\" in consult-mcp.toml
3. Use a provider that supports the Responses API";

/// One reply from either API shape.
#[derive(Debug, Clone)]
pub enum ModelResponse {
    Responses(ResponsesResponse),
    Chat(ChoiceMessage),
}

/// The provider strategy selected for this process.
pub enum ProviderAdapter {
    Responses(ResponsesApi),
    ChatCompletions(ChatCompletionsApi),
}

impl ProviderAdapter {
    /// Builds the adapter matching `style` on top of `transport`.
    pub fn new(style: ApiStyle, transport: Arc<dyn Transport>, model: &str) -> Self {
        match style {
            ApiStyle::Responses => Self::Responses(ResponsesApi::new(transport, model)),
            ApiStyle::ChatCompletions => {
                Self::ChatCompletions(ChatCompletionsApi::new(transport, model))
            }
        }
    }

    /// Builds the adapter for a resolved endpoint over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_endpoint(endpoint: &Endpoint, model: &str, timeout: Duration) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(
            &endpoint.base_url,
            &endpoint.api_key,
            timeout,
        )?);
        Ok(match Self::new(endpoint.style, transport, model) {
            Self::Responses(api) => {
                Self::Responses(api.with_custom_base_url(endpoint.custom_base_url))
            }
            chat => chat,
        })
    }

    pub fn style(&self) -> ApiStyle {
        match self {
            Self::Responses(_) => ApiStyle::Responses,
            Self::ChatCompletions(_) => ApiStyle::ChatCompletions,
        }
    }

    /// Sends the user's prompt on top of whatever `state` already holds.
    pub async fn start_turn(
        &self,
        state: &mut ConversationState,
        instructions: &str,
        user_text: &str,
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, ProviderError> {
        match (self, state) {
            (Self::Responses(api), ConversationState::Stateful { previous_response_id }) => api
                .start_turn(previous_response_id, instructions, user_text, tools)
                .await
                .map(ModelResponse::Responses),
            (Self::ChatCompletions(api), ConversationState::Stateless { messages }) => api
                .start_turn(messages, instructions, user_text, tools)
                .await
                .map(ModelResponse::Chat),
            _ => Err(state_mismatch()),
        }
    }

    /// Feeds one round of tool results back to the model.
    pub async fn continue_turn(
        &self,
        state: &mut ConversationState,
        results: &[ToolOutput],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse, ProviderError> {
        match (self, state) {
            (Self::Responses(api), ConversationState::Stateful { previous_response_id }) => api
                .continue_turn(previous_response_id, results, tools)
                .await
                .map(ModelResponse::Responses),
            (Self::ChatCompletions(api), ConversationState::Stateless { messages }) => api
                .continue_turn(messages, results, tools)
                .await
                .map(ModelResponse::Chat),
            _ => Err(state_mismatch()),
        }
    }

    /// Extra guidance attached to provider errors: the stateful API is rarely
    /// available behind a custom base URL.
    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            Self::Responses(api) if api.custom_base_url() => Some(RESPONSES_COMPATIBILITY_NOTE),
            _ => None,
        }
    }

    pub fn extract_tool_calls(&self, response: &ModelResponse) -> Vec<ToolCall> {
        match response {
            ModelResponse::Responses(r) => responses::extract_tool_calls(r),
            ModelResponse::Chat(m) => chat::extract_tool_calls(m),
        }
    }

    pub fn extract_final_text(&self, response: &ModelResponse) -> String {
        match response {
            ModelResponse::Responses(r) => responses::extract_final_text(r),
            ModelResponse::Chat(m) => chat::extract_final_text(m),
        }
    }
}

/// The session is always created from the adapter's own style, so this only
/// fires if the two are wired up inconsistently.
fn state_mismatch() -> ProviderError {
    ProviderError::Decode("conversation state does not match the provider".into())
}

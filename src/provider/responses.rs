//! Stateful adapter for the OpenAI Responses API.
//!
//! The server stores every turn. The only state kept locally is the id of
//! the most recent response, sent back as `previous_response_id`.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::client::{ProviderError, Transport};
use super::types::{InputItem, ResponsesRequest, ResponsesResponse, ResponsesTool};
use crate::constants::RESPONSES_PATH;
use crate::message::{Role, ToolCall, ToolOutput};
use crate::tools::ToolDefinition;

pub struct ResponsesApi {
    transport: Arc<dyn Transport>,
    model: String,
    /// Talking to something other than api.openai.com, which may not
    /// implement this API at all.
    custom_base_url: bool,
}

impl ResponsesApi {
    pub fn new(transport: Arc<dyn Transport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
            custom_base_url: false,
        }
    }

    pub fn with_custom_base_url(mut self, custom_base_url: bool) -> Self {
        self.custom_base_url = custom_base_url;
        self
    }

    pub fn custom_base_url(&self) -> bool {
        self.custom_base_url
    }

    /// Send the user's prompt, continuing from `token` when it holds an id.
    pub async fn start_turn(
        &self,
        token: &mut Option<String>,
        instructions: &str,
        user_text: &str,
        tools: &[ToolDefinition],
    ) -> Result<ResponsesResponse, ProviderError> {
        let body = to_body(&ResponsesRequest {
            model: &self.model,
            instructions: Some(instructions),
            input: vec![InputItem::Message {
                role: Role::User,
                content: user_text,
            }],
            tools: tools.iter().map(ResponsesTool::from).collect(),
            previous_response_id: token.as_deref(),
        })?;
        self.send(body, token).await
    }

    /// Hand tool results back, chained onto the response that asked for them.
    pub async fn continue_turn(
        &self,
        token: &mut Option<String>,
        results: &[ToolOutput],
        tools: &[ToolDefinition],
    ) -> Result<ResponsesResponse, ProviderError> {
        let body = to_body(&ResponsesRequest {
            model: &self.model,
            instructions: None,
            input: results.iter().map(InputItem::from).collect(),
            tools: tools.iter().map(ResponsesTool::from).collect(),
            previous_response_id: token.as_deref(),
        })?;
        self.send(body, token).await
    }

    async fn send(
        &self,
        body: Value,
        token: &mut Option<String>,
    ) -> Result<ResponsesResponse, ProviderError> {
        let raw = self.transport.post_json(RESPONSES_PATH, body).await?;
        let response: ResponsesResponse =
            serde_json::from_value(raw).map_err(|e| ProviderError::Decode(e.to_string()))?;
        if response.id.is_empty() {
            return Err(ProviderError::Decode("response has no id".into()));
        }
        debug!(
            id = %response.id,
            status = response.status.as_deref().unwrap_or("unknown"),
            output_items = response.output.len(),
            "received response"
        );
        *token = Some(response.id.clone());
        Ok(response)
    }
}

/// Every `function_call` output item, in order.
pub fn extract_tool_calls(response: &ResponsesResponse) -> Vec<ToolCall> {
    response
        .output
        .iter()
        .filter(|item| item.kind == "function_call")
        .map(|item| ToolCall {
            id: item.call_id.clone(),
            name: item.name.clone(),
            arguments: item.arguments.clone(),
        })
        .collect()
}

/// The text parts of every `message` output item, joined by newlines.
pub fn extract_final_text(response: &ResponsesResponse) -> String {
    response
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .flat_map(|item| &item.content)
        .filter(|part| part.kind == "text" || part.kind == "output_text")
        .map(|part| part.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_body(request: &impl Serialize) -> Result<Value, ProviderError> {
    serde_json::to_value(request).map_err(|e| ProviderError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::client::scripted::ScriptedTransport;
    use serde_json::json;

    fn api(transport: &Arc<ScriptedTransport>) -> ResponsesApi {
        ResponsesApi::new(transport.clone(), "gpt-5-pro")
    }

    fn tools() -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: "read_file".into(),
            description: "Read a file".into(),
            parameters: json!({"type": "object"}),
        }]
    }

    #[tokio::test]
    async fn test_fresh_start_omits_previous_response_id() {
        let transport = Arc::new(ScriptedTransport::new([json!({"id": "resp_1"})]));
        let mut token = None;
        api(&transport)
            .start_turn(&mut token, "be thorough", "hello", &tools())
            .await
            .unwrap();

        let (path, body) = &transport.requests()[0];
        assert_eq!(path, "responses");
        assert_eq!(body["model"], "gpt-5-pro");
        assert_eq!(body["instructions"], "be thorough");
        assert_eq!(
            body["input"],
            json!([{"type": "message", "role": "user", "content": "hello"}])
        );
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["name"], "read_file");
        assert!(body.get("previous_response_id").is_none());
        assert_eq!(token.as_deref(), Some("resp_1"));
    }

    #[tokio::test]
    async fn test_continuing_sends_token_and_outputs() {
        let transport = Arc::new(ScriptedTransport::new([json!({"id": "resp_3"})]));
        let mut token = Some("resp_2".to_string());
        let results = vec![
            ToolOutput {
                call_id: "call_a".into(),
                content: "first".into(),
            },
            ToolOutput {
                call_id: "call_b".into(),
                content: "Error: boom".into(),
            },
        ];
        api(&transport)
            .continue_turn(&mut token, &results, &tools())
            .await
            .unwrap();

        let (_, body) = &transport.requests()[0];
        assert_eq!(body["previous_response_id"], "resp_2");
        assert!(body.get("instructions").is_none());
        assert_eq!(body["input"][0]["call_id"], "call_a");
        assert_eq!(body["input"][1]["output"], "Error: boom");
        assert_eq!(token.as_deref(), Some("resp_3"));
    }

    #[tokio::test]
    async fn test_failure_leaves_token_alone() {
        let transport = Arc::new(ScriptedTransport::default().then_fail(
            ProviderError::Status {
                status: 500,
                message: "boom".into(),
            },
        ));
        let mut token = Some("resp_1".to_string());
        let err = api(&transport)
            .start_turn(&mut token, "", "hi", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 500, .. }));
        assert_eq!(token.as_deref(), Some("resp_1"));
    }

    #[test]
    fn test_extract_tool_calls_and_text() {
        let response: ResponsesResponse = serde_json::from_value(json!({
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "function_call", "call_id": "c1", "name": "read_file", "arguments": "{\"path\":\"a\"}"},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "first"},
                    {"type": "refusal", "refusal": "no"},
                    {"type": "text", "text": "second"}
                ]},
                {"type": "message", "content": [{"type": "output_text", "text": "third"}]}
            ]
        }))
        .unwrap();

        let calls = extract_tool_calls(&response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "c1");
        assert_eq!(calls[0].arguments, r#"{"path":"a"}"#);
        assert_eq!(extract_final_text(&response), "first\nsecond\nthird");
    }

    #[test]
    fn test_empty_output_is_not_a_fault() {
        let response = ResponsesResponse::default();
        assert!(extract_tool_calls(&response).is_empty());
        assert_eq!(extract_final_text(&response), "");
    }
}

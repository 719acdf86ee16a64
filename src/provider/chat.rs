//! Stateless adapter for OpenAI-compatible Chat Completions endpoints.
//!
//! The message list is the conversation. Every request resends all of it,
//! and every assistant reply is appended to it as soon as it arrives.

use std::sync::Arc;
use tracing::debug;

use super::client::{ProviderError, Transport};
use super::types::{ChatMessage, ChatRequest, ChatResponse, ChatTool, ChoiceMessage};
use crate::constants::CHAT_COMPLETIONS_PATH;
use crate::message::{Message, ToolCall, ToolOutput};
use crate::tools::ToolDefinition;

pub struct ChatCompletionsApi {
    transport: Arc<dyn Transport>,
    model: String,
}

impl ChatCompletionsApi {
    pub fn new(transport: Arc<dyn Transport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    /// Seed the system turn when `messages` is empty, add the user turn, and
    /// send the whole list.
    pub async fn start_turn(
        &self,
        messages: &mut Vec<Message>,
        instructions: &str,
        user_text: &str,
        tools: &[ToolDefinition],
    ) -> Result<ChoiceMessage, ProviderError> {
        if messages.is_empty() {
            messages.push(Message::system(instructions));
        }
        messages.push(Message::user(user_text));
        self.send(messages, tools).await
    }

    /// Append one tool message per result and send the whole list.
    pub async fn continue_turn(
        &self,
        messages: &mut Vec<Message>,
        results: &[ToolOutput],
        tools: &[ToolDefinition],
    ) -> Result<ChoiceMessage, ProviderError> {
        messages.extend(results.iter().map(Message::tool_result));
        self.send(messages, tools).await
    }

    async fn send(
        &self,
        messages: &mut Vec<Message>,
        tools: &[ToolDefinition],
    ) -> Result<ChoiceMessage, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(ChatMessage::from).collect(),
            tools: tools.iter().map(ChatTool::from).collect(),
        };
        let body =
            serde_json::to_value(&request).map_err(|e| ProviderError::Decode(e.to_string()))?;

        let raw = self.transport.post_json(CHAT_COMPLETIONS_PATH, body).await?;
        let response: ChatResponse =
            serde_json::from_value(raw).map_err(|e| ProviderError::Decode(e.to_string()))?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::NoChoices)?;
        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            tool_calls = choice.message.tool_calls.len(),
            content_len = choice.message.content.len(),
            history_len = messages.len(),
            "received completion"
        );

        let reply = choice.message;
        messages.push(if reply.tool_calls.is_empty() {
            Message::assistant(reply.content.clone())
        } else {
            Message::assistant_with_tools(reply.content.clone(), extract_tool_calls(&reply))
        });
        Ok(reply)
    }
}

pub fn extract_tool_calls(reply: &ChoiceMessage) -> Vec<ToolCall> {
    reply.tool_calls.iter().cloned().map(ToolCall::from).collect()
}

pub fn extract_final_text(reply: &ChoiceMessage) -> String {
    reply.content.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::provider::client::scripted::ScriptedTransport;
    use serde_json::json;

    fn api(transport: &Arc<ScriptedTransport>) -> ChatCompletionsApi {
        ChatCompletionsApi::new(transport.clone(), "openai/gpt-5-pro")
    }

    fn text_reply(text: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]})
    }

    #[tokio::test]
    async fn test_system_turn_only_on_empty_history() {
        let transport = Arc::new(ScriptedTransport::new([text_reply("a"), text_reply("b")]));
        let api = api(&transport);
        let mut messages = Vec::new();

        api.start_turn(&mut messages, "sys", "first", &[]).await.unwrap();
        api.start_turn(&mut messages, "sys", "second", &[]).await.unwrap();

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );

        let (path, body) = &transport.requests()[1];
        assert_eq!(path, "chat/completions");
        assert_eq!(body["messages"].as_array().unwrap().len(), 4);
        assert_eq!(body["messages"][2]["content"], "a");
        assert!(body.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_tool_round_keeps_calls_on_assistant_turn() {
        let transport = Arc::new(ScriptedTransport::new([
            json!({"choices": [{"message": {"content": null, "tool_calls": [
                {"id": "c1", "type": "function", "function": {"name": "read_file", "arguments": "{}"}}
            ]}}]}),
            text_reply("done"),
        ]));
        let api = api(&transport);
        let mut messages = Vec::new();

        let reply = api.start_turn(&mut messages, "sys", "q", &[]).await.unwrap();
        let calls = extract_tool_calls(&reply);
        assert_eq!(calls[0].id, "c1");

        let results = vec![ToolOutput {
            call_id: "c1".into(),
            content: "contents".into(),
        }];
        let reply = api.continue_turn(&mut messages, &results, &[]).await.unwrap();
        assert_eq!(extract_final_text(&reply), "done");

        let (_, body) = &transport.requests()[1];
        let wire = body["messages"].as_array().unwrap();
        assert_eq!(wire[2]["tool_calls"][0]["id"], "c1");
        assert_eq!(wire[3]["role"], "tool");
        assert_eq!(wire[3]["tool_call_id"], "c1");
        assert_eq!(messages.last().unwrap().content, "done");
    }

    #[tokio::test]
    async fn test_zero_choices_is_an_error() {
        let transport = Arc::new(ScriptedTransport::new([json!({"choices": []})]));
        let mut messages = Vec::new();
        let err = api(&transport)
            .start_turn(&mut messages, "sys", "q", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoChoices));
        assert_eq!(err.to_string(), "No response from API");
    }
}

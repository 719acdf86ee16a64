//! Which upstream API shape to speak.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// The two provider API shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStyle {
    /// Stateful `POST /responses`; the server keeps the conversation and
    /// hands back a continuation id.
    Responses,
    /// Stateless `POST /chat/completions`; the full history is resent on
    /// every request.
    ChatCompletions,
}

impl ApiStyle {
    /// Parses an API style name. Matching is case-insensitive and accepts
    /// `-` or `_` as separator.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "responses" => Ok(Self::Responses),
            "chat_completions" | "chat" => Ok(Self::ChatCompletions),
            other => Err(anyhow!(
                "Unknown API style: {other}. Supported: responses, chat_completions"
            )),
        }
    }

    /// Label used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Responses => "OpenAI Responses API",
            Self::ChatCompletions => "Chat Completions API",
        }
    }
}

impl std::fmt::Display for ApiStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Responses => write!(f, "responses"),
            Self::ChatCompletions => write!(f, "chat_completions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(ApiStyle::from_str("Responses").unwrap(), ApiStyle::Responses);
        assert_eq!(
            ApiStyle::from_str("chat-completions").unwrap(),
            ApiStyle::ChatCompletions
        );
        assert!(ApiStyle::from_str("completions").is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for style in [ApiStyle::Responses, ApiStyle::ChatCompletions] {
            assert_eq!(ApiStyle::from_str(&style.to_string()).unwrap(), style);
        }
    }
}

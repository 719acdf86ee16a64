//! Conversation state carried between consult calls.
//!
//! One [`Session`] lives for the whole process. The tool-calling loop never
//! touches it directly: it works on a [`ConversationState`] snapshot and the
//! caller commits that snapshot back only when the loop succeeds.

use crate::message::Message;
use crate::provider::ApiStyle;

/// What the provider needs to continue a conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    /// The server keeps the history; we keep the id of the last response.
    Stateful { previous_response_id: Option<String> },
    /// We keep the history and resend all of it.
    Stateless { messages: Vec<Message> },
}

impl ConversationState {
    /// An empty state matching the given API style.
    pub fn fresh(style: ApiStyle) -> Self {
        match style {
            ApiStyle::Responses => Self::Stateful {
                previous_response_id: None,
            },
            ApiStyle::ChatCompletions => Self::Stateless {
                messages: Vec::new(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Stateful {
                previous_response_id,
            } => previous_response_id.is_none(),
            Self::Stateless { messages } => messages.is_empty(),
        }
    }

    /// Drop everything while keeping the variant.
    pub fn clear(&mut self) {
        match self {
            Self::Stateful {
                previous_response_id,
            } => *previous_response_id = None,
            Self::Stateless { messages } => messages.clear(),
        }
    }
}

/// The process-wide conversation. Guard it with a lock held for the whole
/// call; see [`crate::consult::Consultant`].
#[derive(Debug)]
pub struct Session {
    state: ConversationState,
}

impl Session {
    pub fn new(style: ApiStyle) -> Self {
        Self {
            state: ConversationState::fresh(style),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// A copy the loop can mutate freely.
    pub fn draft(&self) -> ConversationState {
        self.state.clone()
    }

    /// Replace the stored state with a successful draft.
    pub fn commit(&mut self, draft: ConversationState) {
        self.state = draft;
    }
}

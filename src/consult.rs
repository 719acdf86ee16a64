//! One consult call from arguments to answer.
//!
//! [`Consultant`] owns everything a call needs: the provider adapter, the
//! file tools, and the single [`Session`]. Calls are serialized on the
//! session lock, which stays held from reading the prior state to committing
//! the new one.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::agent::agent_loop;
use crate::config::Config;
use crate::context::{gate, GateDecision};
use crate::provider::{resolve_endpoint, Endpoint, ProviderAdapter};
use crate::session::Session;
use crate::tools::fileops::LocalFileOps;
use crate::tools::ToolRegistry;

/// Arguments of one consult call.
#[derive(Debug, Clone)]
pub struct ConsultRequest {
    pub prompt: String,
    /// Build on the previous exchange instead of starting over.
    pub continue_conversation: bool,
    /// JSON with the code the caller gathered, or empty.
    pub gathered_context: String,
    /// Ask for code context when the prompt references code.
    pub auto_gather_context: bool,
}

impl ConsultRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            continue_conversation: true,
            gathered_context: String::new(),
            auto_gather_context: true,
        }
    }
}

/// How a call ended. All three are returned to the caller as text.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsultOutcome {
    Answer(String),
    NeedContext(String),
    Failed(String),
}

pub struct Consultant {
    adapter: ProviderAdapter,
    tools: ToolRegistry,
    session: Mutex<Session>,
    instructions: String,
    max_iterations: usize,
}

impl Consultant {
    pub fn new(
        adapter: ProviderAdapter,
        tools: ToolRegistry,
        instructions: impl Into<String>,
        max_iterations: usize,
    ) -> Self {
        let session = Mutex::new(Session::new(adapter.style()));
        Self {
            adapter,
            tools,
            session,
            instructions: instructions.into(),
            max_iterations,
        }
    }

    /// Wires up the HTTP provider and local file tools from config.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is configured or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<(Self, Endpoint)> {
        let endpoint = resolve_endpoint(config)?;
        let adapter =
            ProviderAdapter::from_endpoint(&endpoint, &config.model, config.request_timeout())?;

        let ops = LocalFileOps::new(config.files_root()?)
            .unrestricted(config.files_unrestricted())
            .with_limits(config.max_read_bytes(), config.max_matches());
        let tools = ToolRegistry::with_builtins(Arc::new(ops));

        info!(
            provider = endpoint.provider,
            api = %endpoint.style,
            base_url = %endpoint.base_url,
            model = %config.model,
            "provider configured"
        );
        let consultant = Self::new(
            adapter,
            tools,
            config.system_prompt(),
            config.max_iterations(),
        );
        Ok((consultant, endpoint))
    }

    /// Runs one call: gate the prompt, then drive the tool-calling loop on a
    /// draft of the session and commit it only on success.
    #[instrument(skip_all, fields(call_id = %Uuid::new_v4()))]
    pub async fn consult(&self, request: ConsultRequest) -> ConsultOutcome {
        info!(
            prompt_len = request.prompt.len(),
            continue_conversation = request.continue_conversation,
            auto_gather = request.auto_gather_context,
            has_context = !request.gathered_context.is_empty(),
            "consult request"
        );

        if request.prompt.trim().is_empty() {
            return ConsultOutcome::Failed("prompt must not be empty".into());
        }

        let prompt = match gate(
            &request.prompt,
            request.auto_gather_context,
            &request.gathered_context,
        ) {
            Ok(GateDecision::Proceed(prompt)) => prompt,
            Ok(GateDecision::NeedContext(text)) => {
                info!("returning context request");
                return ConsultOutcome::NeedContext(text);
            }
            Err(e) => {
                error!(error = %e, "gathered context rejected");
                return ConsultOutcome::Failed(format!("Failed to process gathered_context: {e}"));
            }
        };

        let mut session = self.session.lock().await;
        let mut draft = session.draft();
        if !request.continue_conversation {
            info!("starting fresh conversation");
            draft.clear();
        } else if !draft.is_empty() {
            info!("continuing previous conversation");
        }

        match agent_loop(
            &self.adapter,
            &self.tools,
            &mut draft,
            &self.instructions,
            &prompt,
            self.max_iterations,
        )
        .await
        {
            Ok(answer) => {
                session.commit(draft);
                info!(answer_len = answer.len(), "consult finished");
                ConsultOutcome::Answer(answer)
            }
            Err(e) => {
                error!(error = %e, "consult failed");
                ConsultOutcome::Failed(e.to_string())
            }
        }
    }
}

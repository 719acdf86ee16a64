//! Centralized constants for consult-mcp.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in directory paths and the MCP server info.
pub const APP_NAME: &str = "consult-mcp";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-5-pro";

/// Name of the single tool exposed over MCP.
pub const CONSULT_TOOL_NAME: &str = "consult";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "consult-mcp.toml";

// --- Provider defaults ---

/// Base URL for the official OpenAI API.
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Base URL used for OpenRouter when `OPENROUTER_BASE_URL` is unset.
pub const OPENROUTER_DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Path of the stateful Responses endpoint, relative to the base URL.
pub const RESPONSES_PATH: &str = "responses";

/// Path of the stateless Chat Completions endpoint, relative to the base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Reasoning models can take minutes to answer.
pub const REQUEST_TIMEOUT_SECS_DEFAULT: u64 = 600;

// --- Tool-calling loop ---

/// Maximum number of model requests per consult call.
pub const MAX_ITERATIONS: usize = 10;

/// Instructions sent with the first turn of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an expert problem-solving assistant, consulted for the most challenging and complex problems.

Your role is to provide deep, systematic analysis through multi-step reasoning:

1. **Problem Decomposition**: Break complex problems into manageable components
2. **Hypothesis Generation**: Form clear theories about root causes or solutions
3. **Evidence Gathering**: Identify what information is needed and what it tells you
4. **Systematic Investigation**: Work through the problem methodically, step by step
5. **Confidence Assessment**: Be honest about how certain you are at each stage

Question assumptions, consider multiple perspectives, acknowledge uncertainty, and finish with concrete, actionable next steps.

**Available Tools**:
- read_file: Read the contents of a file from the filesystem
- grep_files: Search for a regex pattern in files selected by a path or glob pattern

Use these tools proactively to gather evidence and verify your hypotheses before answering.";

// --- Tool limits ---

/// Maximum file size (bytes) the read_file tool will read.
pub const READ_FILE_MAX_SIZE: u64 = 100 * 1024;

/// Byte threshold for binary file detection (check first N bytes for null).
pub const BINARY_DETECTION_BYTES: usize = 8192;

/// Maximum number of matching lines the grep_files tool returns.
pub const GREP_MAX_MATCHES: usize = 50;

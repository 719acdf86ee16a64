//! Struct definitions and serde defaults for consult-mcp configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::provider::ApiStyle;

/// Root configuration, deserialized from `config.toml` or `consult-mcp.toml`.
///
/// Every field is optional so the server runs with no config file at all.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model identifier sent with every request (e.g. `"gpt-5-pro"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Force an API shape instead of deriving it from the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiStyle>,
    /// Upper bound on model requests per consult call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    /// HTTP timeout for a single provider request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Replaces the built-in instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Per-provider credentials and endpoints.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Sandbox and limits for the file tools.
    #[serde(default)]
    pub files: FilesConfig,
}

/// Returns the default model identifier.
///
/// Used by serde's `#[serde(default)]` attribute during deserialization.
pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

/// Provider-specific configuration map.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    /// OpenAI, or any OpenAI-compatible endpoint via `base_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<ProviderEntry>,
    /// OpenRouter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter: Option<ProviderEntry>,
}

/// Connection details for a single provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// API key. The matching environment variable takes precedence.
    pub api_key: Option<String>,
    /// Custom base URL (proxies, compatible gateways).
    pub base_url: Option<String>,
}

/// Where and how much the file tools may read.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FilesConfig {
    /// Directory relative paths resolve against. Defaults to the working
    /// directory the server was started in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Allow paths outside `root`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unrestricted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_read_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_matches: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api: None,
            max_iterations: None,
            request_timeout_secs: None,
            system_prompt: None,
            provider: ProviderConfig::default(),
            files: FilesConfig::default(),
        }
    }
}

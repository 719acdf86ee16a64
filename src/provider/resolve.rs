//! Endpoint resolution for consult-mcp.
//!
//! Picks the credential, base URL, and API shape from the environment and
//! config. OpenAI is preferred; OpenRouter is the fallback.

use anyhow::{bail, Result};

use super::kind::ApiStyle;
use crate::config::Config;
use crate::constants::{OPENAI_DEFAULT_BASE_URL, OPENROUTER_DEFAULT_BASE_URL};

/// Where and how to talk to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// `"openai"` or `"openrouter"`.
    pub provider: &'static str,
    pub api_key: String,
    pub base_url: String,
    /// The base URL is not the official OpenAI endpoint.
    pub custom_base_url: bool,
    pub style: ApiStyle,
}

/// Resolve the endpoint from process environment and config.
pub fn resolve_endpoint(config: &Config) -> Result<Endpoint> {
    resolve_endpoint_with(config, |name| std::env::var(name).ok())
}

/// Priority for each setting: environment variable, then config.
///
/// With an OpenAI key, no base URL means the official Responses API and a
/// custom base URL means Chat Completions. With only an OpenRouter key, Chat
/// Completions is always used. `config.api` overrides the derived style.
pub fn resolve_endpoint_with(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Endpoint> {
    let pick = |var: &str, fallback: &Option<String>| {
        non_empty(env(var)).or_else(|| non_empty(fallback.clone()))
    };
    let openai = config.provider.openai.clone().unwrap_or_default();
    let openrouter = config.provider.openrouter.clone().unwrap_or_default();

    let endpoint = if let Some(api_key) = pick("OPENAI_API_KEY", &openai.api_key) {
        match pick("OPENAI_BASE_URL", &openai.base_url) {
            Some(base_url) => Endpoint {
                provider: "openai",
                api_key,
                base_url,
                custom_base_url: true,
                style: ApiStyle::ChatCompletions,
            },
            None => Endpoint {
                provider: "openai",
                api_key,
                base_url: OPENAI_DEFAULT_BASE_URL.to_string(),
                custom_base_url: false,
                style: ApiStyle::Responses,
            },
        }
    } else if let Some(api_key) = pick("OPENROUTER_API_KEY", &openrouter.api_key) {
        Endpoint {
            provider: "openrouter",
            api_key,
            base_url: pick("OPENROUTER_BASE_URL", &openrouter.base_url)
                .unwrap_or_else(|| OPENROUTER_DEFAULT_BASE_URL.to_string()),
            custom_base_url: true,
            style: ApiStyle::ChatCompletions,
        }
    } else {
        bail!("Either OPENAI_API_KEY or OPENROUTER_API_KEY environment variable is required");
    };

    Ok(Endpoint {
        style: config.api.unwrap_or(endpoint.style),
        ..endpoint
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

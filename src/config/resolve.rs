//! Environment variable substitution and effective settings.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use super::types::{Config, ProviderEntry};
use crate::constants::{
    DEFAULT_SYSTEM_PROMPT, GREP_MAX_MATCHES, MAX_ITERATIONS, READ_FILE_MAX_SIZE,
    REQUEST_TIMEOUT_SECS_DEFAULT,
};

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = Self::resolve_str(&self.model);
        if let Some(ref mut sp) = self.system_prompt {
            *sp = Self::resolve_str(sp);
        }
        Self::resolve_provider_entry(&mut self.provider.openai);
        Self::resolve_provider_entry(&mut self.provider.openrouter);
        if let Some(ref mut root) = self.files.root {
            *root = PathBuf::from(Self::resolve_str(&root.to_string_lossy()));
        }
    }

    /// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
    fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = Self::resolve_str(key);
            }
            if let Some(ref mut url) = e.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            let Some(end) = result[start..].find('}') else {
                break;
            };
            let var_name = &result[start + 5..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        }
        result
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(MAX_ITERATIONS).max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS_DEFAULT))
    }

    /// Instructions for the model, falling back to the built-in prompt.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Directory the file tools are rooted at.
    pub fn files_root(&self) -> Result<PathBuf> {
        match &self.files.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().context("Could not determine working directory"),
        }
    }

    pub fn files_unrestricted(&self) -> bool {
        self.files.unrestricted.unwrap_or(false)
    }

    pub fn max_read_bytes(&self) -> u64 {
        self.files.max_read_bytes.unwrap_or(READ_FILE_MAX_SIZE)
    }

    pub fn max_matches(&self) -> usize {
        self.files.max_matches.unwrap_or(GREP_MAX_MATCHES)
    }

    /// A copy safe to print: API keys are masked.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        for entry in [&mut copy.provider.openai, &mut copy.provider.openrouter]
            .into_iter()
            .flatten()
        {
            if let Some(key) = entry.api_key.as_mut() {
                *key = redact(key);
            }
        }
        copy
    }
}

/// Keep just enough of a secret to recognise it.
pub fn redact(secret: &str) -> String {
    let count = secret.chars().count();
    match count {
        0 => String::new(),
        1..=8 => "****".to_string(),
        _ => {
            let tail: String = secret.chars().skip(count - 4).collect();
            format!("****{tail}")
        }
    }
}

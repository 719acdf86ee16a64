//! File loading and merging for consult-mcp configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{default_model, Config, FilesConfig, ProviderConfig, ProviderEntry};

impl Config {
    /// Loads the global config from `~/.config/consult-mcp/config.toml`.
    ///
    /// A missing file yields the defaults. The file is never created:
    /// stdout belongs to the MCP transport and the server must start
    /// without side effects.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(&path)
    }

    /// Parses a single TOML config file.
    pub(super) fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Look for consult-mcp.toml in `start`, then walk up to the git root.
    pub(super) fn find_project(start: PathBuf) -> Option<PathBuf> {
        let mut dir = start;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                return None;
            }
        }
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            api: project.api.or(global.api),
            max_iterations: project.max_iterations.or(global.max_iterations),
            request_timeout_secs: project.request_timeout_secs.or(global.request_timeout_secs),
            system_prompt: project.system_prompt.or(global.system_prompt),
            provider: ProviderConfig {
                openai: merge_entry(project.provider.openai, global.provider.openai),
                openrouter: merge_entry(project.provider.openrouter, global.provider.openrouter),
            },
            files: FilesConfig {
                root: project.files.root.or(global.files.root),
                unrestricted: project.files.unrestricted.or(global.files.unrestricted),
                max_read_bytes: project.files.max_read_bytes.or(global.files.max_read_bytes),
                max_matches: project.files.max_matches.or(global.files.max_matches),
            },
        }
    }
}

fn merge_entry(project: Option<ProviderEntry>, global: Option<ProviderEntry>) -> Option<ProviderEntry> {
    match (project, global) {
        (Some(p), Some(g)) => Some(ProviderEntry {
            api_key: p.api_key.or(g.api_key),
            base_url: p.base_url.or(g.base_url),
        }),
        (p, g) => p.or(g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ApiStyle;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("");
        assert_eq!(config.model, "gpt-5-pro");
        assert!(config.api.is_none());
        assert!(config.provider.openai.is_none());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
model = "o3-pro"
api = "chat_completions"
max_iterations = 4

[provider.openai]
base_url = "https://proxy.example/v1"

[files]
root = "/srv/code"
unrestricted = true
"#,
        );
        assert_eq!(config.model, "o3-pro");
        assert_eq!(config.api, Some(ApiStyle::ChatCompletions));
        assert_eq!(config.max_iterations, Some(4));
        assert_eq!(
            config.provider.openai.unwrap().base_url.as_deref(),
            Some("https://proxy.example/v1")
        );
        assert_eq!(config.files.root, Some(PathBuf::from("/srv/code")));
        assert_eq!(config.files.unrestricted, Some(true));
    }

    #[test]
    fn test_project_wins_and_providers_merge_per_field() {
        let global = parse(
            r#"
model = "o3-pro"
system_prompt = "global"
[provider.openai]
api_key = "global-key"
base_url = "https://global.example/v1"
"#,
        );
        let project = parse(
            r#"
system_prompt = "project"
[provider.openai]
base_url = "https://project.example/v1"
"#,
        );
        let merged = Config::merge(global, project);
        // Project left model at the default, so the global choice survives.
        assert_eq!(merged.model, "o3-pro");
        assert_eq!(merged.system_prompt.as_deref(), Some("project"));
        let openai = merged.provider.openai.unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("global-key"));
        assert_eq!(openai.base_url.as_deref(), Some("https://project.example/v1"));
    }

    #[test]
    fn test_find_project_stops_at_git_root() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        let nested = repo.join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(repo.join(".git")).unwrap();
        // Above the git root, must not be found.
        fs::write(dir.path().join("consult-mcp.toml"), "").unwrap();

        assert_eq!(Config::find_project(nested.clone()), None);

        fs::write(repo.join("consult-mcp.toml"), "model = \"x\"").unwrap();
        assert_eq!(
            Config::find_project(nested),
            Some(repo.join("consult-mcp.toml"))
        );
    }

    #[test]
    fn test_load_file_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "model = ").unwrap();
        let err = Config::load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }
}

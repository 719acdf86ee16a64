//! Configuration types and loading for consult-mcp.
//!
//! Settings are TOML, read from the platform's XDG config path
//! (`~/.config/consult-mcp/config.toml` on Linux) and overlaid by a
//! `consult-mcp.toml` found between the working directory and the git root.
//! Neither file is required.

mod loader;
mod paths;
mod resolve;
pub mod types;

pub use resolve::redact;
pub use types::Config;

use anyhow::Result;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load config with precedence: project > global > defaults.
    ///
    /// An explicit `path` replaces both files.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading explicit config");
                Self::load_file(path)?
            }
            None => {
                let global = Self::load_global()?;
                let project = std::env::current_dir()
                    .ok()
                    .and_then(Self::find_project);
                match project {
                    Some(project_path) => {
                        debug!(path = %project_path.display(), "merging project config");
                        Self::merge(global, Self::load_file(&project_path)?)
                    }
                    None => global,
                }
            }
        };

        config.resolve_substitutions();
        Ok(config)
    }
}

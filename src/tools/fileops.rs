//! File-inspection capabilities the model can reach through the tools.
//!
//! [`FileOps`] is the seam the tools call through; [`LocalFileOps`] is the
//! filesystem implementation used by the server. Paths resolve against a root
//! directory and, unless the instance is unrestricted, must stay inside it.

use anyhow::{bail, Context, Result};
use regex::{Regex, RegexBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{BINARY_DETECTION_BYTES, GREP_MAX_MATCHES, READ_FILE_MAX_SIZE};

/// The two file operations exposed to the model.
#[async_trait::async_trait]
pub trait FileOps: Send + Sync {
    /// Return the full text of a file.
    async fn read_file(&self, path: &str) -> Result<String>;

    /// Search files selected by `path` (a file, directory, or glob) for lines
    /// matching `pattern`.
    async fn grep_files(&self, pattern: &str, path: &str, ignore_case: bool) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct LocalFileOps {
    /// Relative paths and globs are resolved against this directory.
    root: PathBuf,
    /// When set, paths may point anywhere on the filesystem.
    unrestricted: bool,
    max_read_size: u64,
    max_matches: usize,
}

impl LocalFileOps {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            unrestricted: false,
            max_read_size: READ_FILE_MAX_SIZE,
            max_matches: GREP_MAX_MATCHES,
        }
    }

    pub fn unrestricted(mut self, unrestricted: bool) -> Self {
        self.unrestricted = unrestricted;
        self
    }

    pub fn with_limits(mut self, max_read_size: u64, max_matches: usize) -> Self {
        self.max_read_size = max_read_size;
        self.max_matches = max_matches.max(1);
        self
    }

    fn root_canonical(&self) -> Result<PathBuf> {
        self.root
            .canonicalize()
            .with_context(|| format!("Root directory not found: {}", self.root.display()))
    }

    /// Expand a leading `~` and anchor relative paths at the root.
    fn expand(&self, path: &str) -> PathBuf {
        let home_relative = if path == "~" {
            dirs::home_dir()
        } else {
            path.strip_prefix("~/")
                .and_then(|rest| dirs::home_dir().map(|home| home.join(rest)))
        };
        let expanded = home_relative.unwrap_or_else(|| PathBuf::from(path));
        if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        }
    }

    /// Resolve and validate that the path stays within the root.
    fn resolve_path(&self, path: &str) -> Result<PathBuf> {
        let canonical = self
            .expand(path)
            .canonicalize()
            .with_context(|| format!("Path does not exist: {path}"))?;
        if !self.is_allowed(&canonical)? {
            bail!("Path escapes root directory: {}", path);
        }
        Ok(canonical)
    }

    fn is_allowed(&self, canonical: &Path) -> Result<bool> {
        Ok(self.within(canonical, &self.root_canonical()?))
    }

    /// Files a glob pattern selects. A bare pattern like `*.rs` matches at any
    /// depth below the root.
    fn glob_targets(&self, pattern: &str, root: &Path) -> Result<Vec<PathBuf>> {
        let anchored = if pattern.contains('/') || pattern.starts_with('~') {
            self.expand(pattern)
        } else {
            self.root.join("**").join(pattern)
        };

        let mut targets = Vec::new();
        for entry in glob::glob(&anchored.to_string_lossy())
            .with_context(|| format!("Invalid glob pattern: {pattern}"))?
        {
            // Unreadable entries and broken symlinks are skipped.
            let Ok(entry) = entry else { continue };
            let Ok(canonical) = entry.canonicalize() else { continue };
            if canonical.is_file()
                && !under_ignored_dir(&canonical, root)
                && self.within(&canonical, root)
            {
                targets.push(canonical);
            }
        }
        Ok(targets)
    }

    /// Recursively walk directories, searching files for regex matches.
    ///
    /// Symlinked directories are never entered; symlinked files are searched
    /// only when their target is allowed.
    fn walk_and_search(&self, dir: &Path, regex: &Regex, root: &Path, matches: &mut Vec<String>) {
        if self.is_full(matches) {
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return, // silently skip unreadable dirs
        };

        let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            if self.is_full(matches) {
                return;
            }
            let Ok(file_type) = entry.file_type() else { continue };
            let path = entry.path();

            if file_type.is_symlink() {
                let Ok(target) = path.canonicalize() else { continue };
                if target.is_file() && self.within(&target, root) {
                    self.search_file(&path, regex, root, matches);
                }
            } else if file_type.is_dir() {
                if is_ignored_dir(&entry.file_name().to_string_lossy()) {
                    continue;
                }
                self.walk_and_search(&path, regex, root, matches);
            } else if file_type.is_file() {
                self.search_file(&path, regex, root, matches);
            }
        }
    }

    /// Search a single file for regex matches, appending results as `path:line:content`.
    fn search_file(&self, path: &Path, regex: &Regex, root: &Path, matches: &mut Vec<String>) {
        let Ok(content) = fs::read(path) else { return };
        if is_binary(&content) {
            return;
        }
        let Ok(text) = String::from_utf8(content) else { return };

        let relative = path.strip_prefix(root).unwrap_or(path);
        for (line_num, line) in text.lines().enumerate() {
            if self.is_full(matches) {
                return;
            }
            if regex.is_match(line) {
                matches.push(format!("{}:{}:{}", relative.display(), line_num + 1, line));
            }
        }
    }

    /// One match past the limit is collected so truncation can be reported
    /// only when something was actually dropped.
    fn is_full(&self, matches: &[String]) -> bool {
        matches.len() > self.max_matches
    }

    fn within(&self, canonical: &Path, root: &Path) -> bool {
        self.unrestricted || canonical.starts_with(root)
    }

    fn read_file_blocking(&self, path: &str) -> Result<String> {
        let resolved = self.resolve_path(path)?;
        if resolved.is_dir() {
            bail!("Path is a directory, not a file: {}", path);
        }

        let metadata = fs::metadata(&resolved)?;
        if metadata.len() > self.max_read_size {
            bail!(
                "File too large: {} bytes (max {})",
                metadata.len(),
                self.max_read_size
            );
        }

        let content =
            fs::read(&resolved).with_context(|| format!("Failed to read file: {path}"))?;
        if is_binary(&content) {
            bail!("Binary file detected. Cannot display binary content.");
        }

        String::from_utf8(content).map_err(|_| anyhow::anyhow!("File is not valid UTF-8"))
    }

    fn grep_files_blocking(&self, pattern: &str, path: &str, ignore_case: bool) -> Result<String> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .with_context(|| format!("Invalid regex: {pattern}"))?;
        let root = self.root_canonical()?;

        let mut matches = Vec::new();
        if is_glob(path) {
            for file in self.glob_targets(path, &root)? {
                if self.is_full(&matches) {
                    break;
                }
                self.search_file(&file, &regex, &root, &mut matches);
            }
        } else {
            let target = self.resolve_path(path)?;
            if target.is_dir() {
                self.walk_and_search(&target, &regex, &root, &mut matches);
            } else {
                self.search_file(&target, &regex, &root, &mut matches);
            }
        }

        if matches.is_empty() {
            return Ok("No matches found.".into());
        }
        let truncated = if self.is_full(&matches) {
            matches.truncate(self.max_matches);
            format!("\n... truncated at {} matches", self.max_matches)
        } else {
            String::new()
        };
        Ok(format!("{}{}", matches.join("\n"), truncated))
    }
}

/// Filesystem work runs on the blocking pool so a large walk never stalls
/// the stdio transport.
#[async_trait::async_trait]
impl FileOps for LocalFileOps {
    async fn read_file(&self, path: &str) -> Result<String> {
        let ops = self.clone();
        let path = path.to_string();
        tokio::task::spawn_blocking(move || ops.read_file_blocking(&path))
            .await
            .context("read_file task failed")?
    }

    async fn grep_files(&self, pattern: &str, path: &str, ignore_case: bool) -> Result<String> {
        let ops = self.clone();
        let (pattern, path) = (pattern.to_string(), path.to_string());
        tokio::task::spawn_blocking(move || ops.grep_files_blocking(&pattern, &path, ignore_case))
            .await
            .context("grep_files task failed")?
    }
}

fn is_glob(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

/// Hidden directories and build output are never searched.
fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('.') || name == "target" || name == "node_modules"
}

/// Whether any directory between `root` and `file` is ignored.
fn under_ignored_dir(file: &Path, root: &Path) -> bool {
    let Ok(relative) = file.strip_prefix(root) else {
        return false;
    };
    relative
        .parent()
        .map(|dirs| {
            dirs.components()
                .any(|c| is_ignored_dir(&c.as_os_str().to_string_lossy()))
        })
        .unwrap_or(false)
}

/// Null bytes in the first few KB mark a file as binary.
fn is_binary(content: &[u8]) -> bool {
    let check_len = content.len().min(BINARY_DETECTION_BYTES);
    content[..check_len].contains(&0)
}

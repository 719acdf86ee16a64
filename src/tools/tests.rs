use super::fileops::LocalFileOps;
use super::*;
use std::fs;
use std::path::Path;

fn registry_for(root: &Path) -> ToolRegistry {
    ToolRegistry::with_builtins(Arc::new(LocalFileOps::new(root.to_path_buf())))
}

fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    fs::create_dir_all(dir.path().join("target")).unwrap();
    fs::write(
        dir.path().join("src/main.rs"),
        "fn main() {\n    run();\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/nested/lib.rs"),
        "pub fn run() {}\npub fn Helper() {}\n",
    )
    .unwrap();
    fs::write(dir.path().join("target/build.rs"), "fn main() {}\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "remember to run the tests\n").unwrap();
    dir
}

#[test]
fn test_registry_with_builtins() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    assert_eq!(registry.len(), 2);
    let defs = registry.definitions();
    assert_eq!(defs[0].name, "read_file");
    assert_eq!(defs[1].name, "grep_files");
    assert_eq!(defs[0].parameters["required"], serde_json::json!(["path"]));
    assert_eq!(
        defs[1].parameters["required"],
        serde_json::json!(["pattern", "path"])
    );
}

#[tokio::test]
async fn test_read_file_relative_to_root() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    let content = registry
        .execute("read_file", r#"{"path": "src/main.rs"}"#)
        .await
        .unwrap();
    assert!(content.contains("fn main()"));
}

#[tokio::test]
async fn test_read_file_nonexistent() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    let err = registry
        .execute("read_file", r#"{"path": "nope.txt"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Failed(_)));
    assert!(err.to_string().contains("Path does not exist"));
}

#[tokio::test]
async fn test_read_file_path_escape() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    fs::create_dir_all(&root).unwrap();
    fs::write(outer.path().join("secret.txt"), "hidden").unwrap();

    let registry = registry_for(&root);
    let err = registry
        .execute("read_file", r#"{"path": "../secret.txt"}"#)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("escapes root directory"));
}

#[tokio::test]
async fn test_read_file_unrestricted_allows_outside_root() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    fs::create_dir_all(&root).unwrap();
    fs::write(outer.path().join("shared.txt"), "shared notes").unwrap();

    let ops = LocalFileOps::new(root).unrestricted(true);
    let registry = ToolRegistry::with_builtins(Arc::new(ops));
    let content = registry
        .execute("read_file", r#"{"path": "../shared.txt"}"#)
        .await
        .unwrap();
    assert_eq!(content, "shared notes");
}

#[tokio::test]
async fn test_read_file_too_large() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("big.txt"), "x".repeat(64)).unwrap();
    let ops = LocalFileOps::new(dir.path().to_path_buf()).with_limits(16, 10);
    let registry = ToolRegistry::with_builtins(Arc::new(ops));
    let err = registry
        .execute("read_file", r#"{"path": "big.txt"}"#)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("File too large"));
}

#[tokio::test]
async fn test_read_file_binary_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("blob.bin"), [0u8, 1, 2, 3]).unwrap();
    let registry = registry_for(dir.path());
    let err = registry
        .execute("read_file", r#"{"path": "blob.bin"}"#)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Binary file"));
}

#[tokio::test]
async fn test_grep_directory_skips_target() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    let result = registry
        .execute("grep_files", r#"{"pattern": "fn main", "path": "."}"#)
        .await
        .unwrap();
    assert!(result.contains("src/main.rs:1:fn main() {"));
    assert!(!result.contains("target"));
}

#[tokio::test]
async fn test_grep_bare_glob_matches_any_depth() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    let result = registry
        .execute("grep_files", r#"{"pattern": "pub fn", "path": "*.rs"}"#)
        .await
        .unwrap();
    assert!(result.contains("src/nested/lib.rs:1:pub fn run() {}"));
    assert!(!result.contains("notes.txt"));
}

#[tokio::test]
async fn test_grep_ignore_case() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    let sensitive = registry
        .execute("grep_files", r#"{"pattern": "helper", "path": "src/**/*.rs"}"#)
        .await
        .unwrap();
    assert!(sensitive.contains("No matches found"));

    let insensitive = registry
        .execute(
            "grep_files",
            r#"{"pattern": "helper", "path": "src/**/*.rs", "ignore_case": true}"#,
        )
        .await
        .unwrap();
    assert!(insensitive.contains("lib.rs:2:pub fn Helper() {}"));
}

#[tokio::test]
async fn test_grep_truncates_at_limit() {
    let dir = tempfile::tempdir().unwrap();
    let body: String = (0..20).map(|i| format!("match {i}\n")).collect();
    fs::write(dir.path().join("many.txt"), body).unwrap();
    let ops = LocalFileOps::new(dir.path().to_path_buf()).with_limits(1024 * 1024, 5);
    let registry = ToolRegistry::with_builtins(Arc::new(ops));
    let result = registry
        .execute("grep_files", r#"{"pattern": "match", "path": "many.txt"}"#)
        .await
        .unwrap();
    assert_eq!(result.lines().filter(|l| l.starts_with("many.txt:")).count(), 5);
    assert!(result.ends_with("... truncated at 5 matches"));
}

#[tokio::test]
async fn test_grep_invalid_regex() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    let err = registry
        .execute("grep_files", r#"{"pattern": "[invalid", "path": "."}"#)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid regex"));
}

#[tokio::test]
async fn test_unknown_tool() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());
    let err = registry.execute("delete_everything", "{}").await.unwrap_err();
    assert_eq!(err.to_string(), "unknown function: delete_everything");
}

#[tokio::test]
async fn test_malformed_arguments_are_errors() {
    let dir = sample_tree();
    let registry = registry_for(dir.path());

    let err = registry
        .execute("read_file", "{not json")
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
    assert!(err.to_string().starts_with("invalid arguments:"));

    // Valid JSON, wrong shape: `path` is required for grep_files.
    let err = registry
        .execute("grep_files", r#"{"pattern": "x"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn test_grep_at_exact_limit_is_not_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let body: String = (0..5).map(|i| format!("match {i}\n")).collect();
    fs::write(dir.path().join("five.txt"), body).unwrap();
    let ops = LocalFileOps::new(dir.path().to_path_buf()).with_limits(1024 * 1024, 5);
    let registry = ToolRegistry::with_builtins(Arc::new(ops));
    let result = registry
        .execute("grep_files", r#"{"pattern": "match", "path": "."}"#)
        .await
        .unwrap();
    assert_eq!(result.lines().count(), 5);
    assert!(!result.contains("truncated"));
}

#[cfg(unix)]
fn tree_with_outside_link() -> (tempfile::TempDir, std::path::PathBuf) {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    let outside = outer.path().join("outside");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&outside).unwrap();
    fs::write(outside.join("creds.txt"), "TOKEN=hunter2\n").unwrap();
    fs::write(root.join("app.txt"), "TOKEN=placeholder\n").unwrap();
    std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();
    std::os::unix::fs::symlink(outside.join("creds.txt"), root.join("creds_link.txt")).unwrap();
    (outer, root)
}

#[cfg(unix)]
#[tokio::test]
async fn test_grep_walk_does_not_follow_links_out_of_root() {
    let (_outer, root) = tree_with_outside_link();
    let registry = registry_for(&root);

    let read = registry
        .execute("read_file", r#"{"path": "link/creds.txt"}"#)
        .await
        .unwrap_err();
    assert!(read.to_string().contains("escapes root directory"));

    let result = registry
        .execute("grep_files", r#"{"pattern": "TOKEN", "path": "."}"#)
        .await
        .unwrap();
    assert!(result.contains("app.txt:1:TOKEN=placeholder"));
    assert!(!result.contains("hunter2"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_grep_unrestricted_follows_file_links() {
    let (_outer, root) = tree_with_outside_link();
    let ops = LocalFileOps::new(root).unrestricted(true);
    let registry = ToolRegistry::with_builtins(Arc::new(ops));
    let result = registry
        .execute("grep_files", r#"{"pattern": "TOKEN", "path": "."}"#)
        .await
        .unwrap();
    assert!(result.contains("creds_link.txt:1:TOKEN=hunter2"));
    assert!(!result.contains("link/creds.txt"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_grep_survives_link_cycles() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "needle\n").unwrap();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("loop_a")).unwrap();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("loop_b")).unwrap();
    let registry = registry_for(dir.path());
    let result = registry
        .execute("grep_files", r#"{"pattern": "needle", "path": "."}"#)
        .await
        .unwrap();
    assert_eq!(result, "a.txt:1:needle");
}

//! Heuristic scan of a prompt for code references.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

// Word boundaries, digits, and spaces are ASCII-only, so a reference written
// directly against CJK or accented text is still found.

/// Bare words ending in a known source-file extension.
static FILE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u:\b)([a-zA-Z0-9_/\-\.]+\.(py|js|ts|go|java|rb|php|cpp|c|h|rs|kt|swift|tsx|jsx))(?-u:\b)",
    )
    .expect("file path pattern is valid")
});

/// An identifier immediately followed by an opening parenthesis.
static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)([a-zA-Z_][a-zA-Z0-9_]*)(?-u:\s)*\(").expect("function call pattern is valid")
});

/// `line 12`, `lines 10-20`, or a bare `:42`.
static LINE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:lines?|line)(?-u:\s)+([0-9]+(?:-[0-9]+)?)|:([0-9]+)").expect("line number pattern is valid")
});

const CODE_KEYWORDS: [&str; 7] = [
    "function",
    "class",
    "method",
    "implementation",
    "code",
    "file",
    "module",
];

/// Words that look like calls in prose, e.g. "and (optionally)".
const COMMON_WORDS: [&str; 20] = [
    "if", "for", "while", "do", "then", "and", "or", "not", "is", "the", "a", "an", "to", "of",
    "in", "on", "at", "by", "from", "with",
];

/// Code references detected in a prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextRequirements {
    /// Distinct file paths, in order of first mention.
    pub files: Vec<String>,
    /// Function name to the file it lives in, when known.
    pub functions: IndexMap<String, Option<String>>,
    /// File path to the line or line range mentioned for it.
    pub line_refs: IndexMap<String, String>,
    pub has_code_refs: bool,
}

/// Extract file paths, function names, and line references from a prompt.
///
/// Line references attach to the last file path found anywhere in the
/// prompt. Any code keyword flags the prompt even when nothing else matched.
pub fn analyze_prompt(prompt: &str) -> ContextRequirements {
    let mut req = ContextRequirements::default();

    for caps in FILE_PATH.captures_iter(prompt) {
        let path = &caps[1];
        if !req.files.iter().any(|f| f == path) {
            req.files.push(path.to_string());
            req.has_code_refs = true;
        }
    }

    for caps in FUNCTION_CALL.captures_iter(prompt) {
        let name = &caps[1];
        if !is_common_word(name) {
            req.functions.entry(name.to_string()).or_insert(None);
            req.has_code_refs = true;
        }
    }

    if let Some(last_file) = req.files.last().cloned() {
        for caps in LINE_NUMBER.captures_iter(prompt) {
            let line_ref = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            if let Some(line_ref) = line_ref {
                req.line_refs.insert(last_file.clone(), line_ref.to_string());
                req.has_code_refs = true;
            }
        }
    }

    let lower = prompt.to_lowercase();
    if CODE_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        req.has_code_refs = true;
    }

    req
}

fn is_common_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    COMMON_WORDS.contains(&lower.as_str())
}

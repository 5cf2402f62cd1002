//! File classification: text vs binary, README, test, main code.

use std::path::Path;

/// Extensions treated as readable text.  Superset of [`MAIN_CODE_EXTENSIONS`]
/// plus markup, config, and documentation formats.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "c", "cpp", "h", "hpp", "cs", "php", "rb", "go",
    "rs", "swift", "kt", "scala", "vue", "svelte", "dart", "elm", "ex", "exs", "erl", "md",
    "markdown", "txt", "json", "yml", "yaml", "toml", "xml", "html", "htm", "css", "scss",
    "sass", "less", "sh", "bash", "bat", "ps1", "sql", "ini", "cfg", "conf", "env",
];

/// Extensions denoting a general-purpose programming language.  Markup,
/// config, and documentation formats are deliberately excluded.
pub const MAIN_CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "c", "cpp", "h", "hpp", "cs", "php", "rb", "go",
    "rs", "swift", "kt", "scala", "vue", "svelte", "dart", "elm", "ex", "exs", "erl",
];

/// Substrings that mark a path as test-related.  Matching is done on the
/// lowercased path, so the later entries are subsumed by the first two; the
/// full list documents the intended patterns.  Deliberately permissive — a
/// file under `latest/` matches `test` — and kept that way.
pub const TEST_MARKERS: &[&str] = &["test", "spec", "__tests__", ".test.", ".spec."];

/// Classification of one file, derived purely from its name and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileClass {
    /// Lowercased extension without the dot; empty when the name has none.
    pub extension: String,
    pub is_text: bool,
    pub is_readme: bool,
    pub is_test: bool,
    pub is_main_code: bool,
}

/// Classify a file by name and repository-relative path.  Pure: no
/// filesystem access.
pub fn classify(name: &str, rel_path: &Path) -> FileClass {
    let extension = extension_of(name);
    let lower_path = rel_path.to_string_lossy().to_lowercase();

    FileClass {
        is_text: TEXT_EXTENSIONS.contains(&extension.as_str()),
        is_readme: name.to_lowercase().starts_with("readme"),
        is_test: TEST_MARKERS.iter().any(|m| lower_path.contains(m)),
        is_main_code: MAIN_CODE_EXTENSIONS.contains(&extension.as_str()),
        extension,
    }
}

/// Lowercased extension of a file name; empty string when there is none.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

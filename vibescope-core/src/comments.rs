//! Heuristic line-comment counting.
//!
//! Single-line prefix matching on trimmed, non-empty lines only.  There is
//! no block-comment span tracking and no string-literal awareness: a `//`
//! inside a string literal still counts as a comment line.  That is an
//! accepted limitation of the heuristic, not a bug to fix quietly.

/// Comment conventions grouped by language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentStyle {
    /// `//`, `/*`, `*` — C, Java, JS/TS, Rust, Go, and friends.
    CFamily,
    /// `#` — Python, Ruby, shell, and most config formats.
    Hash,
    /// `<!--` — HTML, XML, Markdown.
    Markup,
    /// `/*`, `*` — CSS and preprocessor dialects.
    Stylesheet,
}

fn style_for(extension: &str) -> Option<CommentStyle> {
    match extension {
        "js" | "jsx" | "ts" | "tsx" | "java" | "c" | "cpp" | "h" | "hpp" | "cs" | "go"
        | "rs" | "swift" | "kt" | "scala" | "dart" | "php" => Some(CommentStyle::CFamily),
        "py" | "rb" | "sh" | "bash" | "bat" | "ps1" | "yml" | "yaml" | "toml" | "ex"
        | "exs" | "erl" => Some(CommentStyle::Hash),
        "html" | "htm" | "xml" | "md" | "markdown" => Some(CommentStyle::Markup),
        "css" | "scss" | "sass" | "less" => Some(CommentStyle::Stylesheet),
        _ => None,
    }
}

/// Count comment lines in `content` according to the extension's language
/// family.  Unknown extensions count zero.
pub fn count_comment_lines(content: &str, extension: &str) -> usize {
    let Some(style) = style_for(extension) else {
        return 0;
    };

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| match style {
            CommentStyle::CFamily => {
                line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
            }
            CommentStyle::Hash => line.starts_with('#'),
            CommentStyle::Markup => line.starts_with("<!--"),
            CommentStyle::Stylesheet => line.starts_with("/*") || line.starts_with('*'),
        })
        .count()
}

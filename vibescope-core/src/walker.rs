//! Directory traversal and metric accumulation.
//!
//! The walk is an explicit fold: each directory level produces its own
//! [`WalkAccumulator`] which the caller merges, so there is no shared
//! mutable state threaded across recursion and each level is testable in
//! isolation.
//!
//! The skip decision sits behind the [`IgnoreRules`] trait.  Production
//! uses [`DefaultIgnores`] (the fixed directory set plus dot-prefixed
//! entries); tests can substitute [`AllowAll`].

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::classify::classify;
use crate::comments::count_comment_lines;
use crate::metrics::{AiPatternCounters, CodeSample, RepositoryMetrics};
use crate::patterns::PatternDetector;

/// Directories never descended into, regardless of depth.
pub const IGNORED_DIRS: &[&str] = &["node_modules", "dist", "build", ".git"];
/// Maximum retained code samples per walk.
pub const MAX_CODE_SAMPLES: usize = 5;
/// Per-sample character budget.
pub const SAMPLE_CHAR_BUDGET: usize = 500;
/// Minimum content length for a file to be sampled at all.
pub const SAMPLE_MIN_LEN: usize = 100;
/// Appended to a sample cut at the character budget.
pub const TRUNCATION_MARKER: &str = "\n[truncated]";

/// Seam for the walker's skip decisions.
pub trait IgnoreRules: Send + Sync {
    /// Skip this directory entirely (no descent)?
    fn skip_dir(&self, name: &str) -> bool;

    /// Skip this file?
    fn skip_file(&self, name: &str) -> bool;
}

/// Production rules: the fixed ignore set plus anything dot-prefixed.
pub struct DefaultIgnores;

impl IgnoreRules for DefaultIgnores {
    fn skip_dir(&self, name: &str) -> bool {
        name.starts_with('.') || IGNORED_DIRS.contains(&name)
    }

    fn skip_file(&self, name: &str) -> bool {
        name.starts_with('.')
    }
}

/// Test double: walks everything, including dot-entries.
pub struct AllowAll;

impl IgnoreRules for AllowAll {
    fn skip_dir(&self, _name: &str) -> bool {
        false
    }

    fn skip_file(&self, _name: &str) -> bool {
        false
    }
}

/// Running totals for one directory subtree.
#[derive(Debug, Default)]
struct WalkAccumulator {
    total_files: usize,
    total_lines: usize,
    comment_lines: usize,
    has_readme: bool,
    has_tests: bool,
    file_types: BTreeMap<String, usize>,
    code_samples: Vec<CodeSample>,
    ai_patterns: AiPatternCounters,
    unreadable: usize,
}

impl WalkAccumulator {
    /// Merge a child subtree's totals into this level.
    fn merge(&mut self, child: WalkAccumulator) {
        self.total_files += child.total_files;
        self.total_lines += child.total_lines;
        self.comment_lines += child.comment_lines;
        self.has_readme |= child.has_readme;
        self.has_tests |= child.has_tests;
        for (ext, count) in child.file_types {
            *self.file_types.entry(ext).or_insert(0) += count;
        }
        for sample in child.code_samples {
            if self.code_samples.len() >= MAX_CODE_SAMPLES {
                break;
            }
            self.code_samples.push(sample);
        }
        self.ai_patterns.merge(&child.ai_patterns);
        self.unreadable += child.unreadable;
    }

    fn into_metrics(self) -> RepositoryMetrics {
        RepositoryMetrics {
            comments_ratio: RepositoryMetrics::ratio_of(self.comment_lines, self.total_lines),
            total_files: self.total_files,
            total_lines: self.total_lines,
            comment_lines: self.comment_lines,
            has_readme: self.has_readme,
            has_tests: self.has_tests,
            file_types: self.file_types,
            code_samples: self.code_samples,
            ai_patterns: self.ai_patterns,
            used_branch: None,
        }
    }
}

/// Walk `root` and return its aggregate metrics.
///
/// An unreadable root is fatal; anything below it degrades: unreadable
/// files and subdirectories are logged and skipped.
pub fn walk(root: &Path, rules: &dyn IgnoreRules) -> io::Result<RepositoryMetrics> {
    let detector = PatternDetector::new();
    let acc = walk_dir(root, root, rules, &detector, true)?;
    if acc.unreadable > 0 {
        warn!(count = acc.unreadable, "some entries could not be read");
    }
    Ok(acc.into_metrics())
}

fn walk_dir(
    dir: &Path,
    root: &Path,
    rules: &dyn IgnoreRules,
    detector: &PatternDetector,
    is_root: bool,
) -> io::Result<WalkAccumulator> {
    let mut acc = WalkAccumulator::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if is_root => return Err(err),
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            acc.unreadable += 1;
            return Ok(acc);
        }
    };

    let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        if path.is_dir() {
            if rules.skip_dir(&name) {
                continue;
            }
            match walk_dir(&path, root, rules, detector, false) {
                Ok(child) => acc.merge(child),
                // walk_dir only errors at the root; keep the arm for the
                // signature's sake.
                Err(err) => {
                    warn!(dir = %path.display(), error = %err, "skipping unreadable directory");
                    acc.unreadable += 1;
                }
            }
        } else if path.is_file() {
            if rules.skip_file(&name) {
                continue;
            }
            visit_file(&path, &name, root, detector, &mut acc);
        }
    }

    Ok(acc)
}

fn visit_file(
    path: &Path,
    name: &str,
    root: &Path,
    detector: &PatternDetector,
    acc: &mut WalkAccumulator,
) {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let class = classify(name, rel);

    // Type counts and the README/test flags apply to every regular file,
    // text or binary.
    acc.total_files += 1;
    *acc.file_types.entry(class.extension.clone()).or_insert(0) += 1;
    acc.has_readme |= class.is_readme;
    acc.has_tests |= class.is_test;

    if !class.is_text {
        return;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(file = %path.display(), error = %err, "skipping unreadable file");
            acc.unreadable += 1;
            return;
        }
    };

    acc.total_lines += content.lines().count();
    acc.comment_lines += count_comment_lines(&content, &class.extension);
    acc.ai_patterns.absorb(detector.detect(&content));

    if class.is_main_code
        && content.len() >= SAMPLE_MIN_LEN
        && acc.code_samples.len() < MAX_CODE_SAMPLES
    {
        acc.code_samples.push(make_sample(rel, &class.extension, &content));
    }
}

fn make_sample(rel: &Path, extension: &str, content: &str) -> CodeSample {
    let truncated = content.chars().count() > SAMPLE_CHAR_BUDGET;
    let mut snippet: String = content.chars().take(SAMPLE_CHAR_BUDGET).collect();
    if truncated {
        snippet.push_str(TRUNCATION_MARKER);
    }
    CodeSample {
        path: rel.to_string_lossy().into_owned(),
        extension: extension.to_string(),
        snippet,
        truncated,
    }
}

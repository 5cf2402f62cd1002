//! AI-authorship pattern detectors.
//!
//! Four boolean signals per file, each behind a fixed threshold.  The
//! thresholds are deliberate magic numbers, surfaced as named constants so a
//! future calibration pass touches one place.  They are not configurable:
//! changing any of them changes every verdict this engine has ever emitted.

use std::collections::HashMap;

use regex::Regex;

/// Total generic-identifier matches above which `generic_names` trips.
pub const GENERIC_NAME_THRESHOLD: usize = 5;
/// Indentation-consistency ratio above which `perfect_formatting` trips.
pub const PERFECT_FORMATTING_THRESHOLD: f64 = 0.95;
/// Indent width the consistency check divides by.
pub const INDENT_UNIT: usize = 4;
/// Total boilerplate-structure matches above which `boilerplate_code` trips.
pub const BOILERPLATE_THRESHOLD: usize = 3;
/// Repeated-line ratio above which `repetitive_patterns` trips.
pub const REPETITION_THRESHOLD: f64 = 0.3;
/// Minimum non-empty lines before repetition is evaluated at all.
pub const REPETITION_MIN_LINES: usize = 5;

/// Which detectors tripped for a single file.  A detector either trips or
/// it does not — match counts beyond the threshold make no difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternHits {
    pub generic_names: bool,
    pub perfect_formatting: bool,
    pub boilerplate_code: bool,
    pub repetitive_patterns: bool,
}

/// Compiled detector regexes.  Construct once, reuse across every file in a
/// walk.
pub struct PatternDetector {
    generic: [Regex; 3],
    boilerplate: [Regex; 3],
}

impl PatternDetector {
    pub fn new() -> Self {
        // Three generic-identifier word lists: temp/data/result-style names,
        // collection-style names, verb-prefixed names.
        let generic = [
            Regex::new(r"(?i)\b(data|result|value|item|temp|tempvar|tempvalue|tempdata)\b")
                .expect("generic-name pattern"),
            Regex::new(r"(?i)\b(user|users|item|items|data|datas|list|lists)\b")
                .expect("collection-name pattern"),
            Regex::new(r"(?i)\b(handle|process|execute|perform|do|run)\w*\b")
                .expect("verb-prefix pattern"),
        ];
        // Three boilerplate structures: empty-parameter function body, class
        // body opener, arrow function with block body.
        let boilerplate = [
            Regex::new(r"function\s+\w+\s*\(\s*\)\s*\{").expect("function pattern"),
            Regex::new(r"class\s+\w+\s*\{").expect("class pattern"),
            Regex::new(r"const\s+\w+\s*=\s*\([^)]*\)\s*=>\s*\{").expect("arrow pattern"),
        ];
        Self {
            generic,
            boilerplate,
        }
    }

    /// Run all four detectors over one file's content.
    pub fn detect(&self, content: &str) -> PatternHits {
        let generic_count: usize = self
            .generic
            .iter()
            .map(|re| re.find_iter(content).count())
            .sum();
        let boilerplate_count: usize = self
            .boilerplate
            .iter()
            .map(|re| re.find_iter(content).count())
            .sum();

        PatternHits {
            generic_names: generic_count > GENERIC_NAME_THRESHOLD,
            perfect_formatting: indentation_consistency(content) > PERFECT_FORMATTING_THRESHOLD,
            boilerplate_code: boilerplate_count > BOILERPLATE_THRESHOLD,
            repetitive_patterns: repetition_ratio(content) > REPETITION_THRESHOLD,
        }
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Fraction of non-empty lines whose indentation looks machine-regular:
/// max(lines with leading whitespace divisible by [`INDENT_UNIT`], lines
/// with any positive indent) over all non-empty lines.
///
/// Zero non-empty lines is defined as a ratio of 1.0 (trips).  The
/// divisible-by-4 versus any-positive-indent conflation can overcount
/// mixed-indentation files as consistent; a known imprecision, kept
/// deliberately.
fn indentation_consistency(content: &str) -> f64 {
    let mut total = 0usize;
    let mut unit_aligned = 0usize;
    let mut indented = 0usize;

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        total += 1;
        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        if indent % INDENT_UNIT == 0 {
            unit_aligned += 1;
        }
        if indent > 0 {
            indented += 1;
        }
    }

    if total == 0 {
        return 1.0;
    }
    unit_aligned.max(indented) as f64 / total as f64
}

/// Fraction of non-empty lines whose normalized form (trimmed, internal
/// whitespace collapsed) occurs more than once.  Returns 0 below
/// [`REPETITION_MIN_LINES`] lines.
fn repetition_ratio(content: &str) -> f64 {
    let normalized: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    if normalized.len() < REPETITION_MIN_LINES {
        return 0.0;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for line in &normalized {
        *counts.entry(line.as_str()).or_insert(0) += 1;
    }

    let repeated = counts.values().filter(|&&count| count > 1).count();
    repeated as f64 / normalized.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(content: &str) -> PatternHits {
        PatternDetector::new().detect(content)
    }

    #[test]
    fn six_generic_matches_trip_generic_names() {
        // "data" matches both the temp-style and the collection-style lists,
        // so three occurrences yield six matches: 6 > 5 trips.
        let source = "let data = 1;\nlet data2 = data;\nprint(data);\n";
        assert!(detect(source).generic_names);
    }

    #[test]
    fn five_generic_matches_do_not_trip() {
        // "result" and "value" are only in the first list; "users" only in
        // the second.  2 + 2 + 1 = 5 matches, not > 5.
        let source = "result = value\nvalue = result\nusers = []\n";
        assert!(!detect(source).generic_names);
    }

    #[test]
    fn match_counts_are_case_insensitive() {
        let source = "DATA Data dAtA\n";
        // 3 × both word lists = 6 > 5.
        assert!(detect(source).generic_names);
    }

    #[test]
    fn four_space_indents_trip_perfect_formatting() {
        let source = "fn a() {\n    one();\n    two();\n        three();\n}\n";
        assert!(detect(source).perfect_formatting);
    }

    #[test]
    fn ragged_indents_do_not_trip() {
        let source = "a\n  b\n   c\n  d\n a\n  b\n   c\n  d\n x\n  y\n";
        assert!(!detect(source).perfect_formatting);
    }

    #[test]
    fn empty_content_trips_perfect_formatting_by_definition() {
        let hits = detect("");
        assert!(hits.perfect_formatting);
        // ...but never repetition: below the line floor.
        assert!(!hits.repetitive_patterns);
    }

    #[test]
    fn fully_tab_indented_body_counts_as_consistent() {
        // All lines carry a positive indent, so the any-positive-indent arm
        // of the max() puts the ratio at 1.0 even though nothing is
        // 4-divisible.
        let source = "\tone();\n\ttwo();\n\tthree();\n\tfour();\n";
        assert!(detect(source).perfect_formatting);
    }

    #[test]
    fn four_boilerplate_matches_trip() {
        let source = "\
function a() { return 1; }
function b() { return 2; }
class Foo {
const f = (x) => { return x; }
";
        assert!(detect(source).boilerplate_code);
    }

    #[test]
    fn three_boilerplate_matches_do_not_trip() {
        let source = "\
function a() { return 1; }
class Foo {
const f = (x) => { return x; }
";
        assert!(!detect(source).boilerplate_code);
    }

    #[test]
    fn repeated_lines_trip_repetition() {
        // Two distinct normalized lines recur over six total: 2/6 ≈ 0.33 > 0.3.
        let source = "x += 1;\nx += 1;\ny += 2;\ny += 2;\nunique();\nalso_unique();\n";
        assert!(detect(source).repetitive_patterns);
    }

    #[test]
    fn repetition_needs_five_lines() {
        // Two identical pairs, but only four non-empty lines.
        let source = "x += 1;\nx += 1;\ny += 2;\ny += 2;\n";
        assert!(!detect(source).repetitive_patterns);
    }

    #[test]
    fn whitespace_is_collapsed_before_comparing() {
        let source = "a  =  1\na = 1\nb\t=\t2\nb = 2\nc = 3\nd = 4\n";
        // "a = 1" and "b = 2" each recur after normalization: 2/6 = 0.33.
        assert!(detect(source).repetitive_patterns);
    }
}

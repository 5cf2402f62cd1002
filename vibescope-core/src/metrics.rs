//! The metric types that flow through the analysis pipeline.
//!
//! `RepositoryMetrics` is produced once per run by the directory walker and
//! is immutable afterwards.  `SecondaryOutcome` is produced by one external
//! analyzer invocation and consumed once by the merger.  `CombinedMetrics`
//! is the sole input to the scoring engine, and `ScoreReport` is what the
//! caller ultimately serializes.
//!
//! JSON field names are camelCase to match the payloads the surrounding
//! service historically emitted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::patterns::PatternHits;

/// Per-detector file counters.  Each counter is bumped at most once per file,
/// never fractionally, and never revisited after a file has been processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPatternCounters {
    pub generic_names: u32,
    pub perfect_formatting: u32,
    pub boilerplate_code: u32,
    pub repetitive_patterns: u32,
}

impl AiPatternCounters {
    /// Sum of all four counters.
    pub fn total(&self) -> u32 {
        self.generic_names
            + self.perfect_formatting
            + self.boilerplate_code
            + self.repetitive_patterns
    }

    /// Fold one file's detector hits into the counters.
    pub fn absorb(&mut self, hits: PatternHits) {
        self.generic_names += hits.generic_names as u32;
        self.perfect_formatting += hits.perfect_formatting as u32;
        self.boilerplate_code += hits.boilerplate_code as u32;
        self.repetitive_patterns += hits.repetitive_patterns as u32;
    }

    /// Combine counters from two subtree accumulators.
    pub fn merge(&mut self, other: &AiPatternCounters) {
        self.generic_names += other.generic_names;
        self.perfect_formatting += other.perfect_formatting;
        self.boilerplate_code += other.boilerplate_code;
        self.repetitive_patterns += other.repetitive_patterns;
    }
}

/// A bounded code excerpt retained from a main-code file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSample {
    /// Path relative to the repository root.
    pub path: String,
    pub extension: String,
    pub snippet: String,
    pub truncated: bool,
}

/// Aggregate metrics for one repository tree.  Created once per analysis run
/// by the directory walker; immutable after the walk completes (the engine
/// only fills in `used_branch` before handing it to the merger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetrics {
    pub total_files: usize,
    pub total_lines: usize,
    pub comment_lines: usize,
    /// `comment_lines / total_lines` rounded to 2 decimals; 0 when the tree
    /// has no lines.
    pub comments_ratio: f64,
    pub has_readme: bool,
    pub has_tests: bool,
    /// Extension → file count.  Ordered so serialization is byte-stable.
    pub file_types: BTreeMap<String, usize>,
    pub code_samples: Vec<CodeSample>,
    pub ai_patterns: AiPatternCounters,
    /// Branch the fetch actually used; `None` for local trees.
    pub used_branch: Option<String>,
}

impl RepositoryMetrics {
    /// The comments-ratio rule: two-decimal rounding, defined as 0 for an
    /// empty tree.
    pub fn ratio_of(comment_lines: usize, total_lines: usize) -> f64 {
        if total_lines == 0 {
            return 0.0;
        }
        round2(comment_lines as f64 / total_lines as f64)
    }
}

/// Sub-scores reported by the independent secondary analyzer.  Field names
/// are the analyzer's own wire contract, so no casing rename here.  Missing
/// scores default to 0 and are clamped into [0, 10] by the merger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryMetrics {
    #[serde(default)]
    pub comments_score: f64,
    #[serde(default)]
    pub naming_score: f64,
    #[serde(default)]
    pub tests_score: f64,
    #[serde(default)]
    pub examples_score: f64,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Result of one secondary-analyzer invocation.
///
/// `Failed` must stay the first variant: with untagged serde an
/// `{"error": …}` record would otherwise satisfy `Metrics` through its
/// field defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecondaryOutcome {
    Failed { error: String },
    Metrics(SecondaryMetrics),
}

impl SecondaryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SecondaryOutcome::Failed { .. })
    }

    pub fn as_metrics(&self) -> Option<&SecondaryMetrics> {
        match self {
            SecondaryOutcome::Metrics(m) => Some(m),
            SecondaryOutcome::Failed { .. } => None,
        }
    }
}

/// Union of the primary and secondary analyses.  Always carries the full
/// repository metrics — a secondary-analyzer outage degrades the analysis,
/// it never voids it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedMetrics {
    #[serde(flatten)]
    pub repository: RepositoryMetrics,
    pub secondary_analysis: SecondaryOutcome,
    /// Union of repository-derived and secondary highlights, exact-string
    /// deduplicated, first-seen order.
    pub combined_highlights: Vec<String>,
    pub combined: bool,
}

/// The final verdict for one repository.  Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub ai_patterns: f64,
    pub code_structure: f64,
    pub documentation: f64,
    pub complexity: f64,
    pub overall: f64,
    pub is_vibe_coded: bool,
    pub verdict: String,
    pub highlights: Vec<String>,
}

/// What the engine's public entry points return: the report plus the
/// request metadata the HTTP layer serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub report: ScoreReport,
    pub total_files: usize,
    pub total_lines: usize,
    pub comments_ratio: f64,
    pub has_readme: bool,
    pub has_tests: bool,
    pub used_branch: Option<String>,
    /// True when the secondary analyzer failed and the report rests on the
    /// primary metrics alone.
    pub partial: bool,
    pub elapsed_ms: u64,
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

//! Scoring: external collaborator with a deterministic local fallback.
//!
//! The central abstraction is the [`ScoreProvider`] trait — the engine
//! depends only on the trait, so tests can inject doubles and production can
//! wire up [`RemoteScorer`].  Whatever the provider does (unreachable,
//! malformed, out-of-range), [`ScoringEngine::score`] always hands back a
//! valid report: the fallback is pure and total over every reachable
//! [`CombinedMetrics`] shape.

use std::time::Duration;

use anyhow::Context;
use tracing::warn;

use crate::metrics::{round1, CombinedMetrics, ScoreReport, SecondaryOutcome};

/// Ceiling on one remote scoring call.
pub const SCORER_TIMEOUT: Duration = Duration::from_secs(30);
/// Overall score at or above which a repository is called vibe-coded.
pub const VIBE_THRESHOLD: f64 = 6.0;

/// Seam for the external scoring collaborator.
pub trait ScoreProvider: Send + Sync {
    /// A short name identifying this provider.
    fn name(&self) -> &str;

    /// Score the combined metrics.  Any `Err` triggers the local fallback.
    fn score(&self, metrics: &CombinedMetrics) -> anyhow::Result<ScoreReport>;
}

/// Production provider: POSTs the combined metrics as JSON to a configured
/// endpoint and expects a `ScoreReport`-shaped response.
pub struct RemoteScorer {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl RemoteScorer {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scoring client")?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

impl ScoreProvider for RemoteScorer {
    fn name(&self) -> &str {
        "remote"
    }

    fn score(&self, metrics: &CombinedMetrics) -> anyhow::Result<ScoreReport> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(metrics)
            .send()
            .with_context(|| format!("scoring endpoint {} unreachable", self.endpoint))?
            .error_for_status()
            .context("scoring endpoint returned an error status")?;
        response
            .json::<ScoreReport>()
            .context("scoring endpoint returned a malformed report")
    }
}

/// Delegates to a provider when one is wired up, falling back to the local
/// deterministic scorer on any failure or validation miss.
pub struct ScoringEngine {
    provider: Option<Box<dyn ScoreProvider>>,
}

impl ScoringEngine {
    pub fn new(provider: Option<Box<dyn ScoreProvider>>) -> Self {
        Self { provider }
    }

    /// An engine that always scores locally.
    pub fn local_only() -> Self {
        Self::new(None)
    }

    /// Score `metrics`.  Total: always returns a valid report.
    pub fn score(&self, metrics: &CombinedMetrics) -> ScoreReport {
        if let Some(provider) = &self.provider {
            match provider.score(metrics).and_then(validate) {
                Ok(report) => return report,
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "falling back to local scoring");
                }
            }
        }
        fallback_score(metrics)
    }
}

/// Reject reports whose fields are outside the documented bounds.
fn validate(report: ScoreReport) -> anyhow::Result<ScoreReport> {
    let in_range = |v: f64| v.is_finite() && (0.0..=10.0).contains(&v);
    let sub_scores = [
        report.ai_patterns,
        report.code_structure,
        report.documentation,
        report.complexity,
        report.overall,
    ];
    if !sub_scores.iter().all(|&v| in_range(v)) {
        anyhow::bail!("score out of range: {sub_scores:?}");
    }
    if report.verdict.trim().is_empty() {
        anyhow::bail!("empty verdict");
    }
    Ok(report)
}

/// Deterministic local scoring.  All four sub-scores measure AI-likelihood
/// on a 0–10 axis; `overall` is a fixed weighted blend, nudged by the
/// secondary quality scores when they are available.  Monotonic: more
/// tripped pattern counters never lowers `aiPatterns` or `overall`.
pub fn fallback_score(metrics: &CombinedMetrics) -> ScoreReport {
    let repo = &metrics.repository;
    let files = repo.total_files.max(1) as f64;
    let counters = &repo.ai_patterns;

    // Mean tripped detectors per file, scaled to 0–10.
    let ai_patterns = round1((counters.total() as f64 / (4.0 * files) * 10.0).clamp(0.0, 10.0));

    // Additive structural evidence at fixed 0.3 / 0.1 band edges.
    let generic = counters.generic_names as f64;
    let boilerplate = counters.boilerplate_code as f64;
    let mut structure: f64 = 0.0;
    if generic > files * 0.3 {
        structure += 4.0;
    } else if generic > files * 0.1 {
        structure += 2.0;
    }
    if boilerplate > files * 0.3 {
        structure += 3.0;
    } else if boilerplate > files * 0.1 {
        structure += 1.0;
    }
    if !repo.has_tests {
        structure += 2.0;
    }
    if !repo.has_readme {
        structure += 1.0;
    }
    let code_structure = structure.clamp(0.0, 10.0);

    // Comment-ratio bands; heavy uniform commenting is an authorship signal.
    let documentation = if repo.total_lines == 0 {
        0.0
    } else {
        let ratio = repo.comments_ratio;
        if ratio > 0.3 {
            10.0
        } else if ratio > 0.2 {
            8.0
        } else if ratio > 0.1 {
            6.0
        } else if ratio > 0.05 {
            4.0
        } else {
            2.0
        }
    };

    // Uniformity: formatting and repetition trip ratios.
    let formatting_ratio = counters.perfect_formatting as f64 / files;
    let repetition_ratio = counters.repetitive_patterns as f64 / files;
    let complexity =
        round1((formatting_ratio * 5.0 + repetition_ratio * 5.0).clamp(0.0, 10.0));

    let mut overall = 0.45 * ai_patterns
        + 0.25 * code_structure
        + 0.15 * documentation
        + 0.15 * complexity;

    // Low secondary quality scores pull toward vibe-coded.
    if let SecondaryOutcome::Metrics(secondary) = &metrics.secondary_analysis {
        let quality = (secondary.comments_score
            + secondary.naming_score
            + secondary.tests_score
            + secondary.examples_score)
            / 4.0;
        overall = 0.7 * overall + 0.3 * (10.0 - quality.clamp(0.0, 10.0));
    }
    let overall = round1(overall.clamp(0.0, 10.0));

    ScoreReport {
        ai_patterns,
        code_structure,
        documentation,
        complexity,
        overall,
        is_vibe_coded: overall >= VIBE_THRESHOLD,
        verdict: verdict_for(overall).to_string(),
        highlights: metrics.combined_highlights.clone(),
    }
}

/// Verdict bands over the overall score.
pub fn verdict_for(overall: f64) -> &'static str {
    if overall >= 8.5 {
        "Vibe-coded, no doubt about it"
    } else if overall >= VIBE_THRESHOLD {
        "Likely vibe-coded"
    } else if overall >= 4.0 {
        "Mixed signals"
    } else if overall >= 2.0 {
        "Mostly hand-written"
    } else {
        "Hand-written"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{AiPatternCounters, RepositoryMetrics, SecondaryMetrics};
    use std::collections::BTreeMap;

    fn combined(counters: AiPatternCounters, files: usize) -> CombinedMetrics {
        let repo = RepositoryMetrics {
            total_files: files,
            total_lines: files * 100,
            comment_lines: files * 10,
            comments_ratio: 0.1,
            has_readme: true,
            has_tests: true,
            file_types: BTreeMap::new(),
            code_samples: vec![],
            ai_patterns: counters,
            used_branch: None,
        };
        crate::merge::merge(
            &repo,
            SecondaryOutcome::Failed {
                error: "unavailable".to_string(),
            },
        )
    }

    struct FixedScorer(ScoreReport);

    impl ScoreProvider for FixedScorer {
        fn name(&self) -> &str {
            "fixed"
        }
        fn score(&self, _metrics: &CombinedMetrics) -> anyhow::Result<ScoreReport> {
            Ok(self.0.clone())
        }
    }

    struct FailingScorer;

    impl ScoreProvider for FailingScorer {
        fn name(&self) -> &str {
            "failing"
        }
        fn score(&self, _metrics: &CombinedMetrics) -> anyhow::Result<ScoreReport> {
            anyhow::bail!("connection refused")
        }
    }

    fn in_bounds(report: &ScoreReport) {
        for v in [
            report.ai_patterns,
            report.code_structure,
            report.documentation,
            report.complexity,
            report.overall,
        ] {
            assert!((0.0..=10.0).contains(&v), "out of bounds: {v}");
        }
    }

    #[test]
    fn fallback_is_total_over_degenerate_inputs() {
        // Empty repository.
        let empty = combined(AiPatternCounters::default(), 0);
        in_bounds(&fallback_score(&empty));

        // Every counter saturated.
        let saturated = combined(
            AiPatternCounters {
                generic_names: 50,
                perfect_formatting: 50,
                boilerplate_code: 50,
                repetitive_patterns: 50,
            },
            10,
        );
        let report = fallback_score(&saturated);
        in_bounds(&report);
        assert!(report.is_vibe_coded);
    }

    #[test]
    fn more_pattern_trips_never_lower_the_score() {
        let mut previous = -1.0;
        for trips in 0..=10u32 {
            let report = fallback_score(&combined(
                AiPatternCounters {
                    generic_names: trips,
                    perfect_formatting: trips,
                    boilerplate_code: trips,
                    repetitive_patterns: trips,
                },
                10,
            ));
            assert!(
                report.overall >= previous,
                "overall dropped from {previous} at {trips} trips"
            );
            previous = report.overall;
        }
    }

    #[test]
    fn clean_repository_scores_low() {
        let report = fallback_score(&combined(AiPatternCounters::default(), 10));
        assert!(!report.is_vibe_coded);
        assert!(report.overall < VIBE_THRESHOLD);
        assert_eq!(report.ai_patterns, 0.0);
    }

    #[test]
    fn fallback_is_deterministic() {
        let metrics = combined(
            AiPatternCounters {
                generic_names: 3,
                perfect_formatting: 1,
                boilerplate_code: 0,
                repetitive_patterns: 2,
            },
            7,
        );
        assert_eq!(fallback_score(&metrics), fallback_score(&metrics));
    }

    #[test]
    fn low_secondary_quality_pulls_toward_vibe_coded() {
        let repo = combined(AiPatternCounters::default(), 10).repository;
        let weak = crate::merge::merge(
            &repo,
            SecondaryOutcome::Metrics(SecondaryMetrics {
                comments_score: 0.0,
                naming_score: 0.0,
                tests_score: 0.0,
                examples_score: 0.0,
                highlights: vec![],
            }),
        );
        let strong = crate::merge::merge(
            &repo,
            SecondaryOutcome::Metrics(SecondaryMetrics {
                comments_score: 10.0,
                naming_score: 10.0,
                tests_score: 10.0,
                examples_score: 10.0,
                highlights: vec![],
            }),
        );
        assert!(fallback_score(&weak).overall > fallback_score(&strong).overall);
    }

    #[test]
    fn engine_prefers_a_healthy_provider() {
        let fixed = ScoreReport {
            ai_patterns: 1.0,
            code_structure: 2.0,
            documentation: 3.0,
            complexity: 4.0,
            overall: 2.5,
            is_vibe_coded: false,
            verdict: "Mostly hand-written".to_string(),
            highlights: vec![],
        };
        let engine = ScoringEngine::new(Some(Box::new(FixedScorer(fixed.clone()))));
        let report = engine.score(&combined(AiPatternCounters::default(), 3));
        assert_eq!(report, fixed);
    }

    #[test]
    fn engine_falls_back_when_provider_errors() {
        let engine = ScoringEngine::new(Some(Box::new(FailingScorer)));
        let metrics = combined(AiPatternCounters::default(), 3);
        assert_eq!(engine.score(&metrics), fallback_score(&metrics));
    }

    #[test]
    fn engine_falls_back_on_out_of_range_response() {
        let bogus = ScoreReport {
            ai_patterns: 42.0,
            code_structure: 0.0,
            documentation: 0.0,
            complexity: 0.0,
            overall: 5.0,
            is_vibe_coded: false,
            verdict: "nope".to_string(),
            highlights: vec![],
        };
        let engine = ScoringEngine::new(Some(Box::new(FixedScorer(bogus))));
        let metrics = combined(AiPatternCounters::default(), 3);
        assert_eq!(engine.score(&metrics), fallback_score(&metrics));
    }

    #[test]
    fn verdict_bands_are_monotonic() {
        assert_eq!(verdict_for(9.0), "Vibe-coded, no doubt about it");
        assert_eq!(verdict_for(6.0), "Likely vibe-coded");
        assert_eq!(verdict_for(4.5), "Mixed signals");
        assert_eq!(verdict_for(2.0), "Mostly hand-written");
        assert_eq!(verdict_for(0.0), "Hand-written");
    }
}

//! Reconciles primary and secondary metrics into one combined view.

use std::collections::HashSet;

use crate::metrics::{CombinedMetrics, RepositoryMetrics, SecondaryOutcome};

/// Merge the walker's metrics with one secondary-analyzer outcome.
///
/// Pure and deterministic: the same inputs always produce byte-identical
/// output, and neither input is mutated.  A failed secondary analysis still
/// yields a combined view carrying every repository field — the failure is
/// embedded, not propagated.
pub fn merge(repository: &RepositoryMetrics, secondary: SecondaryOutcome) -> CombinedMetrics {
    let secondary = normalize(secondary);

    let mut highlights = repository_highlights(repository);
    if let SecondaryOutcome::Metrics(ref metrics) = secondary {
        highlights.extend(metrics.highlights.iter().cloned());
    }

    CombinedMetrics {
        repository: repository.clone(),
        secondary_analysis: secondary,
        combined_highlights: dedup_first_seen(highlights),
        combined: true,
    }
}

/// Clamp secondary sub-scores into [0, 10].  Missing scores already
/// defaulted to 0 at parse time.
fn normalize(outcome: SecondaryOutcome) -> SecondaryOutcome {
    match outcome {
        SecondaryOutcome::Metrics(mut metrics) => {
            metrics.comments_score = metrics.comments_score.clamp(0.0, 10.0);
            metrics.naming_score = metrics.naming_score.clamp(0.0, 10.0);
            metrics.tests_score = metrics.tests_score.clamp(0.0, 10.0);
            metrics.examples_score = metrics.examples_score.clamp(0.0, 10.0);
            SecondaryOutcome::Metrics(metrics)
        }
        failed => failed,
    }
}

/// Highlights derived from the repository metrics alone.
pub fn repository_highlights(metrics: &RepositoryMetrics) -> Vec<String> {
    let mut highlights = Vec::new();
    let counters = &metrics.ai_patterns;

    if counters.generic_names > 0 {
        highlights.push(format!(
            "Generic naming patterns detected ({} files)",
            counters.generic_names
        ));
    }
    if counters.perfect_formatting > 0 {
        highlights.push(format!(
            "Suspiciously uniform formatting ({} files)",
            counters.perfect_formatting
        ));
    }
    if counters.boilerplate_code > 0 {
        highlights.push(format!(
            "Boilerplate code patterns ({} files)",
            counters.boilerplate_code
        ));
    }
    if counters.repetitive_patterns > 0 {
        highlights.push(format!(
            "Repetitive code patterns ({} files)",
            counters.repetitive_patterns
        ));
    }
    if metrics.has_readme {
        highlights.push("README present".to_string());
    }
    if metrics.has_tests {
        highlights.push("Test files found".to_string());
    }
    if highlights.is_empty() {
        highlights.push("Basic code structure".to_string());
    }

    highlights
}

/// Remove exact-string duplicates, keeping the first occurrence of each.
fn dedup_first_seen(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{AiPatternCounters, SecondaryMetrics};
    use std::collections::BTreeMap;

    fn repo_metrics() -> RepositoryMetrics {
        RepositoryMetrics {
            total_files: 4,
            total_lines: 200,
            comment_lines: 20,
            comments_ratio: 0.1,
            has_readme: true,
            has_tests: true,
            file_types: BTreeMap::from([("rs".to_string(), 4)]),
            code_samples: vec![],
            ai_patterns: AiPatternCounters {
                generic_names: 2,
                ..Default::default()
            },
            used_branch: Some("main".to_string()),
        }
    }

    fn secondary() -> SecondaryOutcome {
        SecondaryOutcome::Metrics(SecondaryMetrics {
            comments_score: 6.0,
            naming_score: 12.0, // out of range, gets clamped
            tests_score: -1.0,  // likewise
            examples_score: 5.0,
            highlights: vec![
                "Test files found".to_string(), // duplicate of a repo highlight
                "Good documentation/examples".to_string(),
            ],
        })
    }

    #[test]
    fn failed_secondary_still_carries_repository_fields() {
        let repo = repo_metrics();
        let combined = merge(
            &repo,
            SecondaryOutcome::Failed {
                error: "timed out".to_string(),
            },
        );
        assert!(combined.combined);
        assert_eq!(combined.repository, repo);
        assert!(combined.secondary_analysis.is_failed());
        assert!(!combined.combined_highlights.is_empty());
    }

    #[test]
    fn secondary_scores_are_clamped() {
        let combined = merge(&repo_metrics(), secondary());
        let metrics = combined.secondary_analysis.as_metrics().unwrap();
        assert_eq!(metrics.naming_score, 10.0);
        assert_eq!(metrics.tests_score, 0.0);
        assert_eq!(metrics.comments_score, 6.0);
    }

    #[test]
    fn highlights_are_deduplicated_in_first_seen_order() {
        let combined = merge(&repo_metrics(), secondary());
        let highlights = &combined.combined_highlights;

        let unique: HashSet<_> = highlights.iter().collect();
        assert_eq!(unique.len(), highlights.len(), "duplicates survived: {highlights:?}");

        // Repo-derived highlights come first, then novel secondary ones.
        assert_eq!(highlights[0], "Generic naming patterns detected (2 files)");
        assert!(highlights.contains(&"Test files found".to_string()));
        assert!(highlights.contains(&"Good documentation/examples".to_string()));
        assert_eq!(
            highlights.iter().filter(|h| *h == "Test files found").count(),
            1
        );
    }

    #[test]
    fn merge_is_deterministic() {
        let repo = repo_metrics();
        let a = merge(&repo, secondary());
        let b = merge(&repo, secondary());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn bare_repository_gets_fallback_highlight() {
        let mut repo = repo_metrics();
        repo.has_readme = false;
        repo.has_tests = false;
        repo.ai_patterns = AiPatternCounters::default();

        let highlights = repository_highlights(&repo);
        assert_eq!(highlights, vec!["Basic code structure".to_string()]);
    }
}

#![deny(dead_code)]

//! Repository metrics and heuristic scoring engine.
//!
//! One analysis run is a sequential pipeline: fetch the repository into a
//! private scratch directory, walk the tree into [`metrics::RepositoryMetrics`],
//! run the secondary analyzer (time-bounded, failure-tolerant), merge both
//! views, and score the result — remotely when a scorer is configured,
//! locally and deterministically otherwise.

pub mod classify;
pub mod comments;
pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod metrics;
pub mod output;
pub mod patterns;
pub mod scoring;
pub mod secondary;
pub mod walker;

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use config::EngineConfig;
use error::EngineError;
use metrics::{AnalysisOutcome, SecondaryOutcome};
use scoring::{RemoteScorer, ScoreProvider, ScoringEngine, SCORER_TIMEOUT};
use secondary::SecondaryAnalyzer;

/// The analysis engine.  Construction wires up the configured collaborators;
/// each call to an entry point is an independent request.
pub struct Engine {
    config: EngineConfig,
    scoring: ScoringEngine,
}

impl Engine {
    /// Build an engine from config, wiring up the remote scorer when an
    /// endpoint is configured.
    pub fn new(config: EngineConfig) -> Self {
        let provider: Option<Box<dyn ScoreProvider>> = config
            .scoring
            .endpoint
            .as_deref()
            .and_then(|endpoint| match RemoteScorer::new(endpoint, SCORER_TIMEOUT) {
                Ok(scorer) => Some(Box::new(scorer) as Box<dyn ScoreProvider>),
                Err(err) => {
                    tracing::warn!(error = %err, "could not build remote scorer; scoring locally");
                    None
                }
            });
        Self {
            config,
            scoring: ScoringEngine::new(provider),
        }
    }

    /// Build an engine with an explicit scoring provider (or none, for
    /// guaranteed local scoring).  Intended for tests and embedders.
    pub fn with_provider(config: EngineConfig, provider: Option<Box<dyn ScoreProvider>>) -> Self {
        Self {
            config,
            scoring: ScoringEngine::new(provider),
        }
    }

    /// Analyze a remote repository.
    ///
    /// The clone lives in a uniquely-named scratch directory owned by this
    /// request; the directory is removed on every exit path, including
    /// errors, when the guard drops.
    pub fn analyze_repository(
        &self,
        locator: &str,
        branch: Option<&str>,
    ) -> Result<AnalysisOutcome, EngineError> {
        fetch::validate_locator(locator)?;
        let started = Instant::now();

        let scratch = tempfile::tempdir()
            .map_err(|err| EngineError::Fetch(format!("cannot create scratch directory: {err}")))?;
        let fetched = fetch::fetch(locator, branch, scratch.path())?;
        info!(locator, branch = %fetched.used_branch, "repository fetched");

        self.analyze_root(&fetched.root, Some(fetched.used_branch), started)
    }

    /// Analyze an already-local tree.  No fetch, no branch bookkeeping.
    pub fn analyze_tree(&self, root: &Path) -> Result<AnalysisOutcome, EngineError> {
        self.analyze_root(root, None, Instant::now())
    }

    fn analyze_root(
        &self,
        root: &Path,
        used_branch: Option<String>,
        started: Instant,
    ) -> Result<AnalysisOutcome, EngineError> {
        let mut repository =
            walker::walk(root, &walker::DefaultIgnores).map_err(EngineError::Tree)?;
        repository.used_branch = used_branch;
        debug!(
            files = repository.total_files,
            lines = repository.total_lines,
            "walk complete"
        );

        let secondary = self.run_secondary(root);
        let partial = secondary.is_failed();

        let combined = merge::merge(&repository, secondary);
        let report = self.scoring.score(&combined);

        Ok(AnalysisOutcome {
            total_files: combined.repository.total_files,
            total_lines: combined.repository.total_lines,
            comments_ratio: combined.repository.comments_ratio,
            has_readme: combined.repository.has_readme,
            has_tests: combined.repository.has_tests,
            used_branch: combined.repository.used_branch.clone(),
            partial,
            elapsed_ms: as_millis(started.elapsed()),
            report,
        })
    }

    /// Probe-then-analyze.  An unconfigured or unresponsive analyzer is an
    /// outcome, not an error.
    fn run_secondary(&self, root: &Path) -> SecondaryOutcome {
        let command = &self.config.secondary.command;
        if command.is_empty() {
            return SecondaryOutcome::Failed {
                error: "secondary analyzer not configured".to_string(),
            };
        }
        let analyzer = SecondaryAnalyzer::new(command.clone());
        if !analyzer.probe() {
            return SecondaryOutcome::Failed {
                error: "secondary analyzer unavailable".to_string(),
            };
        }
        analyzer.analyze(root)
    }
}

fn as_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

//! Engine configuration: collaborator wiring only.
//!
//! `vibescope.toml` configures the secondary analyzer command and the
//! scoring endpoint.  Heuristic thresholds are deliberately absent — they
//! are fixed constants in [`crate::patterns`], not knobs.
//!
//! ```toml
//! [secondary]
//! command = ["python3", "analyzer.py"]
//!
//! [scoring]
//! endpoint = "https://scores.internal/v1/score"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Config file name, looked up in the engine's working directory.
pub const CONFIG_FILE: &str = "vibescope.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub secondary: SecondaryConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecondaryConfig {
    /// Argv prefix for the external analyzer; the repository root is
    /// appended at invocation time.  Empty means "not configured".
    #[serde(default)]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    /// Remote scoring endpoint.  Absent means local fallback scoring only.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl EngineConfig {
    /// Load `vibescope.toml` from `dir`, silently defaulting when the file
    /// is absent and warning (but still defaulting) when it fails to parse.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse config; using defaults");
                Self::default()
            }
        }
    }

    /// Load from an explicit path.  Errors if the file cannot be read or
    /// parsed.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|err| anyhow::anyhow!("failed to parse {}: {err}", path.display()))
    }
}

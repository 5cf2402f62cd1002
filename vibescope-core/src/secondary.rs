//! Adapter for the independent secondary analyzer.
//!
//! The analyzer is an external process invoked with the repository root as
//! its final argument.  Its contract: emit at least one self-contained JSON
//! record on stdout (diagnostics go to stderr).  The adapter takes the last
//! line that looks like a record and parses it strictly; a malformed record
//! is a parse failure, not something to guess around.
//!
//! Every failure mode (spawn error, non-zero exit, timeout, no record,
//! malformed record) yields [`SecondaryOutcome::Failed`] — the adapter never
//! returns `Err`, so a broken analyzer can only ever degrade an analysis.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::metrics::SecondaryOutcome;

/// Hard ceiling on one analyzer invocation.
pub const ANALYZER_TIMEOUT: Duration = Duration::from_secs(60);
/// Ceiling on the availability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Captured-output cap per stream.
const MAX_CAPTURED_OUTPUT: u64 = 1024 * 1024;

pub struct SecondaryAnalyzer {
    command: Vec<String>,
    timeout: Duration,
}

impl SecondaryAnalyzer {
    /// `command` is the analyzer's argv prefix, e.g.
    /// `["python3", "analyzer.py"]`; the repository root is appended.
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            timeout: ANALYZER_TIMEOUT,
        }
    }

    /// Override the invocation ceiling (tests use sub-second values).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Quick availability check: run `<command> --version` under
    /// [`PROBE_TIMEOUT`].  Collaborators use this to decide whether to
    /// attempt an analysis at all.
    pub fn probe(&self) -> bool {
        let Some((program, args)) = self.command.split_first() else {
            return false;
        };
        let child = Command::new(program)
            .args(args)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(_) => return false,
        };
        match child.wait_timeout(PROBE_TIMEOUT) {
            Ok(Some(status)) => status.success(),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                false
            }
        }
    }

    /// Run the analyzer against `root` and parse its output.
    pub fn analyze(&self, root: &Path) -> SecondaryOutcome {
        let Some((program, args)) = self.command.split_first() else {
            return failed("no secondary analyzer configured");
        };

        let child = Command::new(program)
            .args(args)
            .arg(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(err) => return failed(format!("failed to spawn {program}: {err}")),
        };

        // Drain both pipes on their own threads before waiting; a full pipe
        // buffer would otherwise deadlock the child against wait_timeout.
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let status = match child.wait_timeout(self.timeout) {
            Ok(status) => status,
            Err(err) => {
                kill(&mut child);
                return failed(format!("failed to wait for analyzer: {err}"));
            }
        };

        let status = match status {
            Some(status) => status,
            None => {
                kill(&mut child);
                return failed(format!(
                    "analyzer timed out after {}s",
                    self.timeout.as_secs()
                ));
            }
        };

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);

        if !status.success() {
            let tail: String = stderr.lines().rev().take(3).collect::<Vec<_>>().join(" | ");
            return failed(format!("analyzer exited with {status}: {tail}"));
        }

        debug!(bytes = stdout.len(), "analyzer finished");
        match parse_last_record(&stdout) {
            Ok(outcome) => outcome,
            Err(reason) => failed(reason),
        }
    }
}

/// Find the last stdout line that is a self-contained record (`{…}` on one
/// line) and parse it strictly.  An `{"error": …}` record becomes a
/// `Failed` outcome via the untagged enum.
fn parse_last_record(stdout: &str) -> Result<SecondaryOutcome, String> {
    let candidate = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('{') && line.ends_with('}'))
        .ok_or_else(|| "analyzer produced no structured record".to_string())?;

    serde_json::from_str(candidate).map_err(|err| format!("malformed analyzer record: {err}"))
}

fn failed(error: impl Into<String>) -> SecondaryOutcome {
    let error = error.into();
    warn!(%error, "secondary analyzer failed");
    SecondaryOutcome::Failed { error }
}

fn spawn_reader<R: Read + Send + 'static>(stream: R) -> thread::JoinHandle<String> {
    thread::spawn(move || read_capped(stream))
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Read a stream to a lossy string, capped at [`MAX_CAPTURED_OUTPUT`];
/// the remainder is drained so the child never blocks on a full pipe.
fn read_capped<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let _ = (&mut stream).take(MAX_CAPTURED_OUTPUT).read_to_end(&mut buf);
    let mut sink = [0u8; 8192];
    while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
    String::from_utf8_lossy(&buf).into_owned()
}

fn kill(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}

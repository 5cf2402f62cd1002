//! Repository fetch: clone a locator into the request's scratch directory,
//! trying branch candidates in a fixed order.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::EngineError;

/// Default branches tried after the caller's hint.
pub const BRANCH_CANDIDATES: &[&str] = &["main", "master"];

/// A successfully fetched repository.
#[derive(Debug)]
pub struct FetchedRepo {
    pub root: PathBuf,
    pub used_branch: String,
}

/// Reject obviously malformed locators before any fetch is attempted.
pub fn validate_locator(locator: &str) -> Result<(), EngineError> {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("empty locator".to_string()));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EngineError::Validation(format!(
            "locator contains whitespace: {trimmed}"
        )));
    }
    let supported = trimmed.starts_with("https://")
        || trimmed.starts_with("http://")
        || trimmed.starts_with("git@")
        || trimmed.starts_with("file://")
        || Path::new(trimmed).is_absolute();
    if !supported {
        return Err(EngineError::Validation(format!(
            "unsupported locator scheme: {trimmed}"
        )));
    }
    Ok(())
}

/// Clone `url` under `scratch`, trying the branch hint, then
/// [`BRANCH_CANDIDATES`], then an unqualified clone whose branch is read
/// back from HEAD.  Returns the clone root and the branch that won.
pub fn fetch(
    url: &str,
    branch_hint: Option<&str>,
    scratch: &Path,
) -> Result<FetchedRepo, EngineError> {
    let dest = scratch.join("repo");

    let mut candidates: Vec<&str> = Vec::new();
    if let Some(hint) = branch_hint {
        candidates.push(hint);
    }
    for candidate in BRANCH_CANDIDATES {
        if !candidates.contains(candidate) {
            candidates.push(candidate);
        }
    }

    for branch in candidates {
        clear(&dest);
        debug!(url, branch, "attempting clone");
        if clone(url, Some(branch), &dest) {
            return Ok(FetchedRepo {
                root: dest,
                used_branch: branch.to_string(),
            });
        }
    }

    // Last resort: let the remote pick its default branch.
    clear(&dest);
    debug!(url, "attempting unqualified clone");
    if clone(url, None, &dest) {
        let used_branch = head_branch(&dest).unwrap_or_else(|| "HEAD".to_string());
        return Ok(FetchedRepo {
            root: dest,
            used_branch,
        });
    }

    Err(EngineError::Fetch(format!(
        "no branch of {url} could be fetched"
    )))
}

fn clone(url: &str, branch: Option<&str>, dest: &Path) -> bool {
    let mut args: Vec<&str> = vec!["clone", "--depth", "1"];
    if let Some(branch) = branch {
        args.push("--branch");
        args.push(branch);
    }
    args.push(url);
    let dest_str = dest.to_string_lossy();
    args.push(dest_str.as_ref());

    run_git(&args, None)
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Branch name of HEAD in an existing clone.
fn head_branch(repo: &Path) -> Option<String> {
    let output = run_git(&["rev-parse", "--abbrev-ref", "HEAD"], Some(repo)).ok()?;
    if !output.status.success() {
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn run_git(args: &[&str], cwd: Option<&Path>) -> std::io::Result<Output> {
    let mut cmd = Command::new("git");
    cmd.args(args).stdin(Stdio::null());
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    cmd.output()
}

fn clear(dest: &Path) {
    if dest.exists() {
        let _ = fs::remove_dir_all(dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_locator_is_invalid() {
        assert!(matches!(
            validate_locator("   "),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn whitespace_in_locator_is_invalid() {
        assert!(matches!(
            validate_locator("https://example.com/a b"),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn unknown_scheme_is_invalid() {
        assert!(matches!(
            validate_locator("ftp://example.com/repo"),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn https_ssh_and_absolute_paths_are_valid() {
        assert!(validate_locator("https://github.com/acme/widgets").is_ok());
        assert!(validate_locator("git@github.com:acme/widgets.git").is_ok());
        assert!(validate_locator("/srv/git/widgets.git").is_ok());
        assert!(validate_locator("file:///srv/git/widgets.git").is_ok());
    }

    #[test]
    fn fetch_of_nonexistent_repo_is_a_fetch_error() {
        let scratch = tempfile::tempdir().unwrap();
        let result = fetch(
            scratch.path().join("no-such-repo").to_str().unwrap(),
            None,
            scratch.path(),
        );
        assert!(matches!(result, Err(EngineError::Fetch(_))));
    }
}

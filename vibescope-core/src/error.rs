//! The request-fatal error taxonomy.
//!
//! Only locator validation, fetch exhaustion, and an unreadable tree root
//! terminate a request.  Every other failure kind (unreadable file,
//! secondary-analyzer outage, scoring-collaborator outage) is recovered
//! in place and never surfaces here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed repository locator, rejected before any fetch is attempted.
    #[error("invalid repository locator: {0}")]
    Validation(String),

    /// No branch candidate could be fetched.
    #[error("repository unavailable: {0}")]
    Fetch(String),

    /// The repository tree's root path could not be read.
    #[error("failed to read repository tree")]
    Tree(#[source] std::io::Error),
}

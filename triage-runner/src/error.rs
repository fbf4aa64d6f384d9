//! Runner error types

use thiserror::Error;
use triage_config::ConfigError;
use triage_core::{CatalogError, ProfileError, TriageError};
use triage_http::HttpError;

/// Errors that prevent a run from starting or finishing cleanly.
///
/// Request failures never surface here; they are recorded as outcomes.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Task catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("Virtual user error: {0}")]
    User(#[from] TriageError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type RunnerResult<T> = Result<T, RunnerError>;

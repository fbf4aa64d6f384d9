//! Core error types for Triage

use thiserror::Error;

/// Core error type for all Triage errors
#[derive(Debug, Error)]
pub enum TriageError {
    /// Load profile errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Task catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Invalid virtual user state transition
    #[error("Invalid user state transition: {from} -> {to}")]
    InvalidTransition {
        from: crate::user::UserState,
        to: crate::user::UserState,
    },
}

/// Result type alias for Triage
pub type Result<T> = std::result::Result<T, TriageError>;

/// Load profile misconfiguration. Always fatal at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("load profile has no stages")]
    Empty,

    #[error(
        "stage {index} ends at {duration_seconds}s which is not after the previous stage ({previous}s)"
    )]
    Unsorted {
        index: usize,
        duration_seconds: u64,
        previous: u64,
    },

    #[error("stage {index} has invalid spawn rate {spawn_rate}; must be a finite number > 0")]
    InvalidSpawnRate { index: usize, spawn_rate: f64 },
}

/// Task catalog errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("task catalog is empty")]
    Empty,

    #[error("task '{0}' has weight 0")]
    ZeroWeight(String),

    #[error("unknown task '{0}'")]
    UnknownTask(String),
}

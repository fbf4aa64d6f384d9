//! Core domain models and types for Triage
//!
//! This crate contains the load-generation primitives that have no I/O:
//! the staged load shape, weighted selection, outcome records, the virtual
//! user lifecycle and run-level aggregation.

pub mod error;
pub mod observer;
pub mod outcome;
pub mod report;
pub mod shape;
pub mod user;
pub mod weighted;

// Re-export commonly used types at the crate root
pub use error::{CatalogError, ProfileError, Result, TriageError};
pub use observer::{Observers, RunInfo, RunObserver};
pub use outcome::{Attempt, Outcome, OutcomeRecord};
pub use report::{FailureSample, LatencySummary, RunReport, StatsCollector, StopReason, TaskStats};
pub use shape::{default_stages, LoadShape, Stage, StageTarget};
pub use user::{UserId, UserState};
pub use weighted::WeightedTable;

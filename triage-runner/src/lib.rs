//! Load generation for the hospital record service.
//!
//! [`Orchestrator`] polls the [`LoadShape`](triage_core::LoadShape) every
//! tick and steers a [`UserPool`] toward the requested concurrency. Each
//! [`VirtualUser`] picks a task from the shared [`TaskCatalog`] by weight,
//! issues one request, reports an outcome record and waits. Outcomes funnel
//! through an [`OutcomeSink`] into a single aggregator that owns the
//! statistics.

pub mod catalog;
pub mod error;
pub mod orchestrator;
pub mod pool;
pub mod session;
pub mod sink;
pub mod tasks;
pub mod user;

pub use catalog::TaskCatalog;
pub use error::{RunnerError, RunnerResult};
pub use orchestrator::{Orchestrator, RunSettings};
pub use pool::UserPool;
pub use session::UserSession;
pub use sink::{outcome_channel, spawn_aggregator, OutcomeSink, RunClock};
pub use tasks::{hospital_tasks, parse_created_id, Entity, Task, TaskKind, CREATED_MARKER};
pub use user::{UserContext, UserExit, VirtualUser, WaitRange};

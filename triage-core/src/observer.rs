//! Run lifecycle notifications.
//!
//! The orchestrator invokes observers synchronously. Load generation code never
//! logs on its own; anything that wants to render progress implements
//! [`RunObserver`].

use crate::outcome::OutcomeRecord;
use crate::report::RunReport;
use crate::shape::StageTarget;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Facts about a run, available when it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub target: String,
    pub peak_users: u32,
    pub planned_duration: Duration,
    pub stages: usize,
    pub tasks: Vec<String>,
    pub seed: Option<u64>,
}

/// Observer of run milestones. Every method defaults to a no-op.
pub trait RunObserver: Send + Sync {
    fn on_start(&self, _info: &RunInfo) {}

    /// The load shape asked for a different target than on the previous tick
    fn on_target_changed(&self, _elapsed: Duration, _target: &StageTarget) {}

    fn on_request_completed(&self, _record: &OutcomeRecord) {}

    fn on_stop(&self, _report: &RunReport) {}
}

/// Fan-out over several observers, in registration order
#[derive(Clone, Default)]
pub struct Observers {
    observers: Vec<Arc<dyn RunObserver>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: Arc<dyn RunObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl RunObserver for Observers {
    fn on_start(&self, info: &RunInfo) {
        for observer in &self.observers {
            observer.on_start(info);
        }
    }

    fn on_target_changed(&self, elapsed: Duration, target: &StageTarget) {
        for observer in &self.observers {
            observer.on_target_changed(elapsed, target);
        }
    }

    fn on_request_completed(&self, record: &OutcomeRecord) {
        for observer in &self.observers {
            observer.on_request_completed(record);
        }
    }

    fn on_stop(&self, report: &RunReport) {
        for observer in &self.observers {
            observer.on_stop(report);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}

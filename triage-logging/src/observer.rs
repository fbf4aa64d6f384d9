//! Logging observer for run milestones

use std::time::Duration;
use tracing::{debug, error, info, warn};
use triage_core::{OutcomeRecord, RunInfo, RunObserver, RunReport, StageTarget};

/// Renders run events as `tracing` events
///
/// Failed requests are logged at `error`, successful requests slower than
/// the threshold at `warn`, everything else per request at `debug`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    slow_request_threshold: Duration,
}

impl TracingObserver {
    pub fn new(slow_request_threshold: Duration) -> Self {
        Self {
            slow_request_threshold,
        }
    }

    pub fn slow_request_threshold(&self) -> Duration {
        self.slow_request_threshold
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

impl RunObserver for TracingObserver {
    fn on_start(&self, info: &RunInfo) {
        info!(
            target_host = %info.target,
            peak_users = info.peak_users,
            planned_secs = info.planned_duration.as_secs(),
            stages = info.stages,
            tasks = info.tasks.len(),
            seed = ?info.seed,
            "Load test starting"
        );
    }

    fn on_target_changed(&self, elapsed: Duration, target: &StageTarget) {
        info!(
            elapsed_secs = elapsed.as_secs(),
            users = target.users,
            spawn_rate = target.spawn_rate,
            "Target concurrency changed"
        );
    }

    fn on_request_completed(&self, record: &OutcomeRecord) {
        match record.outcome.failure_reason() {
            Some(reason) => {
                error!(
                    task = %record.task,
                    user = %record.user,
                    status = ?record.status,
                    latency_ms = record.latency_ms(),
                    "Request failed: {}",
                    reason
                );
            }
            None if record.latency > self.slow_request_threshold => {
                warn!(
                    task = %record.task,
                    user = %record.user,
                    latency_ms = record.latency_ms(),
                    threshold_ms = self.slow_request_threshold.as_millis() as u64,
                    "Slow request"
                );
            }
            None => {
                debug!(
                    task = %record.task,
                    user = %record.user,
                    latency_ms = record.latency_ms(),
                    bytes = record.response_length,
                    "Request completed"
                );
            }
        }
    }

    fn on_stop(&self, report: &RunReport) {
        info!(
            reason = %report.stop_reason,
            duration_secs = report.duration_secs,
            requests = report.total.requests,
            failures = report.total.failures,
            rps = report.requests_per_second,
            "Load test stopped"
        );
    }
}

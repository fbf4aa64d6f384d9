//! Run-level aggregation of outcome records

use crate::outcome::OutcomeRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Name used for the all-tasks row
pub const AGGREGATED: &str = "Aggregated";

/// Latency distribution in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub min_ms: u64,
    pub avg_ms: f64,
    pub max_ms: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

impl LatencySummary {
    /// Summarise a sorted slice of latencies
    fn from_sorted(sorted: &[u64]) -> Self {
        if sorted.is_empty() {
            return Self::default();
        }
        Self {
            min_ms: sorted[0],
            avg_ms: sorted.iter().sum::<u64>() as f64 / sorted.len() as f64,
            max_ms: sorted[sorted.len() - 1],
            p50_ms: percentile(sorted, 50.0),
            p95_ms: percentile(sorted, 95.0),
            p99_ms: percentile(sorted, 99.0),
        }
    }
}

/// Nearest-rank percentile over a sorted slice
pub fn percentile(sorted: &[u64], pct: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Per-task (or aggregated) statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub failure_ratio: f64,
    pub response_bytes: u64,
    pub latency: LatencySummary,
    pub status_codes: BTreeMap<u16, u64>,
}

/// A distinct failure reason and how often it was seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSample {
    pub task: String,
    pub reason: String,
    pub occurrences: u64,
}

/// Final report of a load test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub duration_secs: f64,
    pub requests_per_second: f64,
    pub peak_users: u32,
    pub stop_reason: StopReason,
    pub total: TaskStats,
    pub tasks: Vec<TaskStats>,
    pub failure_samples: Vec<FailureSample>,
    /// Failures whose reason arrived after the sample slots were full
    pub unsampled_failures: u64,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The load shape returned its terminal signal
    #[default]
    ProfileComplete,
    /// The configured maximum run time elapsed
    RunTimeLimit,
    /// Interrupted from outside (Ctrl-C)
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::ProfileComplete => "profile complete",
            StopReason::RunTimeLimit => "run time limit reached",
            StopReason::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    latencies_ms: Vec<u64>,
    requests: u64,
    failures: u64,
    response_bytes: u64,
    status_codes: BTreeMap<u16, u64>,
}

impl Accumulator {
    fn add(&mut self, record: &OutcomeRecord) {
        self.requests += 1;
        if !record.is_success() {
            self.failures += 1;
        }
        self.latencies_ms.push(record.latency_ms());
        self.response_bytes += record.response_length as u64;
        if let Some(status) = record.status {
            *self.status_codes.entry(status).or_insert(0) += 1;
        }
    }

    fn stats(&self, name: &str) -> TaskStats {
        let mut sorted = self.latencies_ms.clone();
        sorted.sort_unstable();
        TaskStats {
            name: name.to_string(),
            requests: self.requests,
            failures: self.failures,
            failure_ratio: if self.requests > 0 {
                self.failures as f64 / self.requests as f64
            } else {
                0.0
            },
            response_bytes: self.response_bytes,
            latency: LatencySummary::from_sorted(&sorted),
            status_codes: self.status_codes.clone(),
        }
    }
}

/// Aggregates outcome records. Owned by a single writer.
#[derive(Debug)]
pub struct StatsCollector {
    total: Accumulator,
    tasks: BTreeMap<String, Accumulator>,
    failure_counts: HashMap<(String, String), u64>,
    failure_order: Vec<(String, String)>,
    max_failure_samples: usize,
    unsampled_failures: u64,
}

impl StatsCollector {
    pub fn new(max_failure_samples: usize) -> Self {
        Self {
            total: Accumulator::default(),
            tasks: BTreeMap::new(),
            failure_counts: HashMap::new(),
            failure_order: Vec::new(),
            max_failure_samples,
            unsampled_failures: 0,
        }
    }

    pub fn record(&mut self, record: &OutcomeRecord) {
        self.total.add(record);
        self.tasks
            .entry(record.task.clone())
            .or_default()
            .add(record);

        if let Some(reason) = record.outcome.failure_reason() {
            let key = (record.task.clone(), reason.to_string());
            if let Some(count) = self.failure_counts.get_mut(&key) {
                *count += 1;
            } else if self.failure_order.len() < self.max_failure_samples {
                self.failure_order.push(key.clone());
                self.failure_counts.insert(key, 1);
            } else {
                self.unsampled_failures += 1;
            }
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.total.requests
    }

    pub fn total_failures(&self) -> u64 {
        self.total.failures
    }

    /// Build the report for a run that lasted `duration`
    pub fn finish(&self, duration: Duration) -> RunReport {
        let duration_secs = duration.as_secs_f64();
        let mut failure_samples: Vec<FailureSample> = self
            .failure_order
            .iter()
            .map(|key| FailureSample {
                task: key.0.clone(),
                reason: key.1.clone(),
                occurrences: self.failure_counts.get(key).copied().unwrap_or(0),
            })
            .collect();
        // Stable sort keeps first-seen order among equal counts.
        failure_samples.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));

        RunReport {
            duration_secs,
            requests_per_second: if duration_secs > 0.0 {
                self.total.requests as f64 / duration_secs
            } else {
                0.0
            },
            peak_users: 0,
            stop_reason: StopReason::default(),
            total: self.total.stats(AGGREGATED),
            tasks: self
                .tasks
                .iter()
                .map(|(name, acc)| acc.stats(name))
                .collect(),
            failure_samples,
            unsampled_failures: self.unsampled_failures,
        }
    }
}

impl RunReport {
    pub fn task(&self, name: &str) -> Option<&TaskStats> {
        self.tasks.iter().find(|stats| stats.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Attempt, Outcome};
    use crate::user::UserId;

    fn record(task: &str, latency_ms: u64, outcome: Outcome, status: Option<u16>) -> OutcomeRecord {
        OutcomeRecord::from_attempt(
            task,
            UserId(1),
            Duration::ZERO,
            Duration::from_millis(latency_ms),
            Attempt::new(outcome, status, 10),
        )
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let sorted: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&sorted, 50.0), 50);
        assert_eq!(percentile(&sorted, 95.0), 95);
        assert_eq!(percentile(&sorted, 99.0), 99);
        assert_eq!(percentile(&[7], 99.0), 7);
        assert_eq!(percentile(&[], 50.0), 0);
    }

    #[test]
    fn test_collector_aggregates_per_task() {
        let mut stats = StatsCollector::new(10);
        stats.record(&record("view_main_page", 10, Outcome::Success, Some(200)));
        stats.record(&record("view_main_page", 30, Outcome::Success, Some(200)));
        stats.record(&record(
            "create_hospital",
            20,
            Outcome::failure("Hospital creation failed: 500"),
            Some(500),
        ));

        let report = stats.finish(Duration::from_secs(2));
        assert_eq!(report.total.name, AGGREGATED);
        assert_eq!(report.total.requests, 3);
        assert_eq!(report.total.failures, 1);
        assert_eq!(report.total.response_bytes, 30);
        assert!((report.requests_per_second - 1.5).abs() < f64::EPSILON);

        let main = report.task("view_main_page").unwrap();
        assert_eq!(main.requests, 2);
        assert_eq!(main.latency.min_ms, 10);
        assert_eq!(main.latency.max_ms, 30);
        assert!((main.latency.avg_ms - 20.0).abs() < f64::EPSILON);
        assert_eq!(main.status_codes.get(&200), Some(&2));

        let create = report.task("create_hospital").unwrap();
        assert!((create.failure_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failure_sampling_is_bounded() {
        let mut stats = StatsCollector::new(2);
        for reason in ["a", "b", "a", "c", "d", "a", "c"] {
            stats.record(&record("t", 1, Outcome::failure(reason), None));
        }
        let report = stats.finish(Duration::from_secs(1));
        assert_eq!(report.failure_samples.len(), 2);
        assert_eq!(report.failure_samples[0].reason, "a");
        assert_eq!(report.failure_samples[0].occurrences, 3);
        assert_eq!(report.failure_samples[1].reason, "b");
        // "c" twice and "d" once, counted per occurrence
        assert_eq!(report.unsampled_failures, 3);
        // Transport failures carry no status code
        assert!(report.total.status_codes.is_empty());
    }

    #[test]
    fn test_empty_report() {
        let report = StatsCollector::new(5).finish(Duration::ZERO);
        assert_eq!(report.total.requests, 0);
        assert_eq!(report.requests_per_second, 0.0);
        assert_eq!(report.total.latency, LatencySummary::default());
        assert!(report.tasks.is_empty());
    }
}

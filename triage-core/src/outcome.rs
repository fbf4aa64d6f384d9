//! Task outcomes and the records reported for every execution

use crate::user::UserId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one task execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Outcome::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}

/// What a task observed while issuing its single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub outcome: Outcome,
    /// `None` when no response arrived (transport error, timeout)
    pub status: Option<u16>,
    pub response_length: usize,
}

impl Attempt {
    pub fn new(outcome: Outcome, status: Option<u16>, response_length: usize) -> Self {
        Self {
            outcome,
            status,
            response_length,
        }
    }

    /// A request that never produced a response
    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Self::new(Outcome::failure(reason), None, 0)
    }
}

/// One appended record in the outcome sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub task: String,
    pub user: UserId,
    /// Run time at which the request started
    pub started_at: Duration,
    pub latency: Duration,
    pub status: Option<u16>,
    pub response_length: usize,
    pub outcome: Outcome,
}

impl OutcomeRecord {
    pub fn from_attempt(
        task: impl Into<String>,
        user: UserId,
        started_at: Duration,
        latency: Duration,
        attempt: Attempt,
    ) -> Self {
        Self {
            task: task.into(),
            user,
            started_at,
            latency,
            status: attempt.status,
            response_length: attempt.response_length,
            outcome: attempt.outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        assert!(Outcome::Success.is_success());
        assert_eq!(Outcome::Success.failure_reason(), None);

        let failed = Outcome::failure("Main page returned 500");
        assert!(!failed.is_success());
        assert_eq!(failed.failure_reason(), Some("Main page returned 500"));
    }

    #[test]
    fn test_record_from_attempt() {
        let attempt = Attempt::new(Outcome::Success, Some(200), 17);
        let record = OutcomeRecord::from_attempt(
            "view_main_page",
            UserId(3),
            Duration::from_secs(12),
            Duration::from_millis(42),
            attempt,
        );
        assert_eq!(record.task, "view_main_page");
        assert_eq!(record.status, Some(200));
        assert_eq!(record.latency_ms(), 42);
        assert!(record.is_success());

        let transport = Attempt::transport_failure("connection refused");
        assert_eq!(transport.status, None);
        assert_eq!(transport.response_length, 0);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(Outcome::failure("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"result": "failure", "reason": "boom"}));
    }
}

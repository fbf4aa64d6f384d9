//! Run reporting configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Reporting and request-level logging thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Requests slower than this are logged as warnings
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_slow_request_threshold"
    )]
    pub slow_request_threshold: Duration,

    /// Distinct failure reasons kept in the final report
    #[serde(default = "default_failure_samples")]
    pub failure_samples: usize,

    /// Write the final report as JSON to this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            slow_request_threshold: default_slow_request_threshold(),
            failure_samples: default_failure_samples(),
            report_path: None,
        }
    }
}

impl Validatable for ReportingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.slow_request_threshold.as_millis(),
            "slow_request_threshold",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "reporting"
    }
}

fn default_slow_request_threshold() -> Duration {
    Duration::from_millis(1000)
}

fn default_failure_samples() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporting_defaults() {
        let reporting = ReportingConfig::default();
        assert_eq!(reporting.slow_request_threshold, Duration::from_millis(1000));
        assert_eq!(reporting.failure_samples, 10);
        assert!(reporting.report_path.is_none());
        assert!(reporting.validate().is_ok());
    }
}

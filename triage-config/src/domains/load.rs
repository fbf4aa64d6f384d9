//! Load shape configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use triage_core::{default_stages, LoadShape, Stage};

/// Staged ramp profile and orchestrator cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Stage list; `duration_seconds` values are cumulative run-time thresholds
    #[serde(default = "default_stages")]
    pub stages: Vec<Stage>,

    /// How often the orchestrator queries the load shape
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_tick_interval"
    )]
    pub tick_interval: Duration,

    /// Seed for the run's random source; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Stop the run early after this long
    #[serde(
        with = "crate::domains::utils::serde_duration_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_run_time: Option<Duration>,
}

impl LoadConfig {
    /// Build the validated load shape
    pub fn shape(&self) -> ConfigResult<LoadShape> {
        LoadShape::new(self.stages.clone()).map_err(|e| self.validation_error(e.to_string()))
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
            tick_interval: default_tick_interval(),
            seed: None,
            max_run_time: None,
        }
    }
}

impl Validatable for LoadConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.shape()?;
        validate_positive(
            self.tick_interval.as_millis(),
            "tick_interval",
            self.domain_name(),
        )?;
        if let Some(limit) = self.max_run_time {
            validate_positive(limit.as_millis(), "max_run_time", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load"
    }
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

//! Virtual user behaviour configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-user pacing and task mix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Lower bound of the wait between two tasks
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_min_wait"
    )]
    pub min_wait: Duration,

    /// Upper bound of the wait between two tasks
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_max_wait"
    )]
    pub max_wait: Duration,

    /// Task weight overrides by task name; 0 removes the task
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub task_weights: BTreeMap<String, u32>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            min_wait: default_min_wait(),
            max_wait: default_max_wait(),
            task_weights: BTreeMap::new(),
        }
    }
}

impl Validatable for UserConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.min_wait > self.max_wait {
            return Err(self.validation_error(format!(
                "min_wait ({:?}) must not exceed max_wait ({:?})",
                self.min_wait, self.max_wait
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "user"
    }
}

fn default_min_wait() -> Duration {
    Duration::from_secs(1)
}

fn default_max_wait() -> Duration {
    Duration::from_secs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults() {
        let user = UserConfig::default();
        assert_eq!(user.min_wait, Duration::from_secs(1));
        assert_eq!(user.max_wait, Duration::from_secs(3));
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_wait_bounds_validation() {
        let mut user = UserConfig::default();
        user.min_wait = Duration::from_secs(5);
        assert!(user.validate().is_err());

        // A fixed wait is allowed
        user.max_wait = Duration::from_secs(5);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_zero_overrides_leave_unlisted_tasks() {
        // Unlisted tasks keep their default weights; an empty catalog is
        // rejected when the catalog is built, not here
        let mut user = UserConfig::default();
        user.task_weights.insert("view_main_page".to_string(), 0);
        assert!(user.validate().is_ok());
        user.task_weights.insert("view_doctors".to_string(), 0);
        assert!(user.validate().is_ok());
    }
}

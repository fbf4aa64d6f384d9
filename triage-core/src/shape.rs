//! Staged load shape.
//!
//! A [`LoadShape`] maps elapsed run time to the concurrency the orchestrator
//! should aim for. Stage thresholds are cumulative: a stage's
//! `duration_seconds` is the absolute run time at which it ends, not how long
//! it lasts. The first stage whose threshold is still ahead of the clock wins.

use crate::error::ProfileError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One segment of the load profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Absolute run time (seconds) at which this stage ends
    #[serde(alias = "duration")]
    pub duration_seconds: u64,

    /// Concurrent users to converge on while this stage is active
    #[serde(alias = "users")]
    pub target_users: u32,

    /// Users spawned or retired per second while converging
    pub spawn_rate: f64,
}

impl Stage {
    pub const fn new(duration_seconds: u64, target_users: u32, spawn_rate: f64) -> Self {
        Self {
            duration_seconds,
            target_users,
            spawn_rate,
        }
    }

    /// The stage threshold as a duration since run start
    pub fn ends_at(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn target(&self) -> StageTarget {
        StageTarget {
            users: self.target_users,
            spawn_rate: self.spawn_rate,
        }
    }
}

/// What the controller asks for on a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTarget {
    pub users: u32,
    pub spawn_rate: f64,
}

/// Validated, immutable staged profile.
///
/// `tick` is a pure query; it never sleeps and holds no state between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadShape {
    stages: Vec<Stage>,
}

impl LoadShape {
    /// Build a load shape, rejecting empty or unsorted stage lists.
    ///
    /// Stages are never re-sorted: list order is the source of truth, so a
    /// threshold that does not move forward makes every later stage either
    /// unreachable or out of order.
    pub fn new(stages: Vec<Stage>) -> Result<Self, ProfileError> {
        if stages.is_empty() {
            return Err(ProfileError::Empty);
        }

        for (index, stage) in stages.iter().enumerate() {
            if !stage.spawn_rate.is_finite() || stage.spawn_rate <= 0.0 {
                return Err(ProfileError::InvalidSpawnRate {
                    index,
                    spawn_rate: stage.spawn_rate,
                });
            }

            if index > 0 {
                let previous = stages[index - 1].duration_seconds;
                if stage.duration_seconds <= previous {
                    return Err(ProfileError::Unsorted {
                        index,
                        duration_seconds: stage.duration_seconds,
                        previous,
                    });
                }
            }
        }

        Ok(Self { stages })
    }

    /// Target for the given elapsed time, or `None` once the profile is exhausted
    pub fn tick(&self, elapsed: Duration) -> Option<StageTarget> {
        self.stage_at(elapsed).map(Stage::target)
    }

    /// The active stage at `elapsed`
    pub fn stage_at(&self, elapsed: Duration) -> Option<&Stage> {
        self.stages.iter().find(|stage| elapsed < stage.ends_at())
    }

    /// Run time after which `tick` returns `None`
    pub fn total_duration(&self) -> Duration {
        self.stages
            .last()
            .map(Stage::ends_at)
            .unwrap_or_default()
    }

    /// Highest concurrency any stage asks for
    pub fn peak_users(&self) -> u32 {
        self.stages
            .iter()
            .map(|stage| stage.target_users)
            .max()
            .unwrap_or(0)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

/// The ramp profile shipped with the hospital load test: climb to 100 users
/// over five minutes, hold for three, then drain over two.
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new(60, 20, 1.0),
        Stage::new(120, 40, 1.0),
        Stage::new(180, 60, 1.0),
        Stage::new(240, 80, 1.0),
        Stage::new(300, 100, 1.0),
        Stage::new(480, 100, 1.0),
        Stage::new(540, 50, 2.0),
        Stage::new(600, 0, 2.0),
    ]
}

//! Virtual user identity and lifecycle states

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one simulated client, unique within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

/// Virtual user lifecycle.
///
/// ```text
/// Idle -> Executing <-> Waiting
///   any -> Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    #[default]
    Idle,
    Waiting,
    Executing,
    Stopped,
}

impl UserState {
    pub fn can_transition_to(self, next: UserState) -> bool {
        use UserState::*;
        matches!(
            (self, next),
            (Idle, Executing)
                | (Executing, Waiting)
                | (Waiting, Executing)
                | (Idle, Stopped)
                | (Executing, Stopped)
                | (Waiting, Stopped)
        )
    }

    /// Move to `next`, rejecting transitions outside the lifecycle
    pub fn transition(self, next: UserState) -> Result<UserState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TriageError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(self) -> bool {
        self == UserState::Stopped
    }
}

impl fmt::Display for UserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserState::Idle => "idle",
            UserState::Waiting => "waiting",
            UserState::Executing => "executing",
            UserState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

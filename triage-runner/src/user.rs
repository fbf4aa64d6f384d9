//! Virtual user loop

use crate::catalog::TaskCatalog;
use crate::session::UserSession;
use crate::sink::{OutcomeSink, RunClock};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use triage_core::{OutcomeRecord, Result, UserId, UserState};
use triage_http::HttpClient;

/// Uniform wait between two tasks, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitRange {
    pub min: Duration,
    pub max: Duration,
}

impl WaitRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn fixed(wait: Duration) -> Self {
        Self::new(wait, wait)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        rng.random_range(self.min..=self.max)
    }
}

impl Default for WaitRange {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3))
    }
}

/// Shared pieces every user of a run is built from
#[derive(Clone)]
pub struct UserContext {
    pub catalog: Arc<TaskCatalog>,
    pub client: Arc<dyn HttpClient>,
    pub sink: OutcomeSink,
    pub clock: RunClock,
    pub wait: WaitRange,
}

/// How a user ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserExit {
    pub id: UserId,
    pub requests: u64,
    pub state: UserState,
}

/// One simulated client.
///
/// Runs `select task -> request -> record -> wait` until its stop token is
/// cancelled. A stop observed while waiting ends the user at once; a stop
/// that arrives mid-request lets the request finish and be recorded first.
pub struct VirtualUser {
    id: UserId,
    state: UserState,
    rng: StdRng,
    session: UserSession,
    context: UserContext,
    stop: CancellationToken,
}

impl VirtualUser {
    pub fn new(id: UserId, rng: StdRng, context: UserContext, stop: CancellationToken) -> Self {
        Self {
            id,
            state: UserState::Idle,
            rng,
            session: UserSession::default(),
            context,
            stop,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn state(&self) -> UserState {
        self.state
    }

    pub async fn run(mut self) -> Result<UserExit> {
        let mut requests = 0;

        if !self.stop.is_cancelled() {
            self.enter(UserState::Executing)?;
            loop {
                self.execute_one().await;
                requests += 1;

                if self.stop.is_cancelled() {
                    break;
                }

                self.enter(UserState::Waiting)?;
                let wait = self.context.wait.sample(&mut self.rng);
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = self.stop.cancelled() => break,
                }

                // Checked before every selection, not only during waits
                if self.stop.is_cancelled() {
                    break;
                }
                self.enter(UserState::Executing)?;
            }
        }

        self.enter(UserState::Stopped)?;
        Ok(UserExit {
            id: self.id,
            requests,
            state: self.state,
        })
    }

    async fn execute_one(&mut self) {
        let task = *self.context.catalog.pick(&mut self.rng);
        let started_at = self.context.clock.elapsed();
        let started = Instant::now();

        let attempt = task
            .execute(self.context.client.as_ref(), &mut self.session, &mut self.rng)
            .await;

        let record =
            OutcomeRecord::from_attempt(task.name, self.id, started_at, started.elapsed(), attempt);
        // A closed sink only happens during shutdown; the record has no reader left
        let _ = self.context.sink.report(record);
    }

    fn enter(&mut self, next: UserState) -> Result<()> {
        self.state = self.state.transition(next)?;
        Ok(())
    }
}

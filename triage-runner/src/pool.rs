//! Live virtual users and spawn-rate limited adjustment

use crate::error::RunnerResult;
use crate::user::{UserContext, UserExit, VirtualUser};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use triage_core::{StageTarget, UserId};

struct LiveUser {
    id: UserId,
    stop: CancellationToken,
    handle: JoinHandle<triage_core::Result<UserExit>>,
}

/// The set of running users.
///
/// `set_target` moves the live count toward the requested target by at most
/// `spawn_rate` users per second of run time. A ramp starts with one user of
/// allowance so it begins on the tick that requests it; fractional allowance
/// carries between ticks and is dropped once the target is reached. Users are
/// retired newest first.
pub struct UserPool {
    context: UserContext,
    master_rng: StdRng,
    shutdown: CancellationToken,
    live: Vec<LiveUser>,
    retired: Vec<JoinHandle<triage_core::Result<UserExit>>>,
    next_id: u64,
    allowance: f64,
    ramping: bool,
    last_adjusted: Option<Duration>,
    peak: usize,
}

impl UserPool {
    /// `master_rng` seeds one generator per spawned user
    pub fn new(context: UserContext, master_rng: StdRng) -> Self {
        Self {
            context,
            master_rng,
            shutdown: CancellationToken::new(),
            live: Vec::new(),
            retired: Vec::new(),
            next_id: 0,
            allowance: 0.0,
            ramping: false,
            last_adjusted: None,
            peak: 0,
        }
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Highest live count seen so far
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// IDs of live users, oldest first
    pub fn live_ids(&self) -> Vec<UserId> {
        self.live.iter().map(|u| u.id).collect()
    }

    /// Adjust toward `target` at run time `elapsed`. Returns the signed change.
    pub fn set_target(&mut self, target: StageTarget, elapsed: Duration) -> i64 {
        let since_last = elapsed.saturating_sub(self.last_adjusted.unwrap_or(elapsed));
        self.last_adjusted = Some(elapsed);
        self.retired.retain(|handle| !handle.is_finished());

        let live = self.live.len();
        let wanted = target.users as usize;
        if live == wanted {
            self.settle();
            return 0;
        }

        if self.ramping {
            self.allowance += target.spawn_rate * since_last.as_secs_f64();
        } else {
            self.ramping = true;
            self.allowance = 1.0;
        }

        let step = (self.allowance.floor() as usize).min(live.abs_diff(wanted));
        self.allowance -= step as f64;

        let change = if wanted > live {
            for _ in 0..step {
                self.spawn();
            }
            step as i64
        } else {
            for _ in 0..step {
                self.retire();
            }
            -(step as i64)
        };

        if self.live.len() == wanted {
            self.settle();
        }
        self.peak = self.peak.max(self.live.len());
        if change != 0 {
            debug!(
                live = self.live.len(),
                target = wanted,
                change,
                "Adjusted virtual users"
            );
        }
        change
    }

    /// Stop every user and wait for in-flight requests to finish
    pub async fn shutdown(mut self) -> RunnerResult<Vec<UserExit>> {
        self.shutdown.cancel();
        let handles = self
            .live
            .drain(..)
            .map(|u| u.handle)
            .chain(self.retired.drain(..));

        let mut exits = Vec::new();
        for joined in join_all(handles).await {
            exits.push(joined??);
        }
        exits.sort_by_key(|e| e.id);
        debug!(users = exits.len(), "All virtual users stopped");
        Ok(exits)
    }

    fn spawn(&mut self) {
        let id = UserId(self.next_id);
        self.next_id += 1;

        let rng = StdRng::seed_from_u64(self.master_rng.random());
        let stop = self.shutdown.child_token();
        let user = VirtualUser::new(id, rng, self.context.clone(), stop.clone());
        let handle = tokio::spawn(user.run());

        trace!(user = %id, "Spawned virtual user");
        self.live.push(LiveUser { id, stop, handle });
    }

    fn retire(&mut self) {
        if let Some(user) = self.live.pop() {
            trace!(user = %user.id, "Retiring virtual user");
            user.stop.cancel();
            self.retired.push(user.handle);
        }
    }

    fn settle(&mut self) {
        self.ramping = false;
        self.allowance = 0.0;
    }
}

// A run that is dropped or aborted before `shutdown` must not leave users running
impl Drop for UserPool {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TaskCatalog;
    use crate::sink::{outcome_channel, RunClock};
    use crate::user::WaitRange;
    use std::sync::Arc;
    use triage_core::UserState;
    use triage_http::{MockHttpClient, MockResponse};

    fn pool() -> UserPool {
        let (sink, _rx) = outcome_channel();
        let context = UserContext {
            catalog: Arc::new(TaskCatalog::hospital().unwrap()),
            client: Arc::new(MockHttpClient::new().with_fallback(MockResponse::ok(""))),
            sink,
            clock: RunClock::start(),
            wait: WaitRange::fixed(Duration::from_secs(1)),
        };
        UserPool::new(context, StdRng::seed_from_u64(9))
    }

    fn target(users: u32, spawn_rate: f64) -> StageTarget {
        StageTarget { users, spawn_rate }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_up_respects_spawn_rate() {
        let mut pool = pool();
        let mut live = Vec::new();
        for second in 0..6 {
            pool.set_target(target(4, 1.0), Duration::from_secs(second));
            live.push(pool.live());
        }
        assert_eq!(live, vec![1, 2, 3, 4, 4, 4]);
        assert_eq!(pool.peak(), 4);
        pool.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fractional_rates_carry_over() {
        let mut pool = pool();
        let mut live = Vec::new();
        for second in 0..5 {
            pool.set_target(target(10, 0.5), Duration::from_secs(second));
            live.push(pool.live());
        }
        assert_eq!(live, vec![1, 1, 2, 2, 3]);

        let mut pool2 = self::pool();
        pool2.set_target(target(10, 2.5), Duration::ZERO);
        pool2.set_target(target(10, 2.5), Duration::from_secs(1));
        pool2.set_target(target(10, 2.5), Duration::from_secs(2));
        // 1 + floor(2.5) + floor(0.5 + 2.5)
        assert_eq!(pool2.live(), 6);

        pool.shutdown().await.unwrap();
        pool2.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_down_retires_newest_first() {
        let mut pool = pool();
        pool.set_target(target(5, 100.0), Duration::ZERO);
        pool.set_target(target(5, 100.0), Duration::from_secs(1));
        assert_eq!(pool.live(), 5);

        let change = pool.set_target(target(2, 2.0), Duration::from_secs(2));
        assert_eq!(change, -1);
        let change = pool.set_target(target(2, 2.0), Duration::from_secs(3));
        assert_eq!(change, -2);
        assert_eq!(pool.live_ids(), vec![UserId(0), UserId(1)]);
        assert_eq!(pool.peak(), 5);

        let exits = pool.shutdown().await.unwrap();
        assert_eq!(exits.len(), 5);
        assert!(exits.iter().all(|e| e.state == UserState::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_pool_stops_its_users() {
        let mut pool = pool();
        pool.set_target(target(3, 100.0), Duration::ZERO);
        pool.set_target(target(3, 100.0), Duration::from_secs(1));
        let stops: Vec<CancellationToken> = pool.live.iter().map(|u| u.stop.clone()).collect();
        assert_eq!(stops.len(), 3);

        drop(pool);
        assert!(stops.iter().all(|stop| stop.is_cancelled()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_retirees_are_reaped() {
        let mut pool = pool();
        pool.set_target(target(4, 100.0), Duration::ZERO);
        pool.set_target(target(4, 100.0), Duration::from_secs(1));
        pool.set_target(target(0, 100.0), Duration::from_secs(2));
        pool.set_target(target(0, 100.0), Duration::from_secs(3));
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.retired.len(), 4);

        // Retired users exit once their wait is interrupted
        tokio::time::sleep(Duration::from_millis(10)).await;
        pool.set_target(target(0, 100.0), Duration::from_secs(4));
        assert!(pool.retired.is_empty());
        assert!(pool.shutdown().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_target_from_empty_pool() {
        let mut pool = pool();
        assert_eq!(pool.set_target(target(0, 1.0), Duration::ZERO), 0);
        assert_eq!(pool.live(), 0);
        assert!(pool.shutdown().await.unwrap().is_empty());
    }
}

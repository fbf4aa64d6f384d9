//! The run loop: poll the load shape, steer the pool, collect outcomes

use crate::catalog::TaskCatalog;
use crate::error::RunnerResult;
use crate::pool::UserPool;
use crate::sink::{outcome_channel, spawn_aggregator, RunClock};
use crate::user::{UserContext, WaitRange};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use triage_config::TriageConfig;
use triage_core::{
    LoadShape, Observers, RunInfo, RunObserver, RunReport, StageTarget, StatsCollector, StopReason,
};
use triage_http::HttpClient;

/// Knobs of a single run
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Display name of the system under test, reported to observers
    pub target: String,
    pub tick_interval: Duration,
    pub wait: WaitRange,
    pub seed: Option<u64>,
    pub max_run_time: Option<Duration>,
    pub failure_samples: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            target: "http://localhost:8888".to_string(),
            tick_interval: Duration::from_secs(1),
            wait: WaitRange::default(),
            seed: None,
            max_run_time: None,
            failure_samples: 10,
        }
    }
}

impl RunSettings {
    pub fn from_config(config: &TriageConfig) -> Self {
        Self {
            target: config.target.host.clone(),
            tick_interval: config.load.tick_interval,
            wait: WaitRange::new(config.user.min_wait, config.user.max_wait),
            seed: config.load.seed,
            max_run_time: config.load.max_run_time,
            failure_samples: config.reporting.failure_samples,
        }
    }
}

/// Drives one load test from start to report
pub struct Orchestrator {
    shape: LoadShape,
    catalog: Arc<TaskCatalog>,
    client: Arc<dyn HttpClient>,
    settings: RunSettings,
    observers: Observers,
}

impl Orchestrator {
    pub fn new(
        shape: LoadShape,
        catalog: TaskCatalog,
        client: Arc<dyn HttpClient>,
        settings: RunSettings,
    ) -> Self {
        Self {
            shape,
            catalog: Arc::new(catalog),
            client,
            settings,
            observers: Observers::new(),
        }
    }

    /// Validate the profile and task mix from configuration.
    ///
    /// Every misconfiguration surfaces here, before a user is spawned.
    pub fn from_config(config: &TriageConfig, client: Arc<dyn HttpClient>) -> RunnerResult<Self> {
        config.validate_all()?;
        let shape = config.load.shape()?;
        let catalog = TaskCatalog::hospital_with_weights(&config.user.task_weights)?;
        Ok(Self::new(
            shape,
            catalog,
            client,
            RunSettings::from_config(config),
        ))
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn shape(&self) -> &LoadShape {
        &self.shape
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    fn run_info(&self) -> RunInfo {
        RunInfo {
            target: self.settings.target.clone(),
            peak_users: self.shape.peak_users(),
            planned_duration: self.settings.max_run_time.map_or_else(
                || self.shape.total_duration(),
                |limit| limit.min(self.shape.total_duration()),
            ),
            stages: self.shape.stages().len(),
            tasks: self.catalog.names(),
            seed: self.settings.seed,
        }
    }

    /// Run until the shape signals the end, the run time limit passes, or
    /// `interrupt` is cancelled. In-flight requests always complete and are
    /// counted.
    pub async fn run(self, interrupt: CancellationToken) -> RunnerResult<RunReport> {
        let info = self.run_info();
        let clock = RunClock::start();
        let (sink, rx) = outcome_channel();
        let aggregator = spawn_aggregator(
            rx,
            StatsCollector::new(self.settings.failure_samples),
            self.observers.clone(),
        );

        let master_rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut pool = UserPool::new(
            UserContext {
                catalog: self.catalog.clone(),
                client: self.client.clone(),
                sink,
                clock,
                wait: self.settings.wait,
            },
            master_rng,
        );

        self.observers.on_start(&info);

        let mut ticker = tokio::time::interval(self.settings.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_target: Option<StageTarget> = None;

        let stop_reason = loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = interrupt.cancelled() => break StopReason::Interrupted,
            }

            let elapsed = clock.elapsed();
            if matches!(self.settings.max_run_time, Some(limit) if elapsed >= limit) {
                break StopReason::RunTimeLimit;
            }

            match self.shape.tick(elapsed) {
                Some(target) => {
                    if last_target != Some(target) {
                        self.observers.on_target_changed(elapsed, &target);
                        last_target = Some(target);
                    }
                    pool.set_target(target, elapsed);
                }
                None => break StopReason::ProfileComplete,
            }
        };

        debug!(%stop_reason, live = pool.live(), "Stopping virtual users");
        let peak_users = pool.peak();
        // Dropping the pool's context closes the last sink, which ends the aggregator
        pool.shutdown().await?;
        let stats = aggregator.await?;

        let mut report = stats.finish(clock.elapsed());
        report.peak_users = peak_users as u32;
        report.stop_reason = stop_reason;

        self.observers.on_stop(&report);
        Ok(report)
    }
}

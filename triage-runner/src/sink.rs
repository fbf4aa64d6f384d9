//! Outcome sink and the single-writer aggregator behind it

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use triage_core::{Observers, OutcomeRecord, RunObserver, StatsCollector};

/// Monotonic run clock. Started once by the orchestrator; users only read it.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    started: Instant,
}

impl RunClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Cloneable handle through which users append outcome records
#[derive(Debug, Clone)]
pub struct OutcomeSink {
    tx: mpsc::UnboundedSender<OutcomeRecord>,
}

impl OutcomeSink {
    /// Append one record. Returns false once the aggregator is gone.
    pub fn report(&self, record: OutcomeRecord) -> bool {
        self.tx.send(record).is_ok()
    }
}

/// Create a sink and the receiving end for the aggregator
pub fn outcome_channel() -> (OutcomeSink, mpsc::UnboundedReceiver<OutcomeRecord>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OutcomeSink { tx }, rx)
}

/// Drain records into `stats` until every sink is dropped.
///
/// Observers see each record synchronously, in arrival order.
pub fn spawn_aggregator(
    mut rx: mpsc::UnboundedReceiver<OutcomeRecord>,
    mut stats: StatsCollector,
    observers: Observers,
) -> JoinHandle<StatsCollector> {
    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            stats.record(&record);
            observers.on_request_completed(&record);
        }
        stats
    })
}

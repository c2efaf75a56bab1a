//! Periodic refresh of an aggregator on a background tokio task.
//!
//! The aggregator's constructor already ran the first cycle, so the first
//! tick fires one interval after `start`. Cycles run inside the task body,
//! one after the other, and ticks missed while a slow cycle runs are
//! skipped rather than replayed.
//!
//! Shutdown is cooperative: the aggregator is marked stopped, the task is
//! told to exit through a watch channel, and `shutdown` waits for any
//! in-flight cycle to finish before returning.

use crate::traits::Refreshable;
use crate::types::RefreshOutcome;
use crate::utils::time::format_duration;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct Scheduler;

impl Scheduler {
    /// Spawn the refresh loop for `target`. Dropping the returned handle also ends the loop.
    pub fn start(target: Arc<dyn Refreshable>, every: Duration) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(target.clone(), every, stop_rx));

        SchedulerHandle {
            target,
            stop_tx,
            task,
        }
    }
}

async fn run(target: Arc<dyn Refreshable>, every: Duration, mut stop: watch::Receiver<bool>) {
    let mut ticks = time::interval_at(Instant::now() + every, every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(aggregator = target.name(), every = %format_duration(every), "Refresh scheduler started");

    loop {
        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }

            _ = ticks.tick() => {
                if *stop.borrow() {
                    break;
                }

                match target.refresh().await {
                    RefreshOutcome::Published { count, failures } => {
                        debug!(aggregator = target.name(), count, failed = failures.len(), "Scheduled refresh published");
                    }
                    RefreshOutcome::Retained { failures } => {
                        warn!(aggregator = target.name(), failed = failures.len(), "Scheduled refresh kept the previous snapshot");
                    }
                    RefreshOutcome::Skipped => {
                        debug!(aggregator = target.name(), "Scheduled refresh skipped, another cycle is running");
                    }
                    RefreshOutcome::Stopped => break,
                }
            }
        }
    }

    info!(aggregator = target.name(), "Refresh scheduler stopped");
}

pub struct SchedulerHandle {
    target: Arc<dyn Refreshable>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop refreshing. Returns once the background task has exited; no cycle starts afterwards.
    pub async fn shutdown(self) {
        self.target.mark_stopped();
        let _ = self.stop_tx.send(true);

        if let Err(e) = self.task.await {
            warn!(aggregator = self.target.name(), error = %e, "Refresh scheduler task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

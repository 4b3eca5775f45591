//! Scheduler worker: executes raids once their time has come.

use std::sync::Arc;
use std::time::Duration;

use raid_core::DomainError;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::repository::RaidStore;
use crate::services::{Execution, RaidCoordinator};

/// What one scheduler pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub resolved: usize,
    pub skipped: usize,
    /// Left `scheduled`; retried on the next pass.
    pub failed: usize,
}

/// Executes every due raid once. Failures are logged and counted.
pub fn run_due_raids<S: RaidStore>(coordinator: &RaidCoordinator<S>) -> TickReport {
    let mut report = TickReport::default();

    let due = match coordinator.due_raids() {
        Ok(due) => due,
        Err(error) => {
            warn!(%error, "could not list due raids");
            return report;
        }
    };

    for raid in due {
        match coordinator.execute_raid(raid) {
            Ok(Execution::Resolved(_)) => report.resolved += 1,
            Ok(Execution::Skipped(status)) => {
                debug!(%raid, %status, "due raid no longer scheduled");
                report.skipped += 1;
            }
            Err(error) => {
                // Cooldowns, immunity and lost commits clear up on their own.
                if error.severity().is_recoverable() {
                    debug!(%raid, %error, code = error.error_code(), "due raid deferred");
                } else {
                    warn!(
                        %raid,
                        %error,
                        code = error.error_code(),
                        severity = error.severity().as_str(),
                        "due raid not executed"
                    );
                }
                report.failed += 1;
            }
        }
    }
    report
}

pub struct SchedulerWorker<S: RaidStore> {
    coordinator: Arc<RaidCoordinator<S>>,
    tick: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<S: RaidStore> SchedulerWorker<S> {
    pub fn new(
        coordinator: Arc<RaidCoordinator<S>>,
        tick: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            coordinator,
            tick,
            shutdown,
        }
    }

    /// Single pass over the due raids.
    pub fn run_once(&self) -> TickReport {
        run_due_raids(&self.coordinator)
    }

    pub async fn run(mut self) {
        info!(tick_ms = self.tick.as_millis() as u64, "SchedulerWorker started");

        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_once();
                    if report != TickReport::default() {
                        debug!(?report, "scheduler pass finished");
                    }
                }
                _ = self.shutdown.changed() => {
                    info!("Shutdown requested, stopping SchedulerWorker");
                    break;
                }
            }
        }
    }
}

//! Fixed-interval driver for synchronization runs
//!
//! The scheduler runs once immediately and then once per interval. Each run
//! executes on tokio's blocking pool and is awaited before the next tick is
//! considered, so two runs never overlap. A run that outlasts the interval
//! delays the following tick instead of queueing extra runs.
//!
//! Stopping is cooperative: the shutdown future is only polled between runs,
//! and an in-flight run always completes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::sync::Synchronizer;

/// Smallest accepted period; tokio intervals cannot be zero
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Drive `synchronizer` until `shutdown` resolves.
    ///
    /// Returns the number of runs that were started and awaited.
    pub async fn run_until<S, F>(&self, synchronizer: Arc<S>, shutdown: F) -> usize
    where
        S: Synchronizer + ?Sized + 'static,
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut shutdown = std::pin::pin!(shutdown);
        let mut runs = 0;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            runs += 1;
            let sync = Arc::clone(&synchronizer);
            match tokio::task::spawn_blocking(move || sync.run()).await {
                Ok(report) if report.success => {
                    tracing::info!(run = runs, actions = report.actions.len(), "Synchronization run succeeded");
                }
                Ok(report) => {
                    tracing::warn!(
                        run = runs,
                        error = report.error.as_deref().unwrap_or("unknown"),
                        "Synchronization run failed"
                    );
                }
                Err(e) => {
                    tracing::error!(run = runs, "Synchronization task aborted: {}", e);
                }
            }
        }

        tracing::info!(runs, "Scheduler stopped");
        runs
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_INTERVAL_SECS))
    }
}

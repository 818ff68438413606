//! Background timer thread for a retry job.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::dispatch::IncompletePublications;
use crate::lock::LockManager;

use super::job::{RetryJob, TickOutcome};

/// Statistics from a retry job thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JobStats {
    pub ticks: usize,
    /// Ticks that held the lock and ran a pass.
    pub ticks_locked: usize,
    /// Ticks denied the lock.
    pub ticks_skipped: usize,
    pub ticks_failed: usize,
    pub resubmitted: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobStats {
    fn observe(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::Skipped => self.ticks_skipped += 1,
            TickOutcome::Ran(stats) => {
                self.ticks_locked += 1;
                self.resubmitted += stats.resubmitted;
                self.completed += stats.completed;
                self.failed += stats.failed;
            }
            TickOutcome::Failed(_) => self.ticks_failed += 1,
        }
    }
}

/// A thread that ticks one `RetryJob` with a fixed delay between ticks.
///
/// The delay is measured from the end of one tick to the start of the
/// next. Stop requests are observed between ticks; a pass in progress
/// always finishes.
pub struct RetryJobThread {
    name: String,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<JobStats>>,
}

impl RetryJobThread {
    pub fn spawn<P, L>(
        job: RetryJob<P, L>,
        tick_interval: Duration,
        initial_delay: Duration,
    ) -> Self
    where
        P: IncompletePublications + 'static,
        L: LockManager + 'static,
    {
        let (stop_tx, stop_rx) = channel();
        let name = job.name().to_string();

        let handle = thread::spawn(move || {
            let mut stats = JobStats::default();

            if stop_requested(&stop_rx, initial_delay) {
                return stats;
            }

            loop {
                let outcome = job.tick();
                stats.observe(&outcome);

                if stop_requested(&stop_rx, tick_interval) {
                    break;
                }
            }

            debug!(job = %job.name(), ticks = stats.ticks, "retry job stopped");
            stats
        });

        Self {
            name,
            stop_tx,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal the job to stop and wait for it to finish.
    /// Returns the job statistics.
    pub fn stop(mut self) -> JobStats {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap_or_default()
        } else {
            JobStats::default()
        }
    }

    /// Signal the job to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for RetryJobThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

// Wait up to `delay`; true if a stop was requested (or the handle is gone).
fn stop_requested(stop_rx: &Receiver<()>, delay: Duration) -> bool {
    match stop_rx.recv_timeout(delay) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        Err(RecvTimeoutError::Timeout) => false,
    }
}

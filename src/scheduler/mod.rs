//! Scheduler - periodic, lock-guarded resubmission of stale publications.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use post_relay::{InMemoryLockManager, RelayConfig, RetryJob, RetryScheduler};
//!
//! let config = RelayConfig::from_env()?;
//! let locks = Arc::new(InMemoryLockManager::new());
//!
//! let mut scheduler = RetryScheduler::new();
//! for name in ["job1", "job2"] {
//!     let job = RetryJob::new(name, "node-a", service.clone(), locks.clone(), &config);
//!     scheduler.start(job, &config);
//! }
//!
//! // ... on teardown
//! for (job, stats) in scheduler.stop() {
//!     println!("{}: {} passes", job, stats.ticks_locked);
//! }
//! ```

mod job;
mod thread;

pub use job::{RetryJob, TickOutcome};
pub use thread::{JobStats, RetryJobThread};

use std::time::Duration;

use crate::config::RelayConfig;
use crate::dispatch::IncompletePublications;
use crate::lock::LockManager;

/// Owns the timer threads of a process instance's retry jobs.
#[derive(Default)]
pub struct RetryScheduler {
    threads: Vec<RetryJobThread>,
}

impl RetryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `job` with the tick interval and initial delay from `config`.
    pub fn start<P, L>(&mut self, job: RetryJob<P, L>, config: &RelayConfig) -> &mut Self
    where
        P: IncompletePublications + 'static,
        L: LockManager + 'static,
    {
        self.start_with(job, config.tick_interval, config.initial_delay)
    }

    pub fn start_with<P, L>(
        &mut self,
        job: RetryJob<P, L>,
        tick_interval: Duration,
        initial_delay: Duration,
    ) -> &mut Self
    where
        P: IncompletePublications + 'static,
        L: LockManager + 'static,
    {
        self.threads
            .push(RetryJobThread::spawn(job, tick_interval, initial_delay));
        self
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Stop every job and collect its statistics, keyed by job name.
    pub fn stop(self) -> Vec<(String, JobStats)> {
        for thread in &self.threads {
            thread.signal_stop();
        }
        self.threads
            .into_iter()
            .map(|thread| {
                let name = thread.name().to_string();
                (name, thread.stop())
            })
            .collect()
    }
}

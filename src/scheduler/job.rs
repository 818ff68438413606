use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::dispatch::{IncompletePublications, ResubmitStats};
use crate::lock::{LockManager, Release};

/// What one tick of a retry job did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another holder has the lock; nothing was dispatched.
    Skipped,
    /// The lock was held and a retry pass ran.
    Ran(ResubmitStats),
    /// The lock or the retry pass failed.
    Failed(String),
}

/// One retry job: `IDLE -> (lock acquired?) -> RUNNING -> IDLE` per tick.
///
/// Jobs that share a lock name exclude each other cluster-wide. The holder
/// identity is `<instance>/<job>`, so two jobs of the same instance also
/// exclude each other.
pub struct RetryJob<P, L> {
    name: String,
    holder: String,
    lock_name: String,
    staleness_threshold: Duration,
    min_hold: Duration,
    max_hold: Duration,
    publications: P,
    locks: L,
}

impl<P, L> RetryJob<P, L>
where
    P: IncompletePublications,
    L: LockManager,
{
    pub fn new(
        name: impl Into<String>,
        instance_id: &str,
        publications: P,
        locks: L,
        config: &RelayConfig,
    ) -> Self {
        let name = name.into();
        Self {
            holder: format!("{}/{}", instance_id, name),
            name,
            lock_name: config.lock_name.clone(),
            staleness_threshold: config.staleness_threshold,
            min_hold: config.min_hold,
            max_hold: config.max_hold,
            publications,
            locks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn lock_name(&self) -> &str {
        &self.lock_name
    }

    /// Run one tick. Never blocks waiting for the lock.
    ///
    /// A pass that outlives `max_hold` is not interrupted; the late
    /// release then comes back `Stale` and is logged.
    pub fn tick(&self) -> TickOutcome {
        let lease = match self.locks.try_acquire(
            &self.lock_name,
            &self.holder,
            self.min_hold,
            self.max_hold,
        ) {
            Ok(Some(lease)) => lease,
            Ok(None) => {
                debug!(
                    job = %self.name,
                    lock = %self.lock_name,
                    "lock held elsewhere, skipping tick"
                );
                return TickOutcome::Skipped;
            }
            Err(err) => {
                error!(
                    job = %self.name,
                    lock = %self.lock_name,
                    error = %err,
                    "lock acquisition failed"
                );
                return TickOutcome::Failed(err.to_string());
            }
        };

        info!(job = %self.name, holder = %self.holder, "running retry pass");
        let outcome = match self
            .publications
            .resubmit_incomplete_publications_older_than(self.staleness_threshold)
        {
            Ok(stats) => {
                info!(
                    job = %self.name,
                    resubmitted = stats.resubmitted,
                    completed = stats.completed,
                    failed = stats.failed,
                    skipped = stats.skipped,
                    "retry pass finished"
                );
                TickOutcome::Ran(stats)
            }
            Err(err) => {
                error!(job = %self.name, error = %err, "retry pass failed");
                TickOutcome::Failed(err.to_string())
            }
        };

        match self.locks.release(&lease) {
            Ok(Release::Stale) => {
                warn!(job = %self.name, lock = %self.lock_name, "lease expired before release")
            }
            Ok(_) => {}
            Err(err) => {
                warn!(job = %self.name, lock = %self.lock_name, error = %err, "lock release failed")
            }
        }

        outcome
    }
}

use std::sync::Arc;
use std::time::Duration;

use super::{Lease, LockError, Release};

/// Lease-based mutual exclusion shared by every process instance.
///
/// Implementations need a single source of truth with an atomic
/// conditional write keyed by lock name: an in-process mutex for the
/// in-memory manager, or a compare-and-swap row / serializable
/// transaction for a shared database.
pub trait LockManager: Send + Sync {
    /// Try to take `name` for `holder` without blocking.
    ///
    /// Succeeds only if no live lease exists for `name` (live means
    /// `expires_at > now`), including a lease of the same holder that is
    /// still inside its min hold. On success the lease runs until
    /// `now + max_hold`. Returns `Ok(None)` when denied.
    fn try_acquire(
        &self,
        name: &str,
        holder: &str,
        min_hold: Duration,
        max_hold: Duration,
    ) -> Result<Option<Lease>, LockError>;

    /// Give the lease back.
    ///
    /// Takes effect immediately only once `min_hold` has elapsed since
    /// acquisition; earlier calls shorten the lease to end exactly at the
    /// min hold instead.
    fn release(&self, lease: &Lease) -> Result<Release, LockError>;

    /// The live lease for `name`, if any.
    fn current(&self, name: &str) -> Result<Option<Lease>, LockError>;
}

impl<T: LockManager + ?Sized> LockManager for Arc<T> {
    fn try_acquire(
        &self,
        name: &str,
        holder: &str,
        min_hold: Duration,
        max_hold: Duration,
    ) -> Result<Option<Lease>, LockError> {
        (**self).try_acquire(name, holder, min_hold, max_hold)
    }

    fn release(&self, lease: &Lease) -> Result<Release, LockError> {
        (**self).release(lease)
    }

    fn current(&self, name: &str) -> Result<Option<Lease>, LockError> {
        (**self).current(name)
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

use super::{Lease, LockError, LockManager, Release};

/// In-memory lease table: one row per lock name behind a single `Mutex`.
///
/// The mutex makes every acquire/release a compare-and-swap on the row.
/// Share one manager (via `Arc`) between all schedulers that should
/// exclude each other; a cluster in tests is simulated this way.
pub struct InMemoryLockManager {
    rows: Mutex<HashMap<String, Lease>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        InMemoryLockManager {
            rows: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for InMemoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LockManager for InMemoryLockManager {
    fn try_acquire(
        &self,
        name: &str,
        holder: &str,
        min_hold: Duration,
        max_hold: Duration,
    ) -> Result<Option<Lease>, LockError> {
        if min_hold > max_hold {
            return Err(LockError::InvalidHold {
                min: min_hold,
                max: max_hold,
            });
        }

        let mut rows = self
            .rows
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        let now = self.clock.now();

        let expires_at = now
            .checked_add(max_hold)
            .ok_or(LockError::HoldOverflow { max: max_hold })?;

        if let Some(existing) = rows.get(name) {
            if existing.is_live_at(now) {
                return Ok(None);
            }
        }

        let lease = Lease {
            name: name.to_string(),
            holder: holder.to_string(),
            acquired_at: now,
            expires_at,
            min_hold,
        };
        rows.insert(name.to_string(), lease.clone());
        Ok(Some(lease))
    }

    fn release(&self, lease: &Lease) -> Result<Release, LockError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        let now = self.clock.now();

        let row = match rows.get_mut(&lease.name) {
            Some(row)
                if row.holder == lease.holder
                    && row.acquired_at == lease.acquired_at
                    && row.is_live_at(now) =>
            {
                row
            }
            _ => return Ok(Release::Stale),
        };

        let releasable_at = row.releasable_at();
        if now >= releasable_at {
            row.expires_at = now;
            Ok(Release::Released)
        } else {
            row.expires_at = releasable_at;
            Ok(Release::Deferred {
                until: releasable_at,
            })
        }
    }

    fn current(&self, name: &str) -> Result<Option<Lease>, LockError> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        let now = self.clock.now();
        Ok(rows.get(name).filter(|lease| lease.is_live_at(now)).cloned())
    }
}

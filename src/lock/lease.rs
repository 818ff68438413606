use std::time::{Duration, SystemTime};

/// A time-bounded claim on a named lock.
///
/// The lease expires on its own at `expires_at`; a crashed holder never
/// blocks the lock for longer than its max hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lease {
    pub name: String,
    pub holder: String,
    pub acquired_at: SystemTime,
    pub expires_at: SystemTime,
    pub min_hold: Duration,
}

impl Lease {
    pub fn is_live_at(&self, now: SystemTime) -> bool {
        self.expires_at > now
    }

    /// Earliest instant at which a release takes effect. Never later than
    /// `expires_at`.
    pub fn releasable_at(&self) -> SystemTime {
        self.acquired_at
            .checked_add(self.min_hold)
            .map_or(self.expires_at, |at| at.min(self.expires_at))
    }
}

/// What a release call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// The lock is free as of now.
    Released,
    /// Released before `min_hold` elapsed; the lease now ends at `until`.
    Deferred { until: SystemTime },
    /// The lease no longer matches the stored one (expired and taken over,
    /// or already released). Nothing changed.
    Stale,
}

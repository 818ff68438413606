use std::time::Duration;

use crate::error::PersistenceError;

use super::event::OutboundEvent;
use super::record::{PublicationId, PublicationRecord};

/// Durable log of publication attempts.
///
/// Only the store writes `PublicationRecord`s. `completed_at` is set at
/// most once and never cleared.
pub trait EventStore: Send + Sync {
    /// Persist a new pending record of `event` for `handler_id`.
    ///
    /// Aggregate-producing code should prefer its repository's atomic
    /// commit, which records publications in the same unit of work as the
    /// aggregate write.
    fn record(
        &self,
        event: &OutboundEvent,
        handler_id: &str,
    ) -> Result<PublicationRecord, PersistenceError>;

    /// Mark a record completed.
    ///
    /// Idempotent: returns `Ok(true)` only for the call that actually
    /// completed the record, `Ok(false)` if it was already complete.
    fn mark_complete(&self, id: PublicationId) -> Result<bool, PersistenceError>;

    /// Note a failed delivery attempt. Leaves the record pending.
    fn record_failure(&self, id: PublicationId, cause: &str) -> Result<(), PersistenceError>;

    /// Pending records at least `age` old, oldest first.
    fn find_incomplete_older_than(
        &self,
        age: Duration,
    ) -> Result<Vec<PublicationRecord>, PersistenceError>;

    fn get(&self, id: PublicationId) -> Result<Option<PublicationRecord>, PersistenceError>;

    /// Every record, in creation order.
    fn all(&self) -> Result<Vec<PublicationRecord>, PersistenceError>;

    fn pending_count(&self) -> Result<usize, PersistenceError> {
        Ok(self.all()?.iter().filter(|r| r.is_pending()).count())
    }
}

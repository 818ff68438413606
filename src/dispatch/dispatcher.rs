use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::outbox::{EventStore, PublicationRecord};

use super::error::{DispatchError, HandlerError};
use super::outcome::{Outcome, ResubmitStats};
use super::registry::HandlerRegistry;

/// Invokes registered handlers for publication records and completes the
/// records whose handler succeeded.
///
/// Dispatch always happens after the producing unit of work committed, so
/// a failing handler can only leave its record pending; it never undoes
/// the aggregate change.
pub struct Dispatcher<C, S> {
    registry: HandlerRegistry<C>,
    store: Arc<S>,
}

impl<C, S: EventStore> Dispatcher<C, S> {
    pub fn new(registry: HandlerRegistry<C>, store: Arc<S>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &HandlerRegistry<C> {
        &self.registry
    }

    /// Deliver one record to its target handler.
    ///
    /// Returns `Err` only for dispatch defects (no handler registered) or
    /// storage failures. Handler failures come back as `Ok(Outcome::Failure)`.
    /// A record that is already complete is not redelivered and reports
    /// `Outcome::Success`.
    pub fn dispatch(&self, ctx: &C, record: &PublicationRecord) -> Result<Outcome, DispatchError> {
        Ok(self.deliver(ctx, record)?.unwrap_or(Outcome::Success))
    }

    // `None` when the record was completed before this call reached it.
    fn deliver(
        &self,
        ctx: &C,
        record: &PublicationRecord,
    ) -> Result<Option<Outcome>, DispatchError> {
        if let Some(current) = self.store.get(record.id)? {
            if current.is_complete() {
                debug!(record_id = record.id, "publication already completed");
                return Ok(None);
            }
        }

        let handler = match self
            .registry
            .resolve(&record.event_type, &record.target_handler)
        {
            Ok(handler) => handler,
            Err(err) => {
                error!(
                    record_id = record.id,
                    event_type = %record.event_type,
                    handler = %record.target_handler,
                    "no handler registered for publication"
                );
                self.note_failure(record, &err.to_string());
                return Err(err);
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(ctx, record)))
            .unwrap_or_else(|payload| {
                Outcome::Failure(HandlerError::Panicked(panic_message(payload)))
            });

        match &outcome {
            Outcome::Success => {
                if self.store.mark_complete(record.id)? {
                    debug!(
                        record_id = record.id,
                        event_type = %record.event_type,
                        handler = %record.target_handler,
                        "publication completed"
                    );
                }
            }
            Outcome::Failure(cause) => {
                warn!(
                    record_id = record.id,
                    event_type = %record.event_type,
                    handler = %record.target_handler,
                    error = %cause,
                    "handler failed, publication left pending"
                );
                self.note_failure(record, &cause.to_string());
            }
        }

        Ok(Some(outcome))
    }

    fn note_failure(&self, record: &PublicationRecord, cause: &str) {
        if let Err(err) = self.store.record_failure(record.id, cause) {
            error!(record_id = record.id, error = %err, "failed to note delivery failure");
        }
    }

    /// Dispatch each record independently; a failure on one never skips
    /// the rest. Errors are logged and counted, not returned.
    pub fn dispatch_all(&self, ctx: &C, records: &[PublicationRecord]) -> ResubmitStats {
        let mut stats = ResubmitStats::default();

        for record in records {
            stats.resubmitted += 1;
            match self.deliver(ctx, record) {
                Ok(Some(Outcome::Success)) => stats.completed += 1,
                Ok(Some(Outcome::Failure(_))) => stats.failed += 1,
                Ok(None) => stats.skipped += 1,
                Err(err) => {
                    error!(record_id = record.id, error = %err, "dispatch failed");
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    /// Re-drive every pending record at least `age` old, oldest first.
    pub fn resubmit_incomplete_older_than(
        &self,
        ctx: &C,
        age: Duration,
    ) -> Result<ResubmitStats, DispatchError> {
        let records = self.store.find_incomplete_older_than(age)?;
        Ok(self.dispatch_all(ctx, &records))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Administrative entry point for re-driving stale pending publications.
///
/// The retry job calls this while holding its lock; operators may call it
/// directly as well.
pub trait IncompletePublications: Send + Sync {
    fn resubmit_incomplete_publications_older_than(
        &self,
        age: Duration,
    ) -> Result<ResubmitStats, DispatchError>;
}

impl<T: IncompletePublications + ?Sized> IncompletePublications for Arc<T> {
    fn resubmit_incomplete_publications_older_than(
        &self,
        age: Duration,
    ) -> Result<ResubmitStats, DispatchError> {
        (**self).resubmit_incomplete_publications_older_than(age)
    }
}

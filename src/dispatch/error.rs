//! Error types for handler dispatch.

use thiserror::Error;

use crate::error::PersistenceError;

/// Cause carried by a failed handler invocation.
///
/// A handler failure is transient: the record stays pending and the
/// retry job resubmits it later.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload could not be decoded into the handler's event type.
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    /// Injected failure from a `FailurePolicy`.
    #[error("simulated failure ({0})")]
    Simulated(String),
    /// Domain logic rejected the event.
    #[error("rejected: {0}")]
    Rejected(String),
    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<bitcode::Error> for HandlerError {
    fn from(err: bitcode::Error) -> Self {
        HandlerError::DecodeFailed(err.to_string())
    }
}

/// Errors from dispatching a record, as opposed to handler failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler registered for the record's `(event_type, handler)` pair.
    /// This is a wiring defect and is never retried into success.
    #[error("no handler registered for event {event_type:?} and handler {handler_id:?}")]
    NoHandlerRegistered {
        event_type: String,
        handler_id: String,
    },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

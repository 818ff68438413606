//! Dispatch - handler registration and delivery of publication records.
//!
//! Handlers are registered once at startup in a `HandlerRegistry`, keyed
//! by `(event_type, handler_id)`. The `Dispatcher` resolves a record's
//! handler, runs it, and completes the record on `Outcome::Success`.
//! On `Outcome::Failure` the record stays pending for the retry job.

mod dispatcher;
mod error;
mod outcome;
mod registry;

pub use dispatcher::{Dispatcher, IncompletePublications};
pub use error::{DispatchError, HandlerError};
pub use outcome::{Outcome, ResubmitStats};
pub use registry::{Handler, HandlerRegistry};

use super::error::HandlerError;

/// Result of invoking a handler for one record.
#[derive(Debug)]
pub enum Outcome {
    Success,
    Failure(HandlerError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl<E: Into<HandlerError>> From<Result<(), E>> for Outcome {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(err) => Outcome::Failure(err.into()),
        }
    }
}

/// Counts from one resubmission or immediate-delivery pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResubmitStats {
    /// Records handed to the dispatcher.
    pub resubmitted: usize,
    /// Records whose handler succeeded.
    pub completed: usize,
    /// Records left pending (handler failure or dispatch error).
    pub failed: usize,
    /// Records already completed by another delivery; not redelivered.
    pub skipped: usize,
}

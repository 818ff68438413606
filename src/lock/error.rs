use std::time::Duration;

use thiserror::Error;

/// Error type for lock operations.
///
/// A denied acquisition is not an error; `try_acquire` returns `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The lock table's guard was poisoned (a thread panicked while holding it).
    #[error("lock table poisoned: {0}")]
    Poisoned(String),
    #[error("min hold {min:?} exceeds max hold {max:?}")]
    InvalidHold { min: Duration, max: Duration },
    /// `now + max_hold` is not representable.
    #[error("max hold {max:?} overflows the clock")]
    HoldOverflow { max: Duration },
}

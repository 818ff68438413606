use thiserror::Error;

/// Failure of the storage layer shared by posts and the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("concurrent write detected for post {id} (expected version {expected}, got {actual})")]
    ConcurrentWrite { id: u64, expected: u64, actual: u64 },
    #[error("write rejected: {0}")]
    WriteRejected(String),
    #[error("failed to encode event payload: {0}")]
    Encode(String),
    #[error("unknown publication record {0}")]
    UnknownRecord(u64),
}

impl From<bitcode::Error> for PersistenceError {
    fn from(err: bitcode::Error) -> Self {
        PersistenceError::Encode(err.to_string())
    }
}

mod clock;
mod config;
mod dispatch;
mod error;
mod failure;
mod hashmap;
mod lock;
mod outbox;
mod post;
mod scheduler;

pub mod listeners;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, RelayConfig};
pub use dispatch::{
    DispatchError, Dispatcher, Handler, HandlerError, HandlerRegistry, IncompletePublications,
    Outcome, ResubmitStats,
};
pub use error::PersistenceError;
pub use failure::FailurePolicy;
pub use hashmap::HashMapStore;
pub use listeners::{ArchiveLog, ListenerFailures};
pub use lock::{InMemoryLockManager, Lease, LockError, LockManager, Release};
pub use outbox::{Event, EventStore, OutboundEvent, PublicationId, PublicationRecord};
pub use post::{
    NewPost, PendingPublication, Post, PostArchived, PostCreated, PostError, PostId,
    PostPublished, PostRepository, PostService, PostStatus, PostStore, POST_EVENT_TYPES,
};
pub use scheduler::{JobStats, RetryJob, RetryJobThread, RetryScheduler, TickOutcome};

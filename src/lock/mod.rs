//! Lock - lease-based mutual exclusion for scheduled jobs.
//!
//! `LockManager` is the seam; `InMemoryLockManager` is the bundled
//! backend. Leases expire on their own, so liveness never depends on the
//! holder releasing.

mod error;
mod in_memory;
mod lease;
mod lock_manager;

pub use error::LockError;
pub use in_memory::InMemoryLockManager;
pub use lease::{Lease, Release};
pub use lock_manager::LockManager;

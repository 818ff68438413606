//! Reliable delivery integration tests.
//!
//! - Post lifecycle with atomic outbox recording and immediate delivery
//! - Lock-guarded retry passes re-driving pending publications
//! - Several scheduler instances sharing one lease lock

mod cluster;
mod retry;
mod support;

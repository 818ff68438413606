//! Listeners - the independent modules that react to post events.
//!
//! - `publisher`: `PostCreated` -> publish the post
//! - `archiver`: `PostPublished` -> archive the post, `PostArchived` -> archive log
//!
//! Each listener takes its own `FailurePolicy` so the retry path can be
//! exercised per module.

pub mod archiver;
pub mod publisher;

pub use archiver::ArchiveLog;

use crate::dispatch::HandlerRegistry;
use crate::failure::FailurePolicy;
use crate::post::{PostService, PostStore};

/// Failure injection per listener module.
#[derive(Clone, Debug, Default)]
pub struct ListenerFailures {
    pub publisher: FailurePolicy,
    pub archiver: FailurePolicy,
}

impl ListenerFailures {
    /// The same policy for every module.
    pub fn uniform(policy: FailurePolicy) -> Self {
        Self {
            publisher: policy.clone(),
            archiver: policy,
        }
    }
}

/// Registry with every listener module wired in.
pub fn registry<S: PostStore + 'static>(
    failures: ListenerFailures,
    log: ArchiveLog,
) -> HandlerRegistry<PostService<S>> {
    let registry = publisher::register(HandlerRegistry::new(), failures.publisher);
    archiver::register(registry, failures.archiver, log)
}

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::dispatch::{HandlerError, HandlerRegistry};
use crate::failure::FailurePolicy;
use crate::post::{
    PostArchived, PostError, PostId, PostPublished, PostService, PostStatus, PostStore,
};

pub const HANDLER_ID: &str = "archiver.on_post_published";
pub const LOG_HANDLER_ID: &str = "archiver.on_post_archived";

/// Ids of archived posts, in the order their archive events arrived.
///
/// Redelivered events are ignored, so each id appears once.
#[derive(Clone, Default)]
pub struct ArchiveLog {
    entries: Arc<Mutex<Vec<PostId>>>,
}

impl ArchiveLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&self, id: PostId) -> Result<bool, HandlerError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| HandlerError::Rejected("archive log poisoned".to_string()))?;
        if entries.contains(&id) {
            return Ok(false);
        }
        entries.push(id);
        Ok(true)
    }

    pub fn entries(&self) -> Vec<PostId> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

/// Archive every published post, and log every archived one.
pub fn register<S: PostStore + 'static>(
    registry: HandlerRegistry<PostService<S>>,
    failures: FailurePolicy,
    log: ArchiveLog,
) -> HandlerRegistry<PostService<S>> {
    registry
        .on_event::<PostPublished, _>(HANDLER_ID, move |service, event| {
            on_post_published(service, &failures, event).into()
        })
        .on_event::<PostArchived, _>(LOG_HANDLER_ID, move |_, event| {
            on_post_archived(&log, event).into()
        })
}

fn on_post_published<S: PostStore + 'static>(
    service: &PostService<S>,
    failures: &FailurePolicy,
    event: PostPublished,
) -> Result<(), HandlerError> {
    if failures.should_fail() {
        return Err(HandlerError::Simulated(failures.describe()));
    }
    info!(post_id = event.id, "PostPublished event");

    match service.archive(event.id) {
        Ok(_) => Ok(()),
        Err(PostError::InvalidTransition {
            from: PostStatus::Archived,
            ..
        }) => {
            debug!(post_id = event.id, "post already archived");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn on_post_archived(log: &ArchiveLog, event: PostArchived) -> Result<(), HandlerError> {
    if log.append(event.id)? {
        info!(post_id = event.id, "post archived");
    }
    Ok(())
}

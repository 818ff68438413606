use tracing::{debug, info};

use crate::dispatch::{HandlerError, HandlerRegistry};
use crate::failure::FailurePolicy;
use crate::post::{PostCreated, PostError, PostService, PostStatus, PostStore};

pub const HANDLER_ID: &str = "publisher.on_post_created";

/// Publish every created post.
pub fn register<S: PostStore + 'static>(
    registry: HandlerRegistry<PostService<S>>,
    failures: FailurePolicy,
) -> HandlerRegistry<PostService<S>> {
    registry.on_event::<PostCreated, _>(HANDLER_ID, move |service, event| {
        on_post_created(service, &failures, event).into()
    })
}

fn on_post_created<S: PostStore + 'static>(
    service: &PostService<S>,
    failures: &FailurePolicy,
    event: PostCreated,
) -> Result<(), HandlerError> {
    if failures.should_fail() {
        return Err(HandlerError::Simulated(failures.describe()));
    }
    info!(post_id = event.id, "PostCreated event");

    match service.publish(event.id) {
        Ok(_) => Ok(()),
        // redelivery after an earlier success
        Err(PostError::InvalidTransition { from, .. }) if from > PostStatus::Created => {
            debug!(post_id = event.id, status = %from, "post already published");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}


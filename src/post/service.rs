use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::dispatch::{
    DispatchError, Dispatcher, HandlerRegistry, IncompletePublications, ResubmitStats,
};
use crate::outbox::{Event, OutboundEvent, PublicationRecord};

use super::error::PostError;
use super::events::POST_EVENT_TYPES;
use super::post::{NewPost, Post, PostId};
use super::repository::{PendingPublication, PostStore};

/// Entry point for post lifecycle operations.
///
/// Every transition persists the post together with one publication
/// record per registered handler of the emitted event, then immediately
/// tries to deliver those records. Delivery failures are never returned
/// to the caller; the records stay pending for the retry job.
pub struct PostService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    dispatcher: Dispatcher<PostService<S>, S>,
}

impl<S: PostStore + 'static> PostService<S> {
    /// Build the service on the system clock.
    ///
    /// Fails with `NoHandlerRegistered` unless every post event type has a
    /// handler in `registry`.
    pub fn new(store: Arc<S>, registry: HandlerRegistry<Self>) -> Result<Self, PostError> {
        Self::with_clock(store, registry, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<S>,
        registry: HandlerRegistry<Self>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PostError> {
        registry.ensure_handles(&POST_EVENT_TYPES)?;
        Ok(Self {
            dispatcher: Dispatcher::new(registry, store.clone()),
            store,
            clock,
        })
    }

    pub fn get(&self, id: PostId) -> Result<Post, PostError> {
        self.store.find_post(id)?.ok_or(PostError::NotFound(id))
    }

    /// Create a post. Returns the post as committed by this call.
    pub fn create(&self, draft: NewPost) -> Result<Post, PostError> {
        let id = self.store.next_post_id();
        let (post, event) = Post::create(id, draft, self.clock.now());
        let records = self.commit(&post, &event)?;
        info!(post_id = id, title = %post.title, "post created");
        self.deliver(&records);
        Ok(post)
    }

    pub fn publish(&self, id: PostId) -> Result<Post, PostError> {
        let mut post = self.get(id)?;
        let event = post.publish(self.clock.now())?;
        let records = self.commit(&post, &event)?;
        info!(post_id = id, "post published");
        self.deliver(&records);
        Ok(post)
    }

    pub fn archive(&self, id: PostId) -> Result<Post, PostError> {
        let mut post = self.get(id)?;
        let event = post.archive(self.clock.now())?;
        let records = self.commit(&post, &event)?;
        info!(post_id = id, "post archived");
        self.deliver(&records);
        Ok(post)
    }

    fn commit<E: Event>(
        &self,
        post: &Post,
        event: &E,
    ) -> Result<Vec<PublicationRecord>, PostError> {
        let handlers = self.dispatcher.registry().handlers_for(E::EVENT_TYPE);
        if handlers.is_empty() {
            return Err(DispatchError::NoHandlerRegistered {
                event_type: E::EVENT_TYPE.to_string(),
                handler_id: "*".to_string(),
            }
            .into());
        }

        let outbound = OutboundEvent::encode(event)?;
        let publications: Vec<PendingPublication> = handlers
            .iter()
            .map(|handler_id| PendingPublication {
                event: outbound.clone(),
                handler_id: handler_id.clone(),
            })
            .collect();

        Ok(self.store.commit(post, &publications)?)
    }

    // Runs after the unit of work committed; outcomes are logged by the
    // dispatcher and deliberately dropped here.
    fn deliver(&self, records: &[PublicationRecord]) {
        let stats = self.dispatcher.dispatch_all(self, records);
        debug!(
            completed = stats.completed,
            failed = stats.failed,
            "immediate delivery finished"
        );
    }
}

impl<S: PostStore + 'static> IncompletePublications for PostService<S> {
    fn resubmit_incomplete_publications_older_than(
        &self,
        age: Duration,
    ) -> Result<ResubmitStats, DispatchError> {
        self.dispatcher.resubmit_incomplete_older_than(self, age)
    }
}

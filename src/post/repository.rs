use crate::error::PersistenceError;
use crate::outbox::{EventStore, OutboundEvent, PublicationRecord};

use super::post::{Post, PostId};

/// A publication to record in the same unit of work as a post write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPublication {
    pub event: OutboundEvent,
    pub handler_id: String,
}

/// Transactional persistence boundary for posts.
pub trait PostRepository: Send + Sync {
    /// Allocate a fresh post id.
    fn next_post_id(&self) -> PostId;

    fn find_post(&self, id: PostId) -> Result<Option<Post>, PersistenceError>;

    /// Persist `post` and append `publications` to the outbox as one unit.
    ///
    /// Either both the post write and every record become visible, or
    /// neither does. The write is rejected with `ConcurrentWrite` unless
    /// the stored version is exactly `post.version - 1` (0 for a new post).
    fn commit(
        &self,
        post: &Post,
        publications: &[PendingPublication],
    ) -> Result<Vec<PublicationRecord>, PersistenceError>;
}

/// Storage that holds both posts and their outbox, so that the two can be
/// written in one unit of work.
pub trait PostStore: PostRepository + EventStore {}

impl<T: PostRepository + EventStore> PostStore for T {}

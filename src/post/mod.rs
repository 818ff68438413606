//! Post - the aggregate whose transitions drive the event pipeline.
//!
//! `CREATED -> PUBLISHED -> ARCHIVED`, one step at a time. Each
//! transition is committed together with its outbox records.

mod error;
mod events;
mod post;
mod repository;
mod service;

pub use error::PostError;
pub use events::{PostArchived, PostCreated, PostPublished, POST_EVENT_TYPES};
pub use post::{NewPost, Post, PostId, PostStatus};
pub use repository::{PendingPublication, PostRepository, PostStore};
pub use service::PostService;

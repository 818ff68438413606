use thiserror::Error;

use crate::dispatch::{DispatchError, HandlerError};
use crate::error::PersistenceError;

use super::post::{PostId, PostStatus};

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post {0} not found")]
    NotFound(PostId),
    #[error("post {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: PostId,
        from: PostStatus,
        to: PostStatus,
    },
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<PostError> for HandlerError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Persistence(err) => HandlerError::Persistence(err),
            other => HandlerError::Rejected(other.to_string()),
        }
    }
}

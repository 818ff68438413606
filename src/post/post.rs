use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::error::PostError;
use super::events::{PostArchived, PostCreated, PostPublished};

pub type PostId = u64;

/// Lifecycle of a post. Transitions only move forward, one stage at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PostStatus {
    Created,
    Published,
    Archived,
}

impl PostStatus {
    /// The only status reachable from this one.
    pub fn successor(self) -> Option<PostStatus> {
        match self {
            PostStatus::Created => Some(PostStatus::Published),
            PostStatus::Published => Some(PostStatus::Archived),
            PostStatus::Archived => None,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Created => write!(f, "CREATED"),
            PostStatus::Published => write!(f, "PUBLISHED"),
            PostStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// Input for creating a post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// The post aggregate.
///
/// `version` starts at 1 and grows by one per transition; the repository
/// uses it to reject concurrent transitions of the same post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    pub version: u64,
}

impl Post {
    pub fn create(id: PostId, draft: NewPost, now: SystemTime) -> (Self, PostCreated) {
        let post = Self {
            id,
            title: draft.title,
            content: draft.content,
            status: PostStatus::Created,
            created_at: now,
            updated_at: now,
            version: 1,
        };
        (post, PostCreated { id })
    }

    pub fn publish(&mut self, now: SystemTime) -> Result<PostPublished, PostError> {
        self.transition(PostStatus::Published, now)?;
        Ok(PostPublished { id: self.id })
    }

    pub fn archive(&mut self, now: SystemTime) -> Result<PostArchived, PostError> {
        self.transition(PostStatus::Archived, now)?;
        Ok(PostArchived { id: self.id })
    }

    fn transition(&mut self, to: PostStatus, now: SystemTime) -> Result<(), PostError> {
        if self.status.successor() != Some(to) {
            return Err(PostError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = now;
        self.version += 1;
        Ok(())
    }
}

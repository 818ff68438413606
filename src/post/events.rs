use serde::{Deserialize, Serialize};

use crate::outbox::Event;

use super::post::PostId;

/// Emitted when a post is created. Consumed by the publisher module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreated {
    pub id: PostId,
}

/// Emitted when a post is published. Consumed by the archiver module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPublished {
    pub id: PostId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostArchived {
    pub id: PostId,
}

impl Event for PostCreated {
    const EVENT_TYPE: &'static str = "post.created";

    fn aggregate_id(&self) -> String {
        self.id.to_string()
    }
}

impl Event for PostPublished {
    const EVENT_TYPE: &'static str = "post.published";

    fn aggregate_id(&self) -> String {
        self.id.to_string()
    }
}

impl Event for PostArchived {
    const EVENT_TYPE: &'static str = "post.archived";

    fn aggregate_id(&self) -> String {
        self.id.to_string()
    }
}

/// Every event type the post aggregate can emit.
pub const POST_EVENT_TYPES: [&str; 3] = [
    PostCreated::EVENT_TYPE,
    PostPublished::EVENT_TYPE,
    PostArchived::EVENT_TYPE,
];

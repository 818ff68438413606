use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::PersistenceError;
use crate::failure::FailurePolicy;
use crate::outbox::{EventStore, OutboundEvent, PublicationId, PublicationRecord};
use crate::post::{PendingPublication, Post, PostId, PostRepository};

/// In-memory storage for posts and their outbox.
///
/// Cloning yields another handle to the same storage. A commit holds the
/// post and outbox write locks together, which makes the post write and
/// its records one unit of work.
#[derive(Clone)]
pub struct HashMapStore {
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
    outbox: Arc<RwLock<BTreeMap<PublicationId, PublicationRecord>>>,
    post_seq: Arc<AtomicU64>,
    outbox_seq: Arc<AtomicU64>,
    clock: Arc<dyn Clock>,
    write_failures: FailurePolicy,
}

impl Default for HashMapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HashMapStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        HashMapStore {
            posts: Arc::new(RwLock::new(HashMap::new())),
            outbox: Arc::new(RwLock::new(BTreeMap::new())),
            post_seq: Arc::new(AtomicU64::new(1)),
            outbox_seq: Arc::new(AtomicU64::new(1)),
            clock,
            write_failures: FailurePolicy::never(),
        }
    }

    /// Simulate storage write failures according to `policy`.
    pub fn with_write_failures(mut self, policy: FailurePolicy) -> Self {
        self.write_failures = policy;
        self
    }

    pub fn post_count(&self) -> Result<usize, PersistenceError> {
        let posts = self
            .posts
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("posts read"))?;
        Ok(posts.len())
    }

    fn check_write(&self) -> Result<(), PersistenceError> {
        if self.write_failures.should_fail() {
            return Err(PersistenceError::WriteRejected(format!(
                "simulated storage failure ({})",
                self.write_failures.describe()
            )));
        }
        Ok(())
    }
}

fn append_record(
    seq: &AtomicU64,
    outbox: &mut BTreeMap<PublicationId, PublicationRecord>,
    event: &OutboundEvent,
    handler_id: &str,
    clock: &dyn Clock,
) -> PublicationRecord {
    let id = seq.fetch_add(1, Ordering::SeqCst);
    let record = PublicationRecord::new(id, event, handler_id, clock.now());
    outbox.insert(id, record.clone());
    record
}

impl PostRepository for HashMapStore {
    fn next_post_id(&self) -> PostId {
        self.post_seq.fetch_add(1, Ordering::SeqCst)
    }

    fn find_post(&self, id: PostId) -> Result<Option<Post>, PersistenceError> {
        let posts = self
            .posts
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("posts read"))?;
        Ok(posts.get(&id).cloned())
    }

    fn commit(
        &self,
        post: &Post,
        publications: &[PendingPublication],
    ) -> Result<Vec<PublicationRecord>, PersistenceError> {
        let mut posts = self
            .posts
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("posts write"))?;
        let mut outbox = self
            .outbox
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("outbox write"))?;

        let actual = posts.get(&post.id).map(|stored| stored.version).unwrap_or(0);
        let expected = post.version.saturating_sub(1);
        if actual != expected {
            return Err(PersistenceError::ConcurrentWrite {
                id: post.id,
                expected,
                actual,
            });
        }

        self.check_write()?;

        posts.insert(post.id, post.clone());
        let records = publications
            .iter()
            .map(|publication| {
                append_record(
                    &self.outbox_seq,
                    &mut outbox,
                    &publication.event,
                    &publication.handler_id,
                    self.clock.as_ref(),
                )
            })
            .collect();

        Ok(records)
    }
}

impl EventStore for HashMapStore {
    fn record(
        &self,
        event: &OutboundEvent,
        handler_id: &str,
    ) -> Result<PublicationRecord, PersistenceError> {
        let mut outbox = self
            .outbox
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("outbox write"))?;
        self.check_write()?;
        Ok(append_record(
            &self.outbox_seq,
            &mut outbox,
            event,
            handler_id,
            self.clock.as_ref(),
        ))
    }

    fn mark_complete(&self, id: PublicationId) -> Result<bool, PersistenceError> {
        let mut outbox = self
            .outbox
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("outbox write"))?;
        let record = outbox
            .get_mut(&id)
            .ok_or(PersistenceError::UnknownRecord(id))?;

        if record.completed_at.is_some() {
            return Ok(false);
        }
        record.completed_at = Some(self.clock.now());
        Ok(true)
    }

    fn record_failure(&self, id: PublicationId, cause: &str) -> Result<(), PersistenceError> {
        let mut outbox = self
            .outbox
            .write()
            .map_err(|_| PersistenceError::LockPoisoned("outbox write"))?;
        let record = outbox
            .get_mut(&id)
            .ok_or(PersistenceError::UnknownRecord(id))?;

        if record.is_pending() {
            record.attempts += 1;
            record.last_error = Some(cause.to_string());
        }
        Ok(())
    }

    fn find_incomplete_older_than(
        &self,
        age: Duration,
    ) -> Result<Vec<PublicationRecord>, PersistenceError> {
        let outbox = self
            .outbox
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("outbox read"))?;
        let now = self.clock.now();

        let mut stale: Vec<PublicationRecord> = outbox
            .values()
            .filter(|record| record.is_pending())
            .filter(|record| {
                now.duration_since(record.created_at)
                    .map(|elapsed| elapsed >= age)
                    .unwrap_or(age.is_zero())
            })
            .cloned()
            .collect();
        stale.sort_by_key(|record| (record.created_at, record.id));

        Ok(stale)
    }

    fn get(&self, id: PublicationId) -> Result<Option<PublicationRecord>, PersistenceError> {
        let outbox = self
            .outbox
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("outbox read"))?;
        Ok(outbox.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<PublicationRecord>, PersistenceError> {
        let outbox = self
            .outbox
            .read()
            .map_err(|_| PersistenceError::LockPoisoned("outbox read"))?;
        Ok(outbox.values().cloned().collect())
    }
}

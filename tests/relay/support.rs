#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use post_relay::{
    listeners, ArchiveLog, EventStore, HashMapStore, InMemoryLockManager, ListenerFailures,
    LockManager, ManualClock, PostService, PublicationRecord, RelayConfig, RetryJob,
};

pub type Service = PostService<HashMapStore>;
pub type Job = RetryJob<Arc<Service>, Arc<InMemoryLockManager>>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config matching the source system's timings.
pub fn config() -> RelayConfig {
    RelayConfig {
        lock_name: "republish".to_string(),
        ..RelayConfig::default()
    }
}

/// One process instance on a manual clock.
pub struct Harness {
    pub clock: ManualClock,
    pub store: Arc<HashMapStore>,
    pub service: Arc<Service>,
    pub locks: Arc<InMemoryLockManager>,
    pub log: ArchiveLog,
}

impl Harness {
    pub fn new(failures: ListenerFailures) -> Self {
        init_tracing();
        let clock = ManualClock::starting_now();
        let store = Arc::new(HashMapStore::with_clock(Arc::new(clock.clone())));
        Self::with_store(clock, store, failures)
    }

    pub fn with_store(
        clock: ManualClock,
        store: Arc<HashMapStore>,
        failures: ListenerFailures,
    ) -> Self {
        let log = ArchiveLog::new();
        let registry = listeners::registry(failures, log.clone());
        let service = Arc::new(
            PostService::with_clock(store.clone(), registry, Arc::new(clock.clone())).unwrap(),
        );
        let locks = Arc::new(InMemoryLockManager::with_clock(Arc::new(clock.clone())));
        Self {
            clock,
            store,
            service,
            locks,
            log,
        }
    }

    pub fn job(&self, name: &str, instance: &str, config: &RelayConfig) -> Job {
        RetryJob::new(name, instance, self.service.clone(), self.locks.clone(), config)
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn records_for(&self, event_type: &str) -> Vec<PublicationRecord> {
        self.store
            .all()
            .unwrap()
            .into_iter()
            .filter(|r| r.event_type == event_type)
            .collect()
    }

    pub fn locks_current_holder(&self, lock_name: &str) -> Option<String> {
        self.locks
            .current(lock_name)
            .unwrap()
            .map(|lease| lease.holder)
    }

    pub fn pending(&self) -> usize {
        self.store.pending_count().unwrap()
    }
}

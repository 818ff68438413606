use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use post_relay::{
    listeners, ArchiveLog, DispatchError, EventStore, FailurePolicy, HashMapStore,
    InMemoryLockManager, IncompletePublications, ListenerFailures, NewPost, PostService,
    PostStatus, RelayConfig, ResubmitStats, RetryJob, RetryScheduler, TickOutcome,
};

use crate::support::{config, init_tracing, Harness};

fn stuck_harness() -> Harness {
    Harness::new(ListenerFailures {
        publisher: FailurePolicy::always(),
        archiver: FailurePolicy::never(),
    })
}

#[test]
fn simultaneous_ticks_on_two_instances_run_once() {
    let h = stuck_harness();
    let config = config();
    let a = h.job("job1", "node-a", &config);
    let b = h.job("job1", "node-b", &config);
    h.service.create(NewPost::new("p", "body")).unwrap();
    h.advance(config.staleness_threshold);

    let barrier = Barrier::new(2);
    let outcomes: Vec<TickOutcome> = thread::scope(|s| {
        let handles: Vec<_> = [&a, &b]
            .into_iter()
            .map(|job| {
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    job.tick()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    let ran = outcomes
        .iter()
        .filter(|o| matches!(o, TickOutcome::Ran(_)))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| **o == TickOutcome::Skipped)
        .count();
    assert_eq!((ran, skipped), (1, 1));
    // one immediate attempt plus exactly one resubmission
    assert_eq!(h.records_for("post.created")[0].attempts, 2);
}

#[test]
fn jobs_of_one_instance_share_the_lock() {
    let h = stuck_harness();
    let config = config();
    let job1 = h.job("job1", "node-a", &config);
    let job2 = h.job("job2", "node-a", &config);

    assert!(matches!(job1.tick(), TickOutcome::Ran(_)));
    // min hold keeps the lock after job1 released it
    assert_eq!(job2.tick(), TickOutcome::Skipped);
    assert_eq!(job1.tick(), TickOutcome::Skipped);

    h.advance(config.min_hold);
    assert!(matches!(job2.tick(), TickOutcome::Ran(_)));
    assert_eq!(
        h.locks_current_holder(&config.lock_name).as_deref(),
        Some("node-a/job2")
    );
}

#[test]
fn crashed_holder_blocks_at_most_max_hold() {
    use post_relay::LockManager;

    let h = stuck_harness();
    let config = config();
    let job = h.job("job1", "node-b", &config);

    // a holder that never releases
    h.locks
        .try_acquire(&config.lock_name, "node-a/job1", config.min_hold, config.max_hold)
        .unwrap()
        .unwrap();

    h.advance(config.max_hold - Duration::from_secs(1));
    assert_eq!(job.tick(), TickOutcome::Skipped);

    h.advance(Duration::from_secs(1));
    assert!(matches!(job.tick(), TickOutcome::Ran(_)));
}

/// Records how many passes run at the same time.
#[derive(Default)]
struct OverlapProbe {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    passes: AtomicUsize,
}

impl IncompletePublications for OverlapProbe {
    fn resubmit_incomplete_publications_older_than(
        &self,
        _age: Duration,
    ) -> Result<ResubmitStats, DispatchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        self.passes.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(ResubmitStats::default())
    }
}

fn fast_config() -> RelayConfig {
    RelayConfig {
        tick_interval: Duration::from_millis(1),
        initial_delay: Duration::ZERO,
        staleness_threshold: Duration::from_millis(10),
        lock_name: "republish".to_string(),
        min_hold: Duration::from_millis(1),
        max_hold: Duration::from_secs(5),
    }
}

#[test]
fn passes_never_overlap_across_threads() {
    init_tracing();
    let config = fast_config();
    let probe = Arc::new(OverlapProbe::default());
    let locks = Arc::new(InMemoryLockManager::new());

    let mut scheduler = RetryScheduler::new();
    for instance in ["node-a", "node-b"] {
        for name in ["job1", "job2"] {
            scheduler.start(
                RetryJob::new(name, instance, probe.clone(), locks.clone(), &config),
                &config,
            );
        }
    }
    assert_eq!(scheduler.len(), 4);

    thread::sleep(Duration::from_millis(200));
    let stats = scheduler.stop();

    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
    let locked: usize = stats.iter().map(|(_, s)| s.ticks_locked).sum();
    assert_eq!(locked, probe.passes.load(Ordering::SeqCst));
    assert!(locked > 0);
}

#[test]
fn two_instances_deliver_everything_eventually() {
    init_tracing();
    let config = fast_config();
    let store = Arc::new(HashMapStore::new());
    let log = ArchiveLog::new();
    let failures = ListenerFailures::uniform(FailurePolicy::with_probability(0.5));
    let service = Arc::new(
        PostService::new(store.clone(), listeners::registry(failures, log.clone())).unwrap(),
    );
    let locks = Arc::new(InMemoryLockManager::new());

    let mut schedulers: Vec<RetryScheduler> = ["node-a", "node-b"]
        .into_iter()
        .map(|instance| {
            let mut scheduler = RetryScheduler::new();
            for name in ["job1", "job2"] {
                scheduler.start(
                    RetryJob::new(name, instance, service.clone(), locks.clone(), &config),
                    &config,
                );
            }
            scheduler
        })
        .collect();

    let ids: Vec<_> = (0..10)
        .map(|i| {
            service
                .create(NewPost::new(format!("post {}", i), "body"))
                .unwrap()
                .id
        })
        .collect();

    let deadline = Instant::now() + Duration::from_secs(10);
    while store.pending_count().unwrap() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    for scheduler in schedulers.drain(..) {
        scheduler.stop();
    }

    assert_eq!(store.pending_count().unwrap(), 0);
    for id in &ids {
        assert_eq!(service.get(*id).unwrap().status, PostStatus::Archived);
    }
    let mut logged = log.entries();
    logged.sort_unstable();
    assert_eq!(logged, ids);
}

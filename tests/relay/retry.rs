use std::collections::HashMap;
use std::time::Duration;

use post_relay::{
    FailurePolicy, IncompletePublications, ListenerFailures, NewPost, PostStatus, RelayConfig,
    ResubmitStats, TickOutcome,
};

use crate::support::{config, Harness};

#[test]
fn failed_publication_is_redriven_after_the_threshold() {
    let h = Harness::new(ListenerFailures {
        publisher: FailurePolicy::first_n(1),
        archiver: FailurePolicy::always(),
    });
    let config = config();
    let job = h.job("job1", "node-a", &config);

    let post = h.service.create(NewPost::new("p1", "body")).unwrap();
    assert_eq!(h.service.get(post.id).unwrap().status, PostStatus::Created);
    assert_eq!(h.pending(), 1);

    // too young to be resubmitted
    assert_eq!(job.tick(), TickOutcome::Ran(ResubmitStats::default()));
    assert_eq!(h.service.get(post.id).unwrap().status, PostStatus::Created);

    h.advance(config.staleness_threshold);
    let outcome = job.tick();

    assert_eq!(
        outcome,
        TickOutcome::Ran(ResubmitStats {
            resubmitted: 1,
            completed: 1,
            ..ResubmitStats::default()
        })
    );
    assert_eq!(h.service.get(post.id).unwrap().status, PostStatus::Published);
    let created = h.records_for("post.created");
    assert!(created[0].is_complete());
    assert_eq!(created[0].attempts, 1);
    let published = h.records_for("post.published");
    assert_eq!(published.len(), 1);
    assert!(published[0].is_pending());
}

#[test]
fn permanent_failure_is_retried_every_eligible_tick() {
    let h = Harness::new(ListenerFailures {
        publisher: FailurePolicy::always(),
        archiver: FailurePolicy::never(),
    });
    let config = config();
    let job = h.job("job1", "node-a", &config);
    let post = h.service.create(NewPost::new("stuck", "body")).unwrap();

    for _ in 0..10 {
        h.advance(config.tick_interval);
        match job.tick() {
            TickOutcome::Ran(stats) => assert_eq!(stats.failed, 1),
            other => panic!("unexpected tick {:?}", other),
        }
    }

    let created = h.records_for("post.created");
    assert!(created[0].is_pending());
    assert_eq!(created[0].attempts, 11);
    assert_eq!(h.service.get(post.id).unwrap().status, PostStatus::Created);
}

#[test]
fn pending_publication_completes_within_bounded_ticks() {
    let h = Harness::new(ListenerFailures {
        publisher: FailurePolicy::first_n(1),
        archiver: FailurePolicy::never(),
    });
    let config = RelayConfig {
        tick_interval: Duration::from_secs(2),
        staleness_threshold: Duration::from_secs(5),
        min_hold: Duration::from_secs(1),
        ..config()
    };
    let job = h.job("job1", "node-a", &config);
    let post = h.service.create(NewPost::new("late", "body")).unwrap();

    let bound = config
        .staleness_threshold
        .as_millis()
        .div_ceil(config.tick_interval.as_millis()) as usize
        + 1;
    let mut ticks = 0;
    while h.pending() > 0 {
        assert!(ticks < bound, "still pending after {} ticks", ticks);
        h.advance(config.tick_interval);
        job.tick();
        ticks += 1;
    }

    assert_eq!(ticks, 3);
    assert_eq!(h.service.get(post.id).unwrap().status, PostStatus::Archived);
    assert_eq!(h.log.entries(), vec![post.id]);
}

#[test]
fn flaky_listeners_only_move_posts_forward() {
    let h = Harness::new(ListenerFailures::uniform(FailurePolicy::with_probability(0.3)));
    let config = config();
    let job = h.job("job1", "node-a", &config);

    let ids: Vec<_> = (0..20)
        .map(|i| {
            h.service
                .create(NewPost::new(format!("post {}", i), "body"))
                .unwrap()
                .id
        })
        .collect();

    let mut seen: HashMap<u64, Vec<PostStatus>> = HashMap::new();
    for _ in 0..200 {
        for id in &ids {
            seen.entry(*id)
                .or_default()
                .push(h.service.get(*id).unwrap().status);
        }
        if h.pending() == 0 {
            break;
        }
        h.advance(config.tick_interval);
        job.tick();
    }

    assert_eq!(h.pending(), 0);
    for id in &ids {
        let statuses = &seen[id];
        assert!(statuses.windows(2).all(|w| w[0] <= w[1]), "{:?}", statuses);
        assert_eq!(h.service.get(*id).unwrap().status, PostStatus::Archived);
        let published = h
            .records_for("post.published")
            .into_iter()
            .filter(|r| r.aggregate_id == id.to_string())
            .count();
        assert_eq!(published, 1);
    }
    let mut logged = h.log.entries();
    logged.sort_unstable();
    assert_eq!(logged, ids);
}

#[test]
fn operators_can_trigger_a_pass_directly() {
    let h = Harness::new(ListenerFailures {
        publisher: FailurePolicy::first_n(1),
        archiver: FailurePolicy::never(),
    });
    let post = h.service.create(NewPost::new("manual", "body")).unwrap();

    let stats = h
        .service
        .resubmit_incomplete_publications_older_than(Duration::ZERO)
        .unwrap();

    assert_eq!(stats.completed, 1);
    assert_eq!(h.service.get(post.id).unwrap().status, PostStatus::Archived);
}

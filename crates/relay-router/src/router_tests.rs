// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as SyncMutex;
use relay_core::clock::FakeClock;
use relay_core::task::{Task, TaskOptions};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

struct Ctx;

fn test_config() -> RouterConfig {
    RouterConfig {
        default_max_attempts: 3,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
        idempotency_ttl: Duration::from_millis(200),
        group_buffer: 64,
        group_idle_ttl: Duration::from_millis(50),
        cleanup_interval: Duration::from_millis(10),
        global_max_workers: 0,
        group_max_parallel: 1,
    }
}

// ordering within a single group.
#[tokio::test(flavor = "multi_thread")]
async fn same_group_tasks_execute_strictly_in_enqueue_order() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    let seen = Arc::new(SyncMutex::new(Vec::new()));

    let seen_for_handler = Arc::clone(&seen);
    router.register_handler("record", move |_ctx, payload| {
        let seen = Arc::clone(&seen_for_handler);
        async move {
            let n = payload.as_u64().unwrap();
            seen.lock().push(n);
            Ok(())
        }
    });

    for n in 1..=20u64 {
        router
            .dispatch(
                Task::new("record", serde_json::json!(n))
                    .with_options(TaskOptions::default().with_group("g")),
            )
            .await
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*seen.lock(), (1..=20).collect::<Vec<_>>());
}

// dedupe within the TTL window.
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_idempotency_key_is_rejected_until_ttl_expires() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    let calls = Arc::new(AtomicU32::new(0));
    let calls_for_handler = Arc::clone(&calls);
    router.register_handler("noop", move |_ctx, _payload| {
        let calls = Arc::clone(&calls_for_handler);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    let opts = TaskOptions::default().with_idempotency("K", Duration::from_millis(200));
    router
        .dispatch(Task::new("noop", serde_json::json!({})).with_options(opts.clone()))
        .await
        .unwrap();

    let second = router
        .dispatch(Task::new("noop", serde_json::json!({})).with_options(opts.clone()))
        .await;
    assert_eq!(second, Err(RouterError::Duplicate("K".to_string())));

    tokio::time::sleep(Duration::from_millis(260)).await;

    router
        .dispatch(Task::new("noop", serde_json::json!({})).with_options(opts))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// retry path with exponential backoff + jitter.
#[tokio::test(flavor = "multi_thread")]
async fn failing_handler_retries_with_backoff_then_succeeds() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    let attempts_seen = Arc::new(SyncMutex::new(Vec::new()));
    let seen = Arc::clone(&attempts_seen);
    let counter = Arc::new(AtomicU32::new(0));

    router.register_handler("flaky", move |_ctx, _payload| {
        let seen = Arc::clone(&seen);
        let counter = Arc::clone(&counter);
        async move {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            seen.lock().push(attempt);
            if attempt < 3 {
                Err("not yet".into())
            } else {
                Ok(())
            }
        }
    });

    router
        .dispatch(Task::new("flaky", serde_json::json!({})))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*attempts_seen.lock(), vec![1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_retries_become_terminal_failure_without_further_attempts() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    let counter = Arc::new(AtomicU32::new(0));
    let counter_for_handler = Arc::clone(&counter);

    router.register_handler("always_fails", move |_ctx, _payload| {
        let counter = Arc::clone(&counter_for_handler);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("boom".into())
        }
    });

    router
        .dispatch(Task::new("always_fails", serde_json::json!({})))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

// idle GC destroys the group, later dispatch recreates it.
#[tokio::test(flavor = "multi_thread")]
async fn idle_group_is_reclaimed_and_recreated_on_next_dispatch() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    router.register_handler("noop", |_ctx, _payload| async { Ok(()) });

    router
        .dispatch(
            Task::new("noop", serde_json::json!({}))
                .with_options(TaskOptions::default().with_group("fresh")),
        )
        .await
        .unwrap();

    let before = router.stats().groups_count;
    assert!(before >= 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(router.stats().groups_count, 0);

    router
        .dispatch(
            Task::new("noop", serde_json::json!({}))
                .with_options(TaskOptions::default().with_group("fresh")),
        )
        .await
        .unwrap();
    assert_eq!(router.stats().groups_count, 1);
}

#[tokio::test]
async fn dispatch_unknown_type_fails_synchronously() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    let result = router
        .dispatch(Task::new("never_registered", serde_json::json!({})))
        .await;
    assert_eq!(
        result,
        Err(RouterError::UnknownType("never_registered".to_string()))
    );
}

#[tokio::test]
async fn dispatch_after_close_fails_with_closed() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    router.register_handler("noop", |_ctx, _payload| async { Ok(()) });
    router.close().await;

    let result = router.dispatch(Task::new("noop", serde_json::json!({}))).await;
    assert_eq!(result, Err(RouterError::Closed));
}

#[tokio::test]
async fn close_is_idempotent() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    router.close().await;
    router.close().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn cron_job_dispatches_its_task_on_schedule() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    let counter = Arc::new(AtomicU32::new(0));
    let counter_for_handler = Arc::clone(&counter);
    router.register_handler("tick", move |_ctx, _payload| {
        let counter = Arc::clone(&counter_for_handler);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });

    router.register_cron(
        Duration::from_millis(20),
        Task::new("tick", serde_json::json!({})),
    );

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(counter.load(Ordering::SeqCst) >= 2);
}

// a rebuild-style cron must recompute its task (and idempotency key) on
// every tick rather than re-dispatching whatever it built at registration.
#[tokio::test(flavor = "multi_thread")]
async fn rebuild_cron_recomputes_its_task_on_every_tick() {
    let router: Router<Ctx> = Router::new(test_config(), Arc::new(Ctx));
    let seen_keys = Arc::new(SyncMutex::new(Vec::new()));
    let seen_for_handler = Arc::clone(&seen_keys);
    router.register_handler("tick", move |_ctx, payload| {
        let seen = Arc::clone(&seen_for_handler);
        async move {
            seen.lock().push(payload.as_u64().unwrap());
            Ok(())
        }
    });

    let counter = Arc::new(AtomicU32::new(0));
    let counter_for_builder = Arc::clone(&counter);
    router.register_cron_with(Duration::from_millis(20), move || {
        let n = counter_for_builder.fetch_add(1, Ordering::SeqCst) + 1;
        Task::new("tick", serde_json::json!(n)).with_options(
            TaskOptions::default().with_idempotency(format!("tick-{n}"), Duration::from_secs(60)),
        )
    });

    tokio::time::sleep(Duration::from_millis(120)).await;
    let seen = seen_keys.lock();
    assert!(seen.len() >= 2);
    // every dispatched payload is distinct: the idempotency key changed
    // on each tick instead of rejecting all but the first as a duplicate.
    let mut sorted = seen.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), seen.len());
}

#[tokio::test(flavor = "multi_thread")]
async fn global_semaphore_bounds_concurrent_handler_executions() {
    let config = RouterConfig {
        global_max_workers: 1,
        group_buffer: 64,
        ..test_config()
    };
    let router: Router<Ctx> = Router::new(config, Arc::new(Ctx));
    let concurrent = Arc::new(AtomicU32::new(0));
    let max_concurrent = Arc::new(AtomicU32::new(0));

    let concurrent_for_handler = Arc::clone(&concurrent);
    let max_for_handler = Arc::clone(&max_concurrent);
    router.register_handler("slow", move |_ctx, _payload| {
        let concurrent = Arc::clone(&concurrent_for_handler);
        let max_concurrent = Arc::clone(&max_for_handler);
        async move {
            let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            max_concurrent.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            concurrent.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    });

    for n in 0..5 {
        router
            .dispatch(
                Task::new("slow", serde_json::json!({}))
                    .with_options(TaskOptions::default().with_group(format!("g{n}"))),
            )
            .await
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn with_clock_uses_injected_clock_for_idempotency_expiry() {
    let clock = FakeClock::new();
    let router: Router<Ctx, FakeClock> =
        Router::with_clock(test_config(), Arc::new(Ctx), clock.clone());
    router.register_handler("noop", |_ctx, _payload| async { Ok(()) });

    let opts = TaskOptions::default().with_idempotency("K", Duration::from_millis(100));
    router
        .dispatch(Task::new("noop", serde_json::json!({})).with_options(opts.clone()))
        .await
        .unwrap();

    let dup = router
        .dispatch(Task::new("noop", serde_json::json!({})).with_options(opts.clone()))
        .await;
    assert_eq!(dup, Err(RouterError::Duplicate("K".to_string())));

    clock.advance(Duration::from_millis(150));

    router
        .dispatch(Task::new("noop", serde_json::json!({})).with_options(opts))
        .await
        .unwrap();
}

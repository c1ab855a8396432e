// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as SyncMutex;
use std::time::Duration;

#[tokio::test]
async fn single_parallel_worker_processes_in_enqueue_order() {
    let seen = Arc::new(SyncMutex::new(Vec::new()));
    let seen_for_worker = Arc::clone(&seen);

    let worker = GroupWorker::spawn(
        "g".to_string(),
        16,
        1,
        Instant::now(),
        move |item: QueuedTask<u32>| {
            let seen = Arc::clone(&seen_for_worker);
            async move {
                seen.lock().push(item.task);
            }
        },
    );

    for n in 0..20u32 {
        worker
            .enqueue(QueuedTask { task: n, attempt: 1 }, Instant::now())
            .await
            .unwrap();
    }

    // Give the single consumer task a chance to drain the channel.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*seen.lock(), (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn enqueue_updates_last_active() {
    let worker = GroupWorker::spawn("g".to_string(), 4, 1, Instant::now(), |_: QueuedTask<u32>| async {});
    let before = worker.last_active();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let now = Instant::now();
    worker
        .enqueue(QueuedTask { task: 1, attempt: 1 }, now)
        .await
        .unwrap();
    assert!(worker.last_active() >= before);
    assert_eq!(worker.last_active(), now);
}

#[tokio::test]
async fn queue_is_empty_once_drained() {
    let worker = GroupWorker::spawn("g".to_string(), 4, 1, Instant::now(), |_: QueuedTask<u32>| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
    });
    worker
        .enqueue(QueuedTask { task: 1, attempt: 1 }, Instant::now())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(worker.queue_is_empty());
}

#[tokio::test]
async fn stopping_flag_round_trips() {
    let worker = GroupWorker::spawn("g".to_string(), 1, 1, Instant::now(), |_: QueuedTask<u32>| async {});
    assert!(!worker.is_stopping());
    worker.mark_stopping();
    assert!(worker.is_stopping());
}

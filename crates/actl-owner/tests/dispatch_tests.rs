//! Dispatch bridge tests: ordering, atomicity, shutdown and timeouts.

use std::thread;
use std::time::Duration;

use actl_owner::{DispatchConfig, DispatchError, Dispatcher, OwnerQueue, channel};

fn no_timeout<S: 'static>() -> (Dispatcher<S>, OwnerQueue<S>) {
    channel(DispatchConfig { timeout: None })
}

/// Spawn a dedicated owner thread holding a `Vec<u32>` as its state.
fn spawn_owner(queue: OwnerQueue<Vec<u32>>) -> thread::JoinHandle<Vec<u32>> {
    thread::Builder::new()
        .name("owner".into())
        .spawn(move || {
            let mut state = Vec::new();
            queue.run(&mut state);
            state
        })
        .unwrap()
}

async fn wait_for_pending<S: 'static>(queue: &OwnerQueue<S>, expected: usize) {
    for _ in 0..1000 {
        if queue.pending_len() >= expected {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {expected} queued jobs, found {}", queue.pending_len());
}

#[tokio::test]
async fn run_executes_on_owner_thread() {
    let (dispatcher, queue) = no_timeout::<Vec<u32>>();
    let owner = spawn_owner(queue);

    let name = dispatcher
        .run(|state| {
            state.push(7);
            thread::current().name().map(str::to_string)
        })
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("owner"));

    dispatcher.close();
    assert_eq!(owner.join().unwrap(), vec![7]);
}

#[tokio::test]
async fn submissions_from_one_caller_run_in_order() {
    let (dispatcher, queue) = no_timeout::<Vec<u32>>();
    let owner = spawn_owner(queue);

    let (a, b, c) = tokio::join!(
        dispatcher.run(|s| s.push(1)),
        dispatcher.run(|s| s.push(2)),
        dispatcher.run(|s| s.push(3)),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());

    let snapshot = dispatcher.run(|s| s.clone()).await.unwrap();
    assert_eq!(snapshot, vec![1, 2, 3]);

    dispatcher.close();
    owner.join().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_never_interleave() {
    // Each job performs a read-modify-write in two steps; interleaving would
    // lose updates or leave an odd-length vector behind.
    let (dispatcher, queue) = no_timeout::<Vec<u32>>();
    let owner = spawn_owner(queue);

    let mut tasks = Vec::new();
    for caller in 0..8u32 {
        let dispatcher = dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..50 {
                dispatcher
                    .run(move |s| {
                        s.push(caller);
                        let len = s.len();
                        s.push(caller);
                        assert_eq!(s.len(), len + 1);
                    })
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let state = dispatcher.run(|s| s.clone()).await.unwrap();
    assert_eq!(state.len(), 8 * 50 * 2);
    for pair in state.chunks(2) {
        assert_eq!(pair[0], pair[1]);
    }

    dispatcher.close();
    owner.join().unwrap();
}

#[tokio::test]
async fn closed_owner_fails_fast() {
    let (dispatcher, queue) = no_timeout::<Vec<u32>>();
    let owner = spawn_owner(queue);
    dispatcher.close();
    owner.join().unwrap();

    assert!(!dispatcher.is_available());
    let result = dispatcher.run(|s| s.len()).await;
    assert_eq!(result, Err(DispatchError::OwnerUnavailable));
}

#[tokio::test]
async fn dropped_queue_fails_fast() {
    let (dispatcher, queue) = no_timeout::<u32>();
    drop(queue);
    assert_eq!(
        dispatcher.run(|n| *n).await,
        Err(DispatchError::OwnerUnavailable)
    );
}

#[tokio::test]
async fn close_fails_queued_jobs() {
    let (dispatcher, mut queue) = no_timeout::<u32>();
    let waiting = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run(|n| *n += 1).await })
    };
    wait_for_pending(&queue, 1).await;

    queue.close();
    assert_eq!(waiting.await.unwrap(), Err(DispatchError::OwnerUnavailable));
    assert!(!queue.is_open());
}

#[tokio::test]
async fn pump_runs_only_jobs_already_queued() {
    let (dispatcher, mut queue) = no_timeout::<u32>();
    let mut state = 0u32;
    assert_eq!(queue.pump(&mut state), 0);

    let first = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run(|n| { *n += 1; *n }).await })
    };
    let second = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run(|n| { *n += 10; *n }).await })
    };
    wait_for_pending(&queue, 2).await;

    assert_eq!(queue.pump(&mut state), 2);
    assert_eq!(state, 11);
    assert_eq!(queue.pending_len(), 0);

    let mut results = vec![first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];
    results.sort_unstable();
    assert_eq!(results, vec![1, 11]);
}

#[tokio::test]
async fn timeout_before_start_skips_job() {
    let (dispatcher, mut queue) = channel::<u32>(DispatchConfig {
        timeout: Some(Duration::from_millis(20)),
    });
    let result = dispatcher.run(|n| *n += 1).await;
    assert_eq!(result, Err(DispatchError::Timeout(Duration::from_millis(20))));

    let mut state = 0;
    assert_eq!(queue.pump(&mut state), 0, "abandoned job must not run");
    assert_eq!(state, 0);
}

#[tokio::test]
async fn timeout_while_running_still_completes_once() {
    let (dispatcher, queue) = channel::<Vec<u32>>(DispatchConfig {
        timeout: Some(Duration::from_millis(20)),
    });
    let owner = spawn_owner(queue);

    let result = dispatcher
        .run(|s| {
            thread::sleep(Duration::from_millis(150));
            s.push(1);
        })
        .await;
    assert!(matches!(result, Err(DispatchError::Timeout(_))));

    let patient = dispatcher.clone().with_timeout(None);
    assert_eq!(patient.run(|s| s.clone()).await.unwrap(), vec![1]);

    dispatcher.close();
    assert_eq!(owner.join().unwrap(), vec![1]);
}

#[tokio::test]
async fn panicking_job_is_contained() {
    let (dispatcher, queue) = no_timeout::<Vec<u32>>();
    let owner = spawn_owner(queue);

    let result: Result<(), _> = dispatcher.run(|_| panic!("boom")).await;
    assert_eq!(result, Err(DispatchError::Panicked));

    assert_eq!(dispatcher.run(|s| { s.push(2); s.len() }).await, Ok(1));

    dispatcher.close();
    owner.join().unwrap();
}

#[test]
fn default_config_has_bounded_wait() {
    assert_eq!(DispatchConfig::default().timeout, Some(Duration::from_secs(30)));
    let (dispatcher, _queue) = channel::<()>(DispatchConfig::default());
    assert!(dispatcher.is_available());
    assert_eq!(dispatcher.timeout(), Some(Duration::from_secs(30)));
}

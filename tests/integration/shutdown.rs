//! Cooperative shutdown behavior

use std::time::Duration;

use tokio::time::timeout;

use livefeed_poller::poller::{PollConfig, PollController, StopReason};
use livefeed_poller::shutdown::ShutdownHandle;
use livefeed_poller::Batch;

use crate::support::{MemoryCursorStore, RecordingSink, ScriptedFetcher};

#[tokio::test]
async fn shutdown_notifies_waiters() {
    let shutdown = ShutdownHandle::shared();
    let waiter = {
        let handle = shutdown.clone();
        tokio::spawn(async move {
            handle.wait_for_shutdown().await;
            true
        })
    };

    // Give the task time to start waiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.request_shutdown();

    let result = timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok());
}

/// Requesting shutdown immediately before waiting must not deadlock: the
/// wait registers interest before checking the flag.
#[tokio::test]
async fn shutdown_request_before_wait_does_not_deadlock() {
    let shutdown = ShutdownHandle::shared();
    shutdown.request_shutdown();

    let handle = shutdown.clone();
    let waiter = tokio::spawn(async move {
        handle.wait_for_shutdown().await;
        true
    });

    let result = timeout(Duration::from_secs(1), waiter).await;
    assert!(
        result.is_ok(),
        "wait_for_shutdown() deadlocked despite shutdown already requested"
    );
}

#[tokio::test]
async fn shutdown_concurrent_waiters_all_notified() {
    let shutdown = ShutdownHandle::shared();

    let mut waiters = Vec::new();
    for _ in 0..10 {
        let handle = shutdown.clone();
        waiters.push(tokio::spawn(async move {
            handle.wait_for_shutdown().await;
        }));
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown.request_shutdown();

    for waiter in waiters {
        let result = timeout(Duration::from_secs(1), waiter).await;
        assert!(result.is_ok(), "a waiter was not notified of shutdown");
    }
}

/// The poll loop must leave a long pacing sleep promptly when shutdown is
/// requested, without waiting the sleep out.
#[tokio::test]
async fn poll_loop_stops_during_pacing_sleep() {
    let (fetcher, windows) = ScriptedFetcher::new(vec![Ok(Batch::empty("{}"))]);
    let (sink, _sunk) = RecordingSink::new();
    let (store, _saves) = MemoryCursorStore::new(Some(
        chrono::Utc::now() - chrono::Duration::hours(2),
    ));

    let config = PollConfig {
        max_posts: 100,
        // Long enough that the test can only pass via interruption.
        target_interval: Duration::from_secs(60),
        retry_delay: Duration::from_secs(60),
        safety_skew: Duration::from_millis(0),
        default_lookback: Duration::from_secs(3600),
    };

    let shutdown = ShutdownHandle::shared();
    let controller = PollController::continuous(
        Box::new(fetcher),
        Box::new(sink),
        Box::new(store),
        config,
        shutdown.clone(),
    );

    let handle = tokio::spawn(controller.run());

    // Let the first fetch complete so the loop enters its pacing sleep.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while windows.len() < 1 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    shutdown.request_shutdown();

    let summary = timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop must stop well before the 60s sleep elapses")
        .unwrap();
    assert_eq!(summary.stopped, StopReason::ShutdownRequested);
}

/// A shutdown requested before the loop starts must terminate it before the
/// first fetch.
#[tokio::test]
async fn poll_loop_honors_preexisting_shutdown_request() {
    let (fetcher, windows) = ScriptedFetcher::new(vec![Ok(Batch::empty("{}"))]);
    let (sink, _sunk) = RecordingSink::new();
    let (store, _saves) = MemoryCursorStore::new(None);

    let shutdown = ShutdownHandle::shared();
    shutdown.request_shutdown();

    let controller = PollController::continuous(
        Box::new(fetcher),
        Box::new(sink),
        Box::new(store),
        PollConfig::continuous_defaults(),
        shutdown,
    );

    let summary = timeout(Duration::from_secs(1), controller.run())
        .await
        .expect("loop must stop immediately");
    assert_eq!(summary.stopped, StopReason::ShutdownRequested);
    assert_eq!(windows.len(), 0, "no fetch may start after shutdown");
}

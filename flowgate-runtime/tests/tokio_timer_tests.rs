// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use flowgate_runtime::impls::tokio::{TokioRuntime, TokioTimer};
use flowgate_runtime::runtime::Runtime;
use flowgate_runtime::timer::Timer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{advance, pause};

#[tokio::test]
async fn test_now_follows_paused_clock() {
    // Arrange
    pause();
    let timer = TokioTimer;
    let start = timer.now();

    // Act
    advance(Duration::from_millis(250)).await;

    // Assert
    assert_eq!(timer.elapsed_since(start), Duration::from_millis(250));
}

#[tokio::test]
async fn test_elapsed_since_saturates_for_future_instant() {
    let timer = TokioTimer;
    let later = timer.now() + Duration::from_secs(5);

    assert_eq!(timer.elapsed_since(later), Duration::ZERO);
}

#[tokio::test]
async fn test_sleep_future_completes_after_duration() {
    // Arrange
    pause();
    let timer = TokioRuntime::timer();
    let start = timer.now();

    // Act
    timer.sleep_future(Duration::from_millis(40)).await;

    // Assert
    assert!(timer.elapsed_since(start) >= Duration::from_millis(40));
}

#[tokio::test]
async fn test_spawn_runs_detached_future() -> anyhow::Result<()> {
    // Arrange
    let ran = Arc::new(AtomicBool::new(false));
    let ran_clone = ran.clone();
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    // Act
    TokioRuntime::spawn(async move {
        ran_clone.store(true, Ordering::SeqCst);
        let _ = done_tx.send(());
    });
    done_rx.await?;

    // Assert
    assert!(ran.load(Ordering::SeqCst));
    Ok(())
}

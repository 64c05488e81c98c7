// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use flowgate_core::{CancelReason, GateError, GateOptions, Outcome};
use flowgate_exec::AsyncDebouncer;
use flowgate_test_utils::thunks::{delayed, failing, recorded};
use flowgate_test_utils::{advance_ms, assert_pending, assert_resolved, ms, Recorder, TestError};
use tokio::time::{pause, Instant};

#[tokio::test]
async fn test_async_debouncer_delivers_only_last_query() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(300));
    let recorder = Recorder::new();
    let started = Instant::now();

    // Act: keystrokes at t=0, 100 and 200
    let mut a = debouncer.run(recorded(&recorder, "a", 0));
    advance_ms(100).await;
    let mut ab = debouncer.run(recorded(&recorder, "ab", 0));
    advance_ms(100).await;
    let abc = debouncer.run(recorded(&recorder, "abc", 0));

    // Assert
    assert_eq!(
        assert_resolved(&mut a)?,
        Outcome::Cancelled(CancelReason::Superseded)
    );
    assert_eq!(
        assert_resolved(&mut ab)?,
        Outcome::Cancelled(CancelReason::Superseded)
    );
    assert_eq!(abc.await?, Outcome::Completed("abc"));
    assert_eq!(started.elapsed(), ms(500));
    assert_eq!(recorder.snapshot(), vec!["abc"]);

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_waits_full_quiet_period() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(100));
    let recorder = Recorder::new();

    // Act
    let mut handle = debouncer.run(recorded(&recorder, 1, 0));
    advance_ms(99).await;

    // Assert
    assert!(debouncer.is_pending());
    assert!(recorder.is_empty());
    assert_pending(&mut handle);

    advance_ms(1).await;
    assert!(!debouncer.is_pending());
    assert_eq!(handle.await?, Outcome::Completed(1));

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_discards_result_superseded_while_running() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(100));
    let recorder = Recorder::new();
    let first = debouncer.run(recorded(&recorder, 1, 200));
    advance_ms(100).await;
    advance_ms(50).await;

    // Act: the first thunk is running when the second call arrives
    assert!(debouncer.is_running());
    let second = debouncer.run(recorded(&recorder, 2, 200));

    // Assert
    assert_eq!(first.await?, Outcome::Cancelled(CancelReason::Superseded));
    assert_eq!(second.await?, Outcome::Completed(2));
    assert_eq!(recorder.snapshot(), vec![1, 2]);

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_error_reaches_current_caller() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(50));

    // Act
    let handle = debouncer.run(failing::<u32>("lookup failed", 10));

    // Assert
    assert!(matches!(
        handle.await,
        Err(GateError::Operation(error)) if error == TestError::new("lookup failed")
    ));

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_error_of_superseded_call_is_discarded() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(50));
    let failed = debouncer.run(failing::<u32>("stale failure", 100));
    advance_ms(60).await;

    // Act
    let fresh = debouncer.run(delayed(2, 0));

    // Assert
    assert_eq!(failed.await?, Outcome::Cancelled(CancelReason::Superseded));
    assert_eq!(fresh.await?, Outcome::Completed(2));

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_cancel_resolves_waiting_and_running_calls() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(50));
    let running = debouncer.run(delayed(1, 100));
    advance_ms(60).await;
    let mut waiting = debouncer.run(delayed(2, 0));

    // Act
    debouncer.cancel();

    // Assert
    assert_eq!(
        assert_resolved(&mut waiting)?,
        Outcome::Cancelled(CancelReason::Reset)
    );
    assert!(!debouncer.is_pending());
    assert_eq!(running.await?, Outcome::Cancelled(CancelReason::Reset));

    // Still usable afterwards
    assert_eq!(debouncer.run(delayed(3, 0)).await?, Outcome::Completed(3));

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_dispose_resolves_everything_at_once() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(50));
    let mut running = debouncer.run(delayed(1, 100));
    advance_ms(60).await;
    let mut waiting = debouncer.run(delayed(2, 0));

    // Act
    debouncer.dispose();
    debouncer.dispose();

    // Assert
    assert_eq!(
        assert_resolved(&mut running)?,
        Outcome::Cancelled(CancelReason::Disposed)
    );
    assert_eq!(
        assert_resolved(&mut waiting)?,
        Outcome::Cancelled(CancelReason::Disposed)
    );
    assert!(debouncer.is_disposed());
    assert_eq!(
        debouncer.run(delayed(3, 0)).await?,
        Outcome::Cancelled(CancelReason::Disposed)
    );

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_reset_on_error_clears_state_after_current_failure() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer =
        AsyncDebouncer::with_options(ms(100), GateOptions::new().with_reset_on_error(true));

    // Act
    let failed = debouncer.run(failing::<u32>("boom", 50));

    // Assert
    assert!(matches!(
        failed.await,
        Err(GateError::Operation(error)) if error == TestError::new("boom")
    ));
    assert!(!debouncer.is_pending());
    assert!(!debouncer.is_running());
    assert_eq!(debouncer.run(delayed(3, 0)).await?, Outcome::Completed(3));

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_stale_failure_does_not_reset_newer_call() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer =
        AsyncDebouncer::with_options(ms(300), GateOptions::new().with_reset_on_error(true));
    let recorder = Recorder::new();

    // Act: the first thunk runs 300..500 and fails; the second call arrives at 350
    let stale = debouncer.run(failing::<u32>("boom", 200));
    advance_ms(300).await;
    advance_ms(50).await;
    let newest = debouncer.run(recorded(&recorder, 7, 0));

    // Assert
    assert_eq!(stale.await?, Outcome::Cancelled(CancelReason::Superseded));
    assert_eq!(newest.await?, Outcome::Completed(7));
    assert_eq!(recorder.snapshot(), vec![7]);

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_dropped_gate_abandons_waiting_call() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::new(ms(50));
    let handle = debouncer.run(delayed(1, 0));

    // Act
    drop(debouncer);

    // Assert
    assert_eq!(handle.await?, Outcome::Cancelled(CancelReason::Abandoned));

    Ok(())
}

#[tokio::test]
async fn test_async_debouncer_panic_is_reported_to_current_caller() -> anyhow::Result<()> {
    // Arrange
    pause();
    let debouncer = AsyncDebouncer::<u32, TestError>::new(ms(10));

    // Act
    let handle = debouncer.run(|| -> std::future::Ready<Result<u32, TestError>> {
        panic!("thunk exploded before returning a future")
    });

    // Assert
    assert!(matches!(
        handle.await,
        Err(GateError::Panicked { context }) if context.contains("exploded")
    ));

    Ok(())
}

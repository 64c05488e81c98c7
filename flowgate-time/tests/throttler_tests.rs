// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use flowgate_core::GateOptions;
use flowgate_test_utils::{ms, Recorder, TestError};
use flowgate_time::Throttler;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{advance, pause};

#[tokio::test]
async fn test_throttler_runs_first_call_immediately() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(500));

    // Act
    let output = throttler.call(|| 42);

    // Assert
    assert_eq!(output, Some(42));
    assert!(throttler.is_throttled());

    Ok(())
}

#[tokio::test]
async fn test_throttler_ignores_calls_inside_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(500));
    let recorder = Recorder::new();
    let submit = |id: u32| {
        let recorder = recorder.clone();
        throttler.call(move || recorder.record(id))
    };

    // Act: calls at t=0, 50, 100 and 600
    let first = submit(1);
    advance(ms(50)).await;
    let second = submit(2);
    advance(ms(50)).await;
    let third = submit(3);
    advance(ms(500)).await;
    let fourth = submit(4);

    // Assert
    assert_eq!(first, Some(()));
    assert_eq!(second, None);
    assert_eq!(third, None);
    assert_eq!(fourth, Some(()));
    assert_eq!(recorder.snapshot(), vec![1, 4]);

    Ok(())
}

#[tokio::test]
async fn test_throttler_window_ends_exactly_at_duration() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(100));
    throttler.call(|| ());

    // Act & Assert
    advance(ms(99)).await;
    assert!(throttler.is_throttled());
    assert_eq!(throttler.call(|| ()), None);

    advance(ms(1)).await;
    assert!(!throttler.is_throttled());
    assert_eq!(throttler.call(|| ()), Some(()));

    Ok(())
}

#[tokio::test]
async fn test_throttler_ignored_calls_do_not_extend_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(100));
    throttler.call(|| ());

    // Act: hammer the gate for the whole window
    for _ in 0..9 {
        advance(ms(10)).await;
        assert_eq!(throttler.call(|| ()), None);
    }
    advance(ms(10)).await;

    // Assert
    assert_eq!(throttler.call(|| ()), Some(()));

    Ok(())
}

#[tokio::test]
async fn test_throttler_reset_reopens_gate() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(500));
    throttler.call(|| ());

    // Act
    throttler.reset();

    // Assert
    assert!(!throttler.is_throttled());
    assert_eq!(throttler.call(|| "again"), Some("again"));

    Ok(())
}

#[tokio::test]
async fn test_throttler_dispose_ignores_every_later_call() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(100));

    // Act
    throttler.dispose();
    throttler.dispose();
    advance(ms(1000)).await;

    // Assert
    assert!(throttler.is_disposed());
    assert_eq!(throttler.call(|| ()), None);
    assert_eq!(throttler.try_call(|| Ok::<_, TestError>(1))?, None);

    Ok(())
}

#[tokio::test]
async fn test_throttler_call_with_duration_overrides_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(500));

    // Act
    throttler.call_with_duration(ms(50), || ());
    advance(ms(50)).await;

    // Assert
    assert_eq!(throttler.call(|| 2), Some(2));
    advance(ms(100)).await;
    assert_eq!(throttler.call(|| 3), None);

    Ok(())
}

#[tokio::test]
async fn test_throttler_zero_duration_never_throttles() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(Duration::ZERO);

    // Act
    let outputs: Vec<_> = (0..5).map(|i| throttler.call(|| i)).collect();

    // Assert
    assert_eq!(outputs, vec![Some(0), Some(1), Some(2), Some(3), Some(4)]);
    assert!(!throttler.is_throttled());

    Ok(())
}

#[tokio::test]
async fn test_throttler_try_call_returns_error_and_keeps_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(500));

    // Act
    let result = throttler.try_call(|| Err::<(), _>(TestError::new("boom")));

    // Assert
    assert_eq!(result, Err(TestError::new("boom")));
    assert!(throttler.is_throttled());
    assert_eq!(throttler.try_call(|| Ok::<_, TestError>(1))?, None);

    Ok(())
}

#[tokio::test]
async fn test_throttler_reset_on_error_clears_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler =
        Throttler::with_options(ms(500), GateOptions::new().with_reset_on_error(true));

    // Act
    let failed = throttler.try_call(|| Err::<(), _>(TestError::new("boom")));
    let retried = throttler.try_call(|| Ok::<_, TestError>("retried"));

    // Assert
    assert!(failed.is_err());
    assert_eq!(retried?, Some("retried"));

    Ok(())
}

#[tokio::test]
async fn test_throttler_panicking_action_keeps_window_by_default() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(500));

    // Act
    let panicked = panic::catch_unwind(AssertUnwindSafe(|| {
        throttler.call(|| -> u32 { panic!("boom") })
    }));

    // Assert
    assert!(panicked.is_err());
    assert!(throttler.is_throttled());
    assert_eq!(throttler.call(|| 1), None);

    Ok(())
}

#[tokio::test]
async fn test_throttler_reset_on_error_clears_window_after_panic() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler =
        Throttler::with_options(ms(500), GateOptions::new().with_reset_on_error(true));

    // Act
    let panicked = panic::catch_unwind(AssertUnwindSafe(|| {
        throttler.try_call(|| -> Result<u32, TestError> { panic!("boom") })
    }));

    // Assert: the panic still reaches the caller, but the next call runs
    assert!(panicked.is_err());
    assert!(!throttler.is_throttled());
    assert_eq!(throttler.call(|| 2), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_throttler_reports_metrics() -> anyhow::Result<()> {
    // Arrange
    pause();
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();
    let throttler = Throttler::with_options(
        ms(500),
        GateOptions::new().with_metrics(move |elapsed, executed| sink.lock().push((elapsed, executed))),
    );

    // Act
    throttler.call(|| ());
    throttler.call(|| ());

    // Assert
    let reports = reports.lock().clone();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].1);
    assert_eq!(reports[1], (Duration::ZERO, false));

    Ok(())
}

#[tokio::test]
async fn test_throttler_clones_share_window() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(500));
    let other = throttler.clone();

    // Act
    throttler.call(|| ());

    // Assert
    assert!(other.is_throttled());
    assert_eq!(other.call(|| ()), None);

    Ok(())
}

#[tokio::test]
async fn test_throttler_wrap_throttles_callback() -> anyhow::Result<()> {
    // Arrange
    pause();
    let throttler = Throttler::new(ms(100));
    let recorder = Recorder::new();
    let sink = recorder.clone();
    let on_click = throttler.wrap(move || sink.record("click"));

    // Act
    on_click();
    on_click();
    advance(ms(100)).await;
    on_click();

    // Assert
    assert_eq!(recorder.snapshot(), vec!["click", "click"]);

    Ok(())
}

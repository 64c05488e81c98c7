// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Spawned background work owned by a gate, cancelled when the handle drops.
//!
//! Gates use [`GateTask::after`] as their one-shot alarm: a gate stores at most
//! one alarm per purpose, and replacing the stored `GateTask` cancels the
//! previous alarm before it can fire.

use crate::CancellationToken;
use core::future::Future;
use core::time::Duration;
use flowgate_runtime::runtime::Runtime;
use flowgate_runtime::timer::Timer;
use futures::future::{select, Either};

/// Handle to a task spawned on runtime `R`, with cooperative cancellation.
///
/// ```rust
/// use flowgate_core::GateTask;
/// use flowgate_runtime::impls::tokio::TokioRuntime;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let alarm = GateTask::after::<TokioRuntime, _>(Duration::from_millis(100), || {
///     println!("never printed");
/// });
///
/// // Dropping the handle cancels the alarm before it fires
/// drop(alarm);
/// # }
/// ```
#[derive(Debug)]
pub struct GateTask {
    cancel: CancellationToken,
}

impl GateTask {
    /// Spawns `f(token)` on `R`. The token is cancelled when this handle is
    /// dropped or [`cancel`](Self::cancel)led.
    pub fn spawn<R, F, Fut>(f: F) -> Self
    where
        R: Runtime,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        R::spawn(f(cancel.clone()));
        Self { cancel }
    }

    /// Runs `callback` once `duration` has elapsed, unless cancelled first.
    pub fn after<R, F>(duration: Duration, callback: F) -> Self
    where
        R: Runtime,
        F: FnOnce() + Send + 'static,
    {
        // Deadline counts from scheduling, not from the task's first poll
        let sleep = R::timer().sleep_future(duration);
        Self::spawn::<R, _, _>(move |cancel| async move {
            let cancelled = cancel.cancelled();
            futures::pin_mut!(sleep, cancelled);

            if let Either::Left(_) = select(sleep, cancelled).await {
                if !cancel.is_cancelled() {
                    callback();
                }
            }
        })
    }

    /// Signals the task to stop. It stops at its next cancellation checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for GateTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

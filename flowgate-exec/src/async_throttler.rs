// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::concurrency_mode::ConcurrencyMode;
use crate::concurrent_async_throttler::ConcurrentAsyncThrottler;
use core::fmt;
use core::future::Future;
use core::time::Duration;
use flowgate_core::{CallHandle, GateOptions};
use flowgate_runtime::runtime::Runtime;
use flowgate_runtime::DefaultRuntime;

const KIND: &str = "async-throttler";

/// Async mutual-exclusion gate.
///
/// Only one thunk runs at a time. A call made while the gate is locked
/// resolves to `Cancelled(Dropped)` without running. The lock is released
/// when the thunk finishes, fails or panics, or when the maximum hold time
/// (15 s unless configured) elapses first. In that last case the thunk's
/// value arrives as [`Outcome::Late`](flowgate_core::Outcome::Late).
///
/// ```rust
/// use flowgate_exec::AsyncThrottler;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let submit = AsyncThrottler::new().with_max_duration(Duration::from_secs(5));
///
/// let saved = submit.call(|| async { Ok::<_, std::io::Error>("saved") });
/// let double_click = submit.call(|| async { Ok::<_, std::io::Error>("saved twice") });
///
/// assert!(double_click.await.unwrap().is_cancelled());
/// assert_eq!(saved.await.unwrap().into_value(), Some("saved"));
/// # }
/// ```
pub struct AsyncThrottler<T, E, R: Runtime = DefaultRuntime> {
    gate: ConcurrentAsyncThrottler<T, E, R>,
}

impl<T, E> AsyncThrottler<T, E, DefaultRuntime>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new() -> Self {
        Self::with_runtime(GateOptions::default())
    }

    pub fn with_options(options: GateOptions) -> Self {
        Self::with_runtime(options)
    }
}

impl<T, E> Default for AsyncThrottler<T, E, DefaultRuntime>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E, R> AsyncThrottler<T, E, R>
where
    T: Send + 'static,
    E: Send + 'static,
    R: Runtime,
{
    pub fn with_runtime(mut options: GateOptions) -> Self {
        options.name.get_or_insert_with(|| KIND.to_string());
        Self {
            gate: ConcurrentAsyncThrottler::with_runtime(ConcurrencyMode::Drop, options),
        }
    }

    #[must_use]
    pub fn with_max_duration(self, max_duration: Duration) -> Self {
        Self {
            gate: self.gate.with_max_duration(max_duration),
        }
    }

    #[must_use]
    pub fn without_timeout(self) -> Self {
        Self {
            gate: self.gate.without_timeout(),
        }
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.gate.max_duration()
    }

    pub fn call<F, Fut>(&self, thunk: F) -> CallHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.gate.call(thunk)
    }

    /// Like [`call`](Self::call), but with `enabled == false` the thunk runs
    /// right away without checking or taking the lock.
    pub fn call_with_enabled<F, Fut>(&self, enabled: bool, thunk: F) -> CallHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if enabled {
            self.gate.call(thunk)
        } else {
            self.gate.call_unguarded(thunk)
        }
    }

    pub fn wrap<F, Fut>(&self, thunk: F) -> impl Fn() + Send + Sync + 'static
    where
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.gate.wrap(thunk)
    }

    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }

    /// Force-unlocks the gate. A running thunk still delivers its result.
    pub fn reset(&self) {
        self.gate.reset();
    }

    /// Resolves a running call to `Cancelled(Disposed)` and rejects every later one.
    pub fn dispose(&self) {
        self.gate.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.gate.is_disposed()
    }
}

impl<T, E, R: Runtime> Clone for AsyncThrottler<T, E, R> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
        }
    }
}

impl<T, E, R: Runtime> fmt::Debug for AsyncThrottler<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AsyncThrottler").field(&self.gate).finish()
    }
}

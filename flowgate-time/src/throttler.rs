// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;
use core::time::Duration;
use flowgate_core::{debug, error, GateConfig, GateOptions};
use flowgate_runtime::runtime::{InstantOf, Runtime};
use flowgate_runtime::timer::Timer;
use flowgate_runtime::DefaultRuntime;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

const KIND: &str = "throttler";

/// Leading-edge time-window gate.
///
/// The first call runs synchronously and opens a cooldown window; every call
/// made while the window is open is ignored (no queueing, no error). Once the
/// window has elapsed the next call runs again.
///
/// - When a call arrives and the gate is open:
///   - Run the action immediately
///   - Start the cooldown window
/// - When a call arrives during the window:
///   - Ignore it and return `None`
///
/// Clones share the same window, so one `Throttler` can guard several
/// callback slots.
pub struct Throttler<R: Runtime = DefaultRuntime> {
    inner: Arc<Inner<R>>,
}

struct Inner<R: Runtime> {
    duration: Duration,
    options: GateOptions,
    timer: R::Timer,
    state: Mutex<State<InstantOf<R>>>,
}

#[derive(Debug)]
struct State<I> {
    throttled_until: Option<I>,
    disposed: bool,
}

impl Throttler<DefaultRuntime> {
    pub fn new(duration: Duration) -> Self {
        Self::with_runtime(duration, GateOptions::default())
    }

    pub fn with_options(duration: Duration, options: GateOptions) -> Self {
        Self::with_runtime(duration, options)
    }
}

impl Default for Throttler<DefaultRuntime> {
    fn default() -> Self {
        Self::new(GateConfig::global().throttle_duration)
    }
}

impl<R: Runtime> Throttler<R> {
    /// Creates a throttler driven by runtime `R`.
    pub fn with_runtime(duration: Duration, options: GateOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                duration,
                options,
                timer: R::timer(),
                state: Mutex::new(State {
                    throttled_until: None,
                    disposed: false,
                }),
            }),
        }
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    /// Runs `action` unless the gate is throttled.
    ///
    /// Returns the action's output, or `None` when the call was ignored.
    pub fn call<F, O>(&self, action: F) -> Option<O>
    where
        F: FnOnce() -> O,
    {
        self.call_with_duration(self.inner.duration, action)
    }

    /// Like [`call`](Self::call), with a cooldown window of `duration` for this call.
    pub fn call_with_duration<F, O>(&self, duration: Duration, action: F) -> Option<O>
    where
        F: FnOnce() -> O,
    {
        if !self.admit(duration) {
            return None;
        }
        Some(self.execute(action))
    }

    /// Runs a fallible `action` unless the gate is throttled.
    ///
    /// The action's error is returned to the caller. With
    /// [`reset_on_error`](GateOptions::reset_on_error) the window is cleared
    /// first, so the failed attempt does not block the next call. A panicking
    /// action is treated the same way before the panic propagates.
    pub fn try_call<F, O, E>(&self, action: F) -> Result<Option<O>, E>
    where
        F: FnOnce() -> Result<O, E>,
    {
        self.try_call_with_duration(self.inner.duration, action)
    }

    pub fn try_call_with_duration<F, O, E>(
        &self,
        duration: Duration,
        action: F,
    ) -> Result<Option<O>, E>
    where
        F: FnOnce() -> Result<O, E>,
    {
        if !self.admit(duration) {
            return Ok(None);
        }

        match self.execute(action) {
            Ok(output) => Ok(Some(output)),
            Err(error) => {
                self.on_failure();
                Err(error)
            }
        }
    }

    /// Returns a callback that routes every invocation through this throttler.
    pub fn wrap<F>(&self, action: F) -> impl Fn() + Send + Sync + 'static
    where
        F: Fn() + Send + Sync + 'static,
    {
        let throttler = self.clone();
        move || {
            throttler.call(&action);
        }
    }

    pub fn is_throttled(&self) -> bool {
        let now = self.inner.timer.now();
        self.inner
            .state
            .lock()
            .throttled_until
            .is_some_and(|until| now < until)
    }

    /// Closes the cooldown window; the next call runs.
    pub fn reset(&self) {
        self.inner.state.lock().throttled_until = None;
    }

    /// Makes the throttler inert. Every later call is ignored. Idempotent.
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        state.disposed = true;
        state.throttled_until = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    /// Runs an admitted action. A panic counts as a failure and is resumed
    /// once the window has been handled.
    fn execute<F, O>(&self, action: F) -> O
    where
        F: FnOnce() -> O,
    {
        let started = self.inner.timer.now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(action));
        self.inner
            .options
            .report(self.inner.timer.elapsed_since(started), true);

        match outcome {
            Ok(output) => output,
            Err(payload) => {
                error!("[{}] action panicked", self.label());
                self.on_failure();
                panic::resume_unwind(payload)
            }
        }
    }

    fn on_failure(&self) {
        if self.inner.options.reset_on_error {
            self.reset();
            if self.inner.options.debug_enabled() {
                debug!("[{}] action failed, throttle window cleared", self.label());
            }
        }
    }

    fn admit(&self, duration: Duration) -> bool {
        let now = self.inner.timer.now();
        let admitted = {
            let mut state = self.inner.state.lock();
            if state.disposed || state.throttled_until.is_some_and(|until| now < until) {
                false
            } else {
                // A zero window never throttles
                state.throttled_until = (!duration.is_zero()).then(|| now + duration);
                true
            }
        };

        if !admitted {
            self.inner.options.report(Duration::ZERO, false);
            if self.inner.options.debug_enabled() {
                debug!("[{}] call ignored", self.label());
            }
        }
        admitted
    }

    fn label(&self) -> &str {
        self.inner.options.label(KIND)
    }
}

impl<R: Runtime> Clone for Throttler<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Throttler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttler")
            .field("name", &self.label())
            .field("duration", &self.inner.duration)
            .field("throttled", &self.is_throttled())
            .finish()
    }
}

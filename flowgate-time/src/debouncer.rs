// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;
use core::time::Duration;
use flowgate_core::{debug, error, warn, GateConfig, GateOptions, GateTask, Ticket, TicketCounter};
use flowgate_runtime::runtime::Runtime;
use flowgate_runtime::timer::Timer;
use flowgate_runtime::DefaultRuntime;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

const KIND: &str = "debouncer";

type Action = Box<dyn FnOnce() -> Result<(), String> + Send>;

/// Trailing-edge delay gate.
///
/// Every call (re)starts the timer; only the action of the last call made
/// before the timer fires is run:
/// - When a call arrives, start or restart the timer and replace the pending action
/// - When the timer expires, run the pending action
///
/// Actions run on the runtime's timer task, so there is no caller left to
/// receive an error. Errors from [`try_call`](Self::try_call) actions are
/// swallowed and only logged when debug logging is on. A panicking action is
/// logged and treated as a failure.
///
/// Requires a running runtime `R` (Tokio by default) when a call is scheduled.
/// Dropping the last handle cancels the pending action.
pub struct Debouncer<R: Runtime = DefaultRuntime> {
    inner: Arc<Inner<R>>,
}

struct Inner<R: Runtime> {
    duration: Duration,
    options: GateOptions,
    timer: R::Timer,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    tickets: TicketCounter,
    pending: Option<Pending>,
    disposed: bool,
}

struct Pending {
    action: Action,
    // Dropping the alarm cancels it
    _alarm: GateTask,
}

impl Debouncer<DefaultRuntime> {
    pub fn new(duration: Duration) -> Self {
        Self::with_runtime(duration, GateOptions::default())
    }

    pub fn with_options(duration: Duration, options: GateOptions) -> Self {
        Self::with_runtime(duration, options)
    }
}

impl Default for Debouncer<DefaultRuntime> {
    fn default() -> Self {
        Self::new(GateConfig::global().debounce_duration)
    }
}

impl<R: Runtime> Debouncer<R> {
    pub fn with_runtime(duration: Duration, options: GateOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                duration,
                options,
                timer: R::timer(),
                state: Mutex::new(State::default()),
            }),
        }
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    /// Schedules `action`, replacing any pending one.
    pub fn call<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.call_with_duration(self.inner.duration, action);
    }

    /// Like [`call`](Self::call), waiting `duration` instead of the configured quiet period.
    pub fn call_with_duration<F>(&self, duration: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule(
            duration,
            Box::new(move || {
                action();
                Ok(())
            }),
        );
    }

    /// Schedules a fallible `action`. Its error is logged, never propagated.
    pub fn try_call<F, E>(&self, action: F)
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: fmt::Display,
    {
        self.try_call_with_duration(self.inner.duration, action);
    }

    /// Like [`try_call`](Self::try_call), waiting `duration` instead of the configured quiet period.
    pub fn try_call_with_duration<F, E>(&self, duration: Duration, action: F)
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: fmt::Display,
    {
        self.schedule(
            duration,
            Box::new(move || action().map_err(|error| error.to_string())),
        );
    }

    /// Discards any pending action and runs `action` right now.
    ///
    /// Returns `None` without running anything once disposed.
    pub fn flush<F, O>(&self, action: F) -> Option<O>
    where
        F: FnOnce() -> O,
    {
        {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return None;
            }
            state.tickets.retire();
            state.pending = None;
        }

        let started = self.inner.timer.now();
        let output = action();
        self.inner
            .options
            .report(self.inner.timer.elapsed_since(started), true);
        Some(output)
    }

    /// Runs the pending action now instead of waiting for the timer.
    ///
    /// Returns `false` when nothing was pending.
    pub fn flush_pending(&self) -> bool {
        let pending = {
            let mut state = self.inner.state.lock();
            state.tickets.retire();
            state.pending.take()
        };

        match pending {
            Some(pending) => {
                self.inner.execute(pending.action);
                true
            }
            None => false,
        }
    }

    /// Discards the pending action without running it.
    pub fn cancel(&self) {
        let mut state = self.inner.state.lock();
        state.tickets.retire();
        state.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Cancels the pending action and makes the debouncer inert. Idempotent.
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        state.disposed = true;
        state.tickets.retire();
        state.pending = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    /// Returns a callback that debounces every invocation of `action`.
    pub fn wrap<F>(&self, action: F) -> impl Fn() + Send + Sync + 'static
    where
        F: Fn() + Clone + Send + Sync + 'static,
    {
        let debouncer = self.clone();
        move || debouncer.call(action.clone())
    }

    fn schedule(&self, duration: Duration, action: Action) {
        let superseded = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }

            let ticket = state.tickets.issue();
            let weak = Arc::downgrade(&self.inner);
            let alarm = GateTask::after::<R, _>(duration, move || Inner::<R>::fire(&weak, ticket));

            state
                .pending
                .replace(Pending {
                    action,
                    _alarm: alarm,
                })
                .is_some()
        };

        if superseded {
            self.inner.options.report(Duration::ZERO, false);
            if self.inner.options.debug_enabled() {
                debug!("[{}] pending call replaced", self.inner.options.label(KIND));
            }
        }
    }
}

impl<R: Runtime> Inner<R> {
    fn fire(weak: &Weak<Self>, ticket: Ticket) {
        let Some(inner) = weak.upgrade() else {
            return;
        };

        let pending = {
            let mut state = inner.state.lock();
            if state.tickets.is_current(ticket) {
                state.pending.take()
            } else {
                None
            }
        };

        if let Some(pending) = pending {
            inner.execute(pending.action);
        }
    }

    /// Runs a fired action. Errors and panics are logged and swallowed.
    fn execute(&self, action: Action) {
        let started = self.timer.now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(action));
        self.options
            .report(self.timer.elapsed_since(started), true);

        let failed = match outcome {
            Ok(Ok(())) => false,
            Ok(Err(message)) => {
                if self.options.debug_enabled() {
                    warn!("[{}] debounced action failed: {}", self.options.label(KIND), message);
                }
                true
            }
            Err(_) => {
                error!("[{}] debounced action panicked", self.options.label(KIND));
                true
            }
        };

        if failed && self.options.reset_on_error {
            let mut state = self.state.lock();
            state.tickets.retire();
            state.pending = None;
        }
    }
}

impl<R: Runtime> Clone for Debouncer<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Debouncer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("name", &self.inner.options.label(KIND))
            .field("duration", &self.inner.duration)
            .field("pending", &self.is_pending())
            .finish()
    }
}

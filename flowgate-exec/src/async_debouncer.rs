// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::thunk::{boxed, guarded, Thunk};
use core::fmt;
use core::future::Future;
use core::time::Duration;
use flowgate_core::{
    completion_pair, debug, CallHandle, CancelReason, Completion, GateConfig, GateError,
    GateOptions, GateTask, Ticket, TicketCounter,
};
use flowgate_runtime::runtime::Runtime;
use flowgate_runtime::timer::Timer;
use flowgate_runtime::DefaultRuntime;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

const KIND: &str = "async-debouncer";

/// Debounce gate for async thunks: of a burst of calls, only the last one runs.
///
/// Each [`run`](Self::run) issues a new ticket and restarts the quiet period.
/// When the quiet period elapses, the thunk of the current ticket starts.
///
/// - A call still waiting out its quiet period resolves to
///   `Cancelled(Superseded)` as soon as a newer call arrives.
/// - A call whose thunk is already running cannot be stopped. When it finishes
///   its result is delivered only if no newer call was made meanwhile;
///   otherwise it resolves to `Cancelled(Superseded)`.
/// - Thunk errors reach the caller whose ticket is still current, as
///   [`GateError::Operation`].
///
/// ```rust
/// use flowgate_exec::AsyncDebouncer;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let search = AsyncDebouncer::new(Duration::from_millis(10));
///
/// let stale = search.run(|| async { Ok::<_, std::io::Error>("a") });
/// let fresh = search.run(|| async { Ok::<_, std::io::Error>("ab") });
///
/// assert!(stale.await.unwrap().is_cancelled());
/// assert_eq!(fresh.await.unwrap().into_value(), Some("ab"));
/// # }
/// ```
pub struct AsyncDebouncer<T, E, R: Runtime = DefaultRuntime> {
    inner: Arc<Inner<T, E, R>>,
}

struct Inner<T, E, R: Runtime> {
    duration: Duration,
    options: GateOptions,
    timer: R::Timer,
    state: Mutex<State<T, E>>,
}

struct State<T, E> {
    tickets: TicketCounter,
    waiting: Option<Waiting<T, E>>,
    running: HashMap<Ticket, Running<T, E>>,
    disposed: bool,
}

struct Waiting<T, E> {
    ticket: Ticket,
    thunk: Thunk<T, E>,
    completion: Completion<T, E>,
    // Dropping the alarm cancels it
    _alarm: GateTask,
}

struct Running<T, E> {
    completion: Completion<T, E>,
    // Set by `cancel`: resolve with this instead of the result
    discarded: Option<CancelReason>,
}

impl<T, E> AsyncDebouncer<T, E, DefaultRuntime>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(duration: Duration) -> Self {
        Self::with_runtime(duration, GateOptions::default())
    }

    pub fn with_options(duration: Duration, options: GateOptions) -> Self {
        Self::with_runtime(duration, options)
    }
}

impl<T, E> Default for AsyncDebouncer<T, E, DefaultRuntime>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new(GateConfig::global().async_debounce_duration)
    }
}

impl<T, E, R> AsyncDebouncer<T, E, R>
where
    T: Send + 'static,
    E: Send + 'static,
    R: Runtime,
{
    pub fn with_runtime(duration: Duration, options: GateOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                duration,
                options,
                timer: R::timer(),
                state: Mutex::new(State {
                    tickets: TicketCounter::new(),
                    waiting: None,
                    running: HashMap::new(),
                    disposed: false,
                }),
            }),
        }
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    /// Schedules `thunk` to start after the quiet period, superseding any
    /// earlier call.
    pub fn run<F, Fut>(&self, thunk: F) -> CallHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (completion, handle) = completion_pair();

        let superseded = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                drop(state);
                self.inner.options.report(Duration::ZERO, false);
                return CallHandle::cancelled(CancelReason::Disposed);
            }

            let ticket = state.tickets.issue();
            let weak = Arc::downgrade(&self.inner);
            let alarm = GateTask::after::<R, _>(self.inner.duration, move || {
                Inner::<T, E, R>::fire(&weak, ticket);
            });

            state.waiting.replace(Waiting {
                ticket,
                thunk: boxed(thunk),
                completion,
                _alarm: alarm,
            })
        };

        if let Some(waiting) = superseded {
            self.inner.options.report(Duration::ZERO, false);
            if self.inner.options.debug_enabled() {
                debug!("[{}] waiting call superseded", self.label());
            }
            waiting.completion.cancel(CancelReason::Superseded);
        }

        handle
    }

    /// Discards the waiting call and the result of any running one; both
    /// resolve to `Cancelled(Reset)`.
    pub fn cancel(&self) {
        let waiting = {
            let mut state = self.inner.state.lock();
            state.tickets.retire();
            for running in state.running.values_mut() {
                running.discarded.get_or_insert(CancelReason::Reset);
            }
            state.waiting.take()
        };

        if let Some(waiting) = waiting {
            waiting.completion.cancel(CancelReason::Reset);
        }
    }

    /// `true` while a call is waiting out its quiet period.
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().waiting.is_some()
    }

    /// `true` while at least one thunk is running, current or superseded.
    pub fn is_running(&self) -> bool {
        !self.inner.state.lock().running.is_empty()
    }

    /// Resolves every outstanding call, running ones included, to
    /// `Cancelled(Disposed)` and rejects every later call. Idempotent.
    pub fn dispose(&self) {
        let abandoned: Vec<_> = {
            let mut state = self.inner.state.lock();
            state.disposed = true;
            state.tickets.retire();
            state
                .waiting
                .take()
                .map(|waiting| waiting.completion)
                .into_iter()
                .chain(state.running.drain().map(|(_, running)| running.completion))
                .collect()
        };

        for completion in abandoned {
            completion.cancel(CancelReason::Disposed);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    fn label(&self) -> &str {
        self.inner.options.label(KIND)
    }
}

impl<T, E, R> Inner<T, E, R>
where
    T: Send + 'static,
    E: Send + 'static,
    R: Runtime,
{
    /// Quiet period of `ticket` elapsed.
    fn fire(weak: &Weak<Self>, ticket: Ticket) {
        let Some(inner) = weak.upgrade() else {
            return;
        };

        let thunk = {
            let mut state = inner.state.lock();
            // A call made in the same tick as the alarm already took over
            let is_ours = state
                .waiting
                .as_ref()
                .is_some_and(|waiting| waiting.ticket == ticket);
            if !is_ours || !state.tickets.is_current(ticket) {
                return;
            }
            let Some(waiting) = state.waiting.take() else {
                return;
            };
            state.running.insert(
                ticket,
                Running {
                    completion: waiting.completion,
                    discarded: None,
                },
            );
            waiting.thunk
        };

        let started = inner.timer.now();
        let future = guarded(thunk, inner.options.label(KIND));
        let driver = inner.clone();
        R::spawn(async move {
            let result = future.await;
            let elapsed = driver.timer.elapsed_since(started);
            driver.finish(ticket, result, elapsed);
        });
    }

    fn finish(&self, ticket: Ticket, result: Result<T, GateError<E>>, elapsed: Duration) {
        let (running, current, reset) = {
            let mut state = self.state.lock();
            let running = state.running.remove(&ticket);
            let current = state.tickets.is_current(ticket);

            // A current call has nothing newer waiting behind it. A stale
            // call's failure never touches the state of the newer call.
            let reset = current && result.is_err() && self.options.reset_on_error;
            if reset {
                state.tickets.retire();
            }
            (running, current, reset)
        };

        self.options.report(elapsed, true);
        if reset && self.options.debug_enabled() {
            debug!("[{}] call failed, debouncer reset", self.options.label(KIND));
        }

        if let Some(Running {
            completion,
            discarded,
        }) = running
        {
            match discarded {
                Some(reason) => completion.cancel(reason),
                None if current => match result {
                    Ok(value) => completion.complete(value),
                    Err(error) => completion.fail(error),
                },
                None => {
                    if self.options.debug_enabled() {
                        debug!("[{}] result of superseded call discarded", self.options.label(KIND));
                    }
                    completion.cancel(CancelReason::Superseded);
                }
            }
        }
    }
}

impl<T, E, R: Runtime> Clone for AsyncDebouncer<T, E, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E, R: Runtime> fmt::Debug for AsyncDebouncer<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AsyncDebouncer")
            .field("name", &self.inner.options.label(KIND))
            .field("duration", &self.inner.duration)
            .field("waiting", &state.waiting.is_some())
            .field("running", &state.running.len())
            .finish()
    }
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-at-a-time scheduler for async thunks with a selectable [`ConcurrencyMode`].
//!
//! # Lifecycle of a call
//!
//! - The gate is idle: the call is *dispatched* at once. It becomes the
//!   authoritative execution and the gate turns busy.
//! - The gate is busy: the mode decides.
//!   - `Drop`: the call resolves to `Cancelled(Dropped)`
//!   - `Enqueue`: the call waits in a FIFO queue
//!   - `Replace`: the running call resolves to `Cancelled(Superseded)` and the
//!     new call is dispatched at once
//!   - `KeepLatest`: the call takes the single waiting slot; a call already in
//!     the slot resolves to `Cancelled(Superseded)`
//! - When the authoritative execution finishes (value, error or panic), its
//!   caller gets the result and the next queued / latest call is dispatched.
//!   An error never stalls the queue unless
//!   [`reset_on_error`](flowgate_core::GateOptions::reset_on_error) is set.
//!
//! # Maximum hold time
//!
//! A running thunk holds the gate for at most the configured maximum hold time.
//! When it runs longer, the gate releases itself and moves on to the next call.
//! The thunk keeps running; its caller later receives
//! [`Outcome::Late`](flowgate_core::Outcome::Late) instead of `Completed`.
//!
//! # Epochs
//!
//! Every dispatch and every reset starts a new epoch. A finishing execution or
//! a firing timeout only touches the scheduling state when its epoch is still
//! the current one, so stale completions can never release a newer execution's
//! hold.

use crate::concurrency_mode::ConcurrencyMode;
use crate::thunk::{boxed, guarded, Thunk};
use core::fmt;
use core::future::Future;
use core::time::Duration;
use flowgate_core::{
    completion_pair, debug, CallHandle, CancelReason, Completion, GateConfig, GateError,
    GateOptions, GateTask, Outcome,
};
use flowgate_runtime::runtime::Runtime;
use flowgate_runtime::timer::Timer;
use flowgate_runtime::DefaultRuntime;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

const KIND: &str = "concurrent-throttler";

/// Async gate running one thunk at a time.
///
/// ```rust
/// use flowgate_exec::{ConcurrencyMode, ConcurrentAsyncThrottler};
///
/// # #[tokio::main]
/// # async fn main() {
/// let gate = ConcurrentAsyncThrottler::new(ConcurrencyMode::Enqueue);
///
/// let first = gate.call(|| async { Ok::<_, std::io::Error>(1) });
/// let second = gate.call(|| async { Ok::<_, std::io::Error>(2) });
///
/// assert_eq!(first.await.unwrap().into_value(), Some(1));
/// assert_eq!(second.await.unwrap().into_value(), Some(2));
/// # }
/// ```
pub struct ConcurrentAsyncThrottler<T, E, R: Runtime = DefaultRuntime> {
    inner: Arc<Inner<T, E, R>>,
}

struct Inner<T, E, R: Runtime> {
    mode: ConcurrencyMode,
    options: GateOptions,
    timer: R::Timer,
    state: Mutex<State<T, E>>,
}

struct State<T, E> {
    busy: bool,
    epoch: u64,
    max_duration: Option<Duration>,
    queue: VecDeque<Job<T, E>>,
    latest: Option<Job<T, E>>,
    in_flight: HashMap<u64, InFlight<T, E>>,
    timeout: Option<GateTask>,
    disposed: bool,
}

struct Job<T, E> {
    thunk: Thunk<T, E>,
    completion: Completion<T, E>,
}

struct InFlight<T, E> {
    completion: Completion<T, E>,
    late: bool,
}

/// A job that owns the gate and still has to be started outside the lock.
struct Dispatched<T, E> {
    epoch: u64,
    thunk: Thunk<T, E>,
}

impl<T, E> ConcurrentAsyncThrottler<T, E, DefaultRuntime>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(mode: ConcurrencyMode) -> Self {
        Self::with_runtime(mode, GateOptions::default())
    }

    pub fn with_options(mode: ConcurrencyMode, options: GateOptions) -> Self {
        Self::with_runtime(mode, options)
    }
}

impl<T, E> Default for ConcurrentAsyncThrottler<T, E, DefaultRuntime>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new(ConcurrencyMode::default())
    }
}

impl<T, E, R> ConcurrentAsyncThrottler<T, E, R>
where
    T: Send + 'static,
    E: Send + 'static,
    R: Runtime,
{
    /// Creates a gate driven by runtime `R`, with the global maximum hold time.
    pub fn with_runtime(mode: ConcurrencyMode, options: GateOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                mode,
                options,
                timer: R::timer(),
                state: Mutex::new(State {
                    busy: false,
                    epoch: 0,
                    max_duration: GateConfig::global().max_hold_duration,
                    queue: VecDeque::new(),
                    latest: None,
                    in_flight: HashMap::new(),
                    timeout: None,
                    disposed: false,
                }),
            }),
        }
    }

    /// Sets the maximum time a thunk may hold the gate. Applies from the next dispatch.
    #[must_use]
    pub fn with_max_duration(self, max_duration: Duration) -> Self {
        self.inner.state.lock().max_duration = Some(max_duration);
        self
    }

    /// Lets a thunk hold the gate for as long as it runs.
    #[must_use]
    pub fn without_timeout(self) -> Self {
        self.inner.state.lock().max_duration = None;
        self
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.inner.mode
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.inner.state.lock().max_duration
    }

    /// Submits `thunk`. What happens to it depends on the gate's mode and on
    /// whether another thunk is running.
    pub fn call<F, Fut>(&self, thunk: F) -> CallHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (completion, handle) = completion_pair();
        self.inner.submit(Job {
            thunk: boxed(thunk),
            completion,
        });
        handle
    }

    /// Runs `thunk` without taking the gate: no lock, no queue, no timeout.
    /// Only disposal still rejects it.
    pub(crate) fn call_unguarded<F, Fut>(&self, thunk: F) -> CallHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if self.is_disposed() {
            self.inner.options.report(Duration::ZERO, false);
            return CallHandle::cancelled(CancelReason::Disposed);
        }

        let (completion, handle) = completion_pair();
        let inner = self.inner.clone();
        let started = inner.timer.now();
        let future = guarded(boxed(thunk), self.label());

        R::spawn(async move {
            let result = future.await;
            inner.options.report(inner.timer.elapsed_since(started), true);
            match result {
                Ok(value) => completion.complete(value),
                Err(error) => completion.fail(error),
            }
        });
        handle
    }

    /// Returns a callback that submits `thunk` on every invocation and
    /// ignores the outcome.
    pub fn wrap<F, Fut>(&self, thunk: F) -> impl Fn() + Send + Sync + 'static
    where
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let gate = self.clone();
        move || {
            let _ = gate.call(thunk.clone());
        }
    }

    /// `true` while a thunk holds the gate.
    pub fn is_locked(&self) -> bool {
        self.inner.state.lock().busy
    }

    /// Number of calls waiting in the `Enqueue` queue.
    pub fn queue_size(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Calls whose result will still be delivered to their caller: the
    /// authoritative execution plus queued or latest-slot calls.
    ///
    /// Superseded executions are not counted, even while they keep running.
    pub fn pending_count(&self) -> usize {
        let state = self.inner.state.lock();
        usize::from(state.busy) + state.queue.len() + usize::from(state.latest.is_some())
    }

    pub fn has_pending_calls(&self) -> bool {
        self.pending_count() > 0
    }

    /// Releases the gate and abandons every queued / latest call with
    /// `Cancelled(Reset)`. A running thunk still delivers its own result.
    pub fn reset(&self) {
        let abandoned = self.inner.state.lock().release();
        if self.inner.options.debug_enabled() && !abandoned.is_empty() {
            debug!("[{}] reset abandoned {} call(s)", self.label(), abandoned.len());
        }
        for completion in abandoned {
            self.inner.options.report(Duration::ZERO, false);
            completion.cancel(CancelReason::Reset);
        }
    }

    /// Tears the gate down: every outstanding call, running ones included,
    /// resolves to `Cancelled(Disposed)`, and every later call does too.
    /// Idempotent.
    pub fn dispose(&self) {
        let (waiting, running) = {
            let mut state = self.inner.state.lock();
            state.disposed = true;
            let waiting = state.release();
            let running: Vec<_> = state.in_flight.drain().map(|(_, entry)| entry.completion).collect();
            (waiting, running)
        };
        // Running thunks report when they finish
        for completion in waiting {
            self.inner.options.report(Duration::ZERO, false);
            completion.cancel(CancelReason::Disposed);
        }
        for completion in running {
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
    fn submit(self: &Arc<Self>, job: Job<T, E>) {
        let mut rejected = None;
        let mut superseded = None;

        let dispatched = {
            let mut state = self.state.lock();
            if state.disposed {
                rejected = Some((job.completion, CancelReason::Disposed));
                None
            } else if !state.busy {
                Some(self.dispatch(&mut state, job))
            } else {
                match self.mode {
                    ConcurrencyMode::Drop => {
                        rejected = Some((job.completion, CancelReason::Dropped));
                        None
                    }
                    ConcurrencyMode::Enqueue => {
                        state.queue.push_back(job);
                        None
                    }
                    ConcurrencyMode::Replace => {
                        let epoch = state.epoch;
                        superseded = state.in_flight.remove(&epoch).map(|entry| entry.completion);
                        Some(self.dispatch(&mut state, job))
                    }
                    ConcurrencyMode::KeepLatest => {
                        superseded = state.latest.replace(job).map(|job| job.completion);
                        None
                    }
                }
            }
        };

        if let Some((completion, reason)) = rejected {
            self.options.report(Duration::ZERO, false);
            if self.options.debug_enabled() {
                debug!("[{}] call rejected: {}", self.label(), reason);
            }
            completion.cancel(reason);
        }

        if let Some(completion) = superseded {
            // A superseded latest-slot call never ran; a replaced one is still
            // running and reports when it finishes.
            if self.mode == ConcurrencyMode::KeepLatest {
                self.options.report(Duration::ZERO, false);
            }
            if self.options.debug_enabled() {
                debug!("[{}] call superseded", self.label());
            }
            completion.cancel(CancelReason::Superseded);
        }

        if let Some(dispatched) = dispatched {
            self.launch(dispatched);
        }
    }

    /// Makes `job` the authoritative execution. Must run under the state lock.
    fn dispatch(self: &Arc<Self>, state: &mut State<T, E>, job: Job<T, E>) -> Dispatched<T, E> {
        state.busy = true;
        state.epoch += 1;
        let epoch = state.epoch;

        state.in_flight.insert(
            epoch,
            InFlight {
                completion: job.completion,
                late: false,
            },
        );

        // Replacing the stored alarm cancels the previous execution's timeout
        state.timeout = state.max_duration.map(|max_duration| {
            let weak = Arc::downgrade(self);
            GateTask::after::<R, _>(max_duration, move || Self::expire(&weak, epoch))
        });

        Dispatched {
            epoch,
            thunk: job.thunk,
        }
    }

    /// Starts a dispatched job. Must run outside the state lock: the thunk is
    /// called right here and may submit to this gate again.
    fn launch(self: &Arc<Self>, dispatched: Dispatched<T, E>) {
        let Dispatched { epoch, thunk } = dispatched;
        let started = self.timer.now();
        let future = guarded(thunk, self.label());
        let inner = self.clone();

        R::spawn(async move {
            let result = future.await;
            let elapsed = inner.timer.elapsed_since(started);
            inner.finish(epoch, result, elapsed);
        });
    }

    fn finish(self: &Arc<Self>, epoch: u64, result: Result<T, GateError<E>>, elapsed: Duration) {
        let mut abandoned = Vec::new();

        let (entry, next) = {
            let mut state = self.state.lock();
            let entry = state.in_flight.remove(&epoch);
            let authoritative = state.busy && state.epoch == epoch;

            let next = if !authoritative {
                None
            } else if result.is_err() && self.options.reset_on_error {
                abandoned = state.release();
                None
            } else {
                state.timeout = None;
                self.next_job(&mut state)
            };
            (entry, next)
        };

        self.options.report(elapsed, true);

        if let Some(InFlight { completion, late }) = entry {
            match result {
                Ok(value) if late => completion.resolve(Ok(Outcome::Late(value))),
                Ok(value) => completion.complete(value),
                Err(error) => completion.fail(error),
            }
        }

        if !abandoned.is_empty() && self.options.debug_enabled() {
            debug!("[{}] call failed, abandoned {} call(s)", self.label(), abandoned.len());
        }
        for completion in abandoned {
            self.options.report(Duration::ZERO, false);
            completion.cancel(CancelReason::Reset);
        }

        if let Some(dispatched) = next {
            self.launch(dispatched);
        }
    }

    /// Maximum hold time of execution `epoch` elapsed.
    fn expire(weak: &Weak<Self>, epoch: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };

        let next = {
            let mut state = inner.state.lock();
            if !(state.busy && state.epoch == epoch) {
                return;
            }
            if let Some(entry) = state.in_flight.get_mut(&epoch) {
                entry.late = true;
            }
            state.timeout = None;
            inner.next_job(&mut state)
        };

        if inner.options.debug_enabled() {
            debug!("[{}] maximum hold time elapsed, gate released", inner.label());
        }

        if let Some(dispatched) = next {
            inner.launch(dispatched);
        }
    }

    /// Dispatches the next waiting job, or turns the gate idle.
    fn next_job(self: &Arc<Self>, state: &mut State<T, E>) -> Option<Dispatched<T, E>> {
        let job = match self.mode {
            ConcurrencyMode::Enqueue => state.queue.pop_front(),
            ConcurrencyMode::KeepLatest => state.latest.take(),
            ConcurrencyMode::Drop | ConcurrencyMode::Replace => None,
        };

        match job {
            Some(job) => Some(self.dispatch(state, job)),
            None => {
                state.busy = false;
                None
            }
        }
    }

    fn label(&self) -> &str {
        self.options.label(KIND)
    }
}

impl<T, E> State<T, E> {
    /// Returns the gate to idle and hands back the completions of every
    /// waiting job. Running executions are left to finish on their own.
    fn release(&mut self) -> Vec<Completion<T, E>> {
        self.busy = false;
        self.epoch += 1;
        self.timeout = None;
        self.queue
            .drain(..)
            .chain(self.latest.take())
            .map(|job| job.completion)
            .collect()
    }
}

impl<T, E, R: Runtime> Clone for ConcurrentAsyncThrottler<T, E, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E, R: Runtime> fmt::Debug for ConcurrentAsyncThrottler<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ConcurrentAsyncThrottler")
            .field("name", &self.inner.options.label(KIND))
            .field("mode", &self.inner.mode)
            .field("locked", &state.busy)
            .field("queued", &state.queue.len())
            .field("latest", &state.latest.is_some())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

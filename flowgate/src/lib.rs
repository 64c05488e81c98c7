// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Flowgate
//!
//! Rate-limiting gates for UI callbacks and asynchronous work.
//!
//! ## Overview
//!
//! A *gate* sits between an event source (a button, a text field, a timer)
//! and the work it triggers, and decides whether and when that work runs.
//!
//! | Gate | Runs | Typical use |
//! |---|---|---|
//! | [`Throttler`] | the first call, then nothing for a window | scroll / resize handlers |
//! | [`Debouncer`] | the last call, after a quiet period | autosave |
//! | [`AsyncDebouncer`] | the last async call, stale callers get a cancellation | search-as-you-type |
//! | [`AsyncThrottler`] | one async call at a time, the rest dropped | submit buttons |
//! | [`ConcurrentAsyncThrottler`] | one async call at a time, the rest per [`ConcurrencyMode`] | chat send queues, live previews |
//!
//! Async gates return a [`CallHandle`] per call. It resolves exactly once, to
//! a value, a [`GateError`], or [`Outcome::Cancelled`] with the reason the
//! gate disregarded the call. Cancellation is never an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowgate::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let search = AsyncDebouncer::new(Duration::from_millis(20));
//!
//!     let stale = search.run(|| async { Ok::<_, std::io::Error>(vec!["rust"]) });
//!     let fresh = search.run(|| async { Ok::<_, std::io::Error>(vec!["rust", "rustacean"]) });
//!
//!     assert_eq!(stale.await.unwrap(), Outcome::Cancelled(CancelReason::Superseded));
//!     assert_eq!(fresh.await.unwrap().into_value(), Some(vec!["rust", "rustacean"]));
//! }
//! ```
//!
//! ## Configuration
//!
//! Per gate through [`GateOptions`] (name, debug logging, reset on error,
//! metrics callback); process-wide defaults through [`GateConfig`].
//!
//! ## Runtimes
//!
//! Gates are generic over a [`Runtime`](flowgate_runtime::runtime::Runtime)
//! supplying timers and task spawning. Tokio is the default; enable
//! `runtime-smol` for smol.

pub use flowgate_core::{
    CallHandle, CallResult, CancelReason, GateConfig, GateError, GateOptions, MetricsCallback,
    Outcome,
};
pub use flowgate_exec::{AsyncDebouncer, AsyncThrottler, ConcurrencyMode, ConcurrentAsyncThrottler};
pub use flowgate_runtime::DefaultRuntime;
pub use flowgate_time::{Debouncer, Throttler};

pub use flowgate_runtime as runtime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AsyncDebouncer, AsyncThrottler, CallHandle, CancelReason, ConcurrencyMode,
        ConcurrentAsyncThrottler, Debouncer, GateConfig, GateError, GateOptions, Outcome,
        Throttler,
    };
}

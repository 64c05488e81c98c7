// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Gates for asynchronous work.
//!
//! Every gate takes a *thunk* (a zero-argument closure returning a future of
//! `Result<T, E>`) and hands back a [`CallHandle`](flowgate_core::CallHandle)
//! right away. The thunk is driven by a task on the gate's runtime, so the
//! handle may be dropped without affecting execution.
//!
//! - [`AsyncDebouncer`] - runs only the last thunk of a burst, after a quiet period
//! - [`AsyncThrottler`] - one thunk in flight at a time, others dropped
//! - [`ConcurrentAsyncThrottler`] - one thunk in flight at a time, with a
//!   [`ConcurrencyMode`] deciding what happens to the rest
//!
//! Superseded, dropped and abandoned calls resolve to
//! [`Outcome::Cancelled`](flowgate_core::Outcome::Cancelled), never to an error.

pub mod async_debouncer;
pub mod async_throttler;
pub mod concurrency_mode;
pub mod concurrent_async_throttler;
mod thunk;

pub use async_debouncer::AsyncDebouncer;
pub use async_throttler::AsyncThrottler;
pub use concurrency_mode::ConcurrencyMode;
pub use concurrent_async_throttler::ConcurrentAsyncThrottler;

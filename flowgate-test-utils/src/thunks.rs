// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Async units of work for gate tests. Delays use `tokio::time::sleep`, so they
//! follow the paused test clock.

use crate::helpers::ms;
use crate::recorder::Recorder;
use crate::test_error::TestError;
use futures::future::BoxFuture;
use futures::FutureExt;

pub type TestThunk<T> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, TestError>> + Send>;

/// Returns `value` after `delay_ms`.
pub fn delayed<T>(value: T, delay_ms: u64) -> TestThunk<T>
where
    T: Send + 'static,
{
    Box::new(move || {
        async move {
            tokio::time::sleep(ms(delay_ms)).await;
            Ok::<_, TestError>(value)
        }
        .boxed()
    })
}

/// Fails with `message` after `delay_ms`.
pub fn failing<T>(message: &str, delay_ms: u64) -> TestThunk<T>
where
    T: Send + 'static,
{
    let error = TestError::new(message);
    Box::new(move || {
        async move {
            tokio::time::sleep(ms(delay_ms)).await;
            Err::<T, _>(error)
        }
        .boxed()
    })
}

/// Records `id` as soon as it starts, then returns `id` after `delay_ms`.
pub fn recorded<T>(recorder: &Recorder<T>, id: T, delay_ms: u64) -> TestThunk<T>
where
    T: Clone + Send + 'static,
{
    let recorder = recorder.clone();
    Box::new(move || {
        recorder.record(id.clone());
        async move {
            tokio::time::sleep(ms(delay_ms)).await;
            Ok::<_, TestError>(id)
        }
        .boxed()
    })
}

/// Records `id` as soon as it starts, then fails after `delay_ms`.
pub fn recorded_failing<T>(recorder: &Recorder<T>, id: T, delay_ms: u64) -> TestThunk<T>
where
    T: Clone + Send + 'static,
{
    let recorder = recorder.clone();
    Box::new(move || {
        recorder.record(id);
        async move {
            tokio::time::sleep(ms(delay_ms)).await;
            Err::<T, _>(TestError::new("recorded failure"))
        }
        .boxed()
    })
}

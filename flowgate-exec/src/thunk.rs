// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::any::Any;
use core::future::Future;
use core::panic::AssertUnwindSafe;
use flowgate_core::{error, GateError};
use futures::future::BoxFuture;
use futures::FutureExt;

pub(crate) type Thunk<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send>;

pub(crate) fn boxed<F, Fut, T, E>(thunk: F) -> Thunk<T, E>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::new(move || thunk().boxed())
}

/// Calls `thunk` and returns its future with panics turned into
/// [`GateError::Panicked`]. A panic while building the future counts too.
pub(crate) fn guarded<T, E>(
    thunk: Thunk<T, E>,
    label: &str,
) -> BoxFuture<'static, Result<T, GateError<E>>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let label = label.to_string();
    let future = match std::panic::catch_unwind(AssertUnwindSafe(thunk)) {
        Ok(future) => future,
        Err(payload) => return futures::future::ready(Err(panicked(payload, &label))).boxed(),
    };

    async move {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => result.map_err(GateError::Operation),
            Err(payload) => Err(panicked(payload, &label)),
        }
    }
    .boxed()
}

fn panicked<E>(payload: Box<dyn Any + Send>, label: &str) -> GateError<E> {
    let error = GateError::from_panic(payload);
    if let GateError::Panicked { context } = &error {
        error!("[{}] thunk panicked: {}", label, context);
    }
    error
}

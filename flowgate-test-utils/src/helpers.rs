// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use flowgate_core::{CallHandle, CallResult};
use futures::FutureExt;
use std::fmt::Debug;
use std::time::Duration;
use tokio::task::yield_now;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Lets every task that is ready run, without moving the clock.
///
/// Call it after submitting work and before `tokio::time::advance`, so spawned
/// tasks start at the current virtual instant.
pub async fn settle() {
    for _ in 0..16 {
        yield_now().await;
    }
}

/// Advances the paused clock by `millis`, letting woken tasks run on both sides.
pub async fn advance_ms(millis: u64) {
    settle().await;
    tokio::time::advance(ms(millis)).await;
    settle().await;
}

pub fn assert_pending<T, E>(handle: &mut CallHandle<T, E>)
where
    T: Debug,
    E: Debug,
{
    if let Some(result) = handle.now_or_never() {
        panic!("expected the call to still be pending, it resolved to {result:?}");
    }
}

/// Takes the result of a handle that must already be resolved.
pub fn assert_resolved<T, E>(handle: &mut CallHandle<T, E>) -> CallResult<T, E> {
    match handle.now_or_never() {
        Some(result) => result,
        None => panic!("expected the call to be resolved, it is still pending"),
    }
}

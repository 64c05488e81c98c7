// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::timer::Timer;
use core::fmt::Debug;
use core::future::Future;
use core::ops::{Add, Sub};
use core::time::Duration;

pub trait Runtime: Send + Sync + 'static {
    type Timer: Timer<Instant = Self::Instant>;
    type Instant: Copy
        + Ord
        + Send
        + Sync
        + Debug
        + Add<Duration, Output = Self::Instant>
        + Sub<Self::Instant, Output = Duration>;

    /// Spawns a detached task. The task keeps running when its handle is gone.
    fn spawn<F>(future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    fn timer() -> Self::Timer {
        Self::Timer::default()
    }
}

/// Instant type produced by a runtime's timer.
pub type InstantOf<R> = <<R as Runtime>::Timer as Timer>::Instant;

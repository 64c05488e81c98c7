// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;

/// What a [`ConcurrentAsyncThrottler`](crate::ConcurrentAsyncThrottler) does
/// with a call that arrives while another one is running.
///
/// | Mode | Every call runs | Submission order kept | Newest input wins |
/// |---|---|---|---|
/// | `Drop` | no | no | no |
/// | `Enqueue` | yes | yes | no |
/// | `Replace` | yes | no | yes |
/// | `KeepLatest` | no | no | yes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConcurrencyMode {
    /// Ignore the call; it resolves to `Cancelled(Dropped)`.
    #[default]
    Drop,
    /// Queue the call and run it once everything before it has finished.
    Enqueue,
    /// Start the call right away. The running call keeps executing, but its
    /// result is discarded as `Cancelled(Superseded)`.
    Replace,
    /// Park the call in a single slot, run after the current one. A newer
    /// call overwrites the slot.
    KeepLatest,
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Drop => "drop",
            Self::Enqueue => "enqueue",
            Self::Replace => "replace",
            Self::KeepLatest => "keep-latest",
        };
        f.write_str(name)
    }
}

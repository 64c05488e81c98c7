// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Runtime abstraction used by every flowgate gate.
//!
//! Gates never touch a global clock or executor directly. They ask their
//! [`Runtime`](runtime::Runtime) for a [`Timer`](timer::Timer) (sleep + monotonic
//! `now`) and for a way to spawn detached work. Tests drive the Tokio runtime
//! with its paused virtual clock.
//!
//! Enable one of:
//! - `runtime-tokio` (default) - [`TokioRuntime`](impls::tokio::TokioRuntime)
//! - `runtime-smol` - [`SmolRuntime`](impls::smol::SmolRuntime)

pub mod impls;
pub mod runtime;
pub mod timer;

#[cfg(feature = "runtime-tokio")]
pub type DefaultRuntime = impls::tokio::TokioRuntime;

#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
pub type DefaultRuntime = impls::smol::SmolRuntime;

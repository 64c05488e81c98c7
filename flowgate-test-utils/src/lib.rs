// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for the flowgate workspace.
//!
//! Not meant for production code.
//!
//! - [`Recorder`] - shared, ordered log of what ran
//! - [`thunks`] - ready-made async units of work (delayed, failing, recording)
//! - [`helpers`] - virtual-time helpers for tests running on Tokio's paused clock
//!
//! ```rust
//! use flowgate_test_utils::{thunks, Recorder};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let recorder = Recorder::new();
//! let thunk = thunks::recorded(&recorder, 1, 0);
//!
//! assert_eq!(thunk().await.unwrap(), 1);
//! assert_eq!(recorder.snapshot(), vec![1]);
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod recorder;
pub mod test_error;
pub mod thunks;

pub use helpers::{advance_ms, assert_pending, assert_resolved, ms, settle};
pub use recorder::Recorder;
pub use test_error::TestError;

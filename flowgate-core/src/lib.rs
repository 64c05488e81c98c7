// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Shared vocabulary of the flowgate gates.
//!
//! - [`Outcome`] / [`CancelReason`] - what a submitted call resolved to
//! - [`GateError`] - failure of the caller-supplied work
//! - [`CallHandle`] / [`Completion`] - the two ends of a pending call
//! - [`TicketCounter`] - staleness detection for debounced calls
//! - [`GateTask`] - spawned task / one-shot alarm, cancelled on drop
//! - [`GateOptions`] / [`GateConfig`] - per-gate and process-wide configuration

pub mod cancellation_token;
pub mod completion;
pub mod config;
pub mod error;
pub mod gate_task;
pub mod logging;
pub mod options;
pub mod outcome;
pub mod ticket;

pub use self::cancellation_token::CancellationToken;
pub use self::completion::{completion_pair, CallHandle, Completion};
pub use self::config::GateConfig;
pub use self::error::{CallResult, GateError};
pub use self::gate_task::GateTask;
pub use self::options::{GateOptions, MetricsCallback};
pub use self::outcome::{CancelReason, Outcome};
pub use self::ticket::{Ticket, TicketCounter};

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing as __tracing;

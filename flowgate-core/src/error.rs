// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error type for work submitted to a gate.
//!
//! # Examples
//!
//! ```
//! use flowgate_core::{CallResult, GateError, Outcome};
//!
//! fn describe(result: CallResult<u32, String>) -> String {
//!     match result {
//!         Ok(Outcome::Completed(v)) | Ok(Outcome::Late(v)) => format!("got {v}"),
//!         Ok(Outcome::Cancelled(reason)) => format!("skipped: {reason}"),
//!         Err(GateError::Operation(e)) => format!("failed: {e}"),
//!         Err(GateError::Panicked { context }) => format!("panicked: {context}"),
//!     }
//! }
//!
//! assert_eq!(describe(Ok(Outcome::Completed(3))), "got 3");
//! ```

use crate::outcome::Outcome;
use core::any::Any;

/// Failure of the caller-supplied unit of work.
///
/// Cancellation is never reported here; see [`Outcome::Cancelled`].
#[derive(Debug, thiserror::Error)]
pub enum GateError<E> {
    /// The work returned an error.
    #[error("operation failed: {0}")]
    Operation(E),

    /// The work panicked. The gate recovered and released its state.
    #[error("operation panicked: {context}")]
    Panicked {
        /// Panic message, when it was a string
        context: String,
    },
}

impl<E> GateError<E> {
    /// Builds a [`GateError::Panicked`] from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let context = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked { context }
    }

    /// Returns the caller's error, `None` for panics.
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(error) => Some(error),
            Self::Panicked { .. } => None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

/// What a [`CallHandle`](crate::CallHandle) resolves to.
pub type CallResult<T, E> = Result<Outcome<T>, GateError<E>>;

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Non-error results of a submitted call.
//!
//! A call that the gate decided not to deliver is *not* an error. It resolves to
//! [`Outcome::Cancelled`] with the reason, so "my search query got superseded"
//! never travels through error handling.

use core::fmt;

/// Why a call's result will never be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// A newer submission took over (debounce, replace, keep-latest).
    Superseded,
    /// The gate was busy and drops submissions while busy.
    Dropped,
    /// `reset()` or `cancel()` abandoned the call.
    Reset,
    /// The gate was disposed.
    Disposed,
    /// The resolving side went away without resolving.
    Abandoned,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Superseded => "superseded by a newer call",
            Self::Dropped => "dropped while the gate was busy",
            Self::Reset => "abandoned by reset",
            Self::Disposed => "gate disposed",
            Self::Abandoned => "abandoned without resolution",
        };
        f.write_str(text)
    }
}

/// Resolution of a call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The work ran and its value is authoritative.
    Completed(T),
    /// The work ran, but only finished after the gate's maximum hold time had
    /// already force-released the lock. Other calls may have started meanwhile.
    Late(T),
    /// The gate will disregard this call.
    Cancelled(CancelReason),
}

impl<T> Outcome<T> {
    /// `true` for [`Outcome::Completed`] and [`Outcome::Late`].
    pub fn is_completed(&self) -> bool {
        !self.is_cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    pub fn is_late(&self) -> bool {
        matches!(self, Self::Late(_))
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            Self::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Returns the value of a completed call, `None` when cancelled.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Completed(value) | Self::Late(value) => Some(value),
            Self::Cancelled(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Completed(value) | Self::Late(value) => Some(value),
            Self::Cancelled(_) => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Late(value) => Outcome::Late(f(value)),
            Self::Cancelled(reason) => Outcome::Cancelled(reason),
        }
    }
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The two ends of a pending call.
//!
//! A gate keeps the [`Completion`] and hands the [`CallHandle`] to the caller.
//! Every handle resolves exactly once: either the gate resolves it, or the
//! completion is dropped and the handle reports [`CancelReason::Abandoned`].

use crate::error::{CallResult, GateError};
use crate::outcome::{CancelReason, Outcome};
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::channel::oneshot;
use futures::FutureExt;

/// Creates a connected completion / handle pair.
pub fn completion_pair<T, E>() -> (Completion<T, E>, CallHandle<T, E>) {
    let (sender, receiver) = oneshot::channel();
    (Completion { sender }, CallHandle { receiver })
}

/// Resolving side of a pending call. Consumed on resolution.
pub struct Completion<T, E> {
    sender: oneshot::Sender<CallResult<T, E>>,
}

impl<T, E> Completion<T, E> {
    pub fn resolve(self, result: CallResult<T, E>) {
        // The caller may have dropped its handle; nothing to deliver then.
        let _ = self.sender.send(result);
    }

    pub fn complete(self, value: T) {
        self.resolve(Ok(Outcome::Completed(value)));
    }

    pub fn fail(self, error: GateError<E>) {
        self.resolve(Err(error));
    }

    pub fn cancel(self, reason: CancelReason) {
        self.resolve(Ok(Outcome::Cancelled(reason)));
    }

    /// `true` once the caller has dropped its [`CallHandle`].
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_canceled()
    }
}

impl<T, E> fmt::Debug for Completion<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}

/// Caller side of a pending call.
///
/// Awaiting it yields the call's [`CallResult`]. Dropping it does not stop the
/// work; gates run submitted work independently of the handle.
pub struct CallHandle<T, E> {
    receiver: oneshot::Receiver<CallResult<T, E>>,
}

impl<T, E> CallHandle<T, E> {
    /// A handle that is already resolved.
    pub fn resolved(result: CallResult<T, E>) -> Self {
        let (completion, handle) = completion_pair();
        completion.resolve(result);
        handle
    }

    pub fn cancelled(reason: CancelReason) -> Self {
        Self::resolved(Ok(Outcome::Cancelled(reason)))
    }

    /// Takes the result if it is already available, without waiting.
    ///
    /// Once this returned `Some`, the handle is spent and awaiting it reports
    /// [`CancelReason::Abandoned`].
    pub fn try_take(&mut self) -> Option<CallResult<T, E>> {
        match self.receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::Canceled) => Some(Ok(Outcome::Cancelled(CancelReason::Abandoned))),
        }
    }
}

impl<T, E> Future for CallHandle<T, E> {
    type Output = CallResult<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver.poll_unpin(cx).map(|received| {
            received.unwrap_or(Ok(Outcome::Cancelled(CancelReason::Abandoned)))
        })
    }
}

impl<T, E> fmt::Debug for CallHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallHandle").finish_non_exhaustive()
    }
}

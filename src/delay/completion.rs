use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::FutureExt;
use tokio::sync::oneshot;

use crate::error::DelayError;

pub(crate) type Waiter = oneshot::Sender<Result<(), DelayError>>;

/// Settles once, when the delay's action has run or the run is abandoned.
///
/// Resolves to `Ok(())` after the action fires, or to an error when the run is
/// cancelled or superseded, or to [`DelayError::ActionPanicked`] when the action
/// itself panics. Pausing never settles a completion.
#[must_use = "a completion does nothing unless awaited"]
#[derive(Debug)]
pub struct Completion {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Ready(Option<Result<(), DelayError>>),
    Waiting(oneshot::Receiver<Result<(), DelayError>>),
}

impl Completion {
    pub(crate) fn ready(result: Result<(), DelayError>) -> Self {
        Self {
            inner: Inner::Ready(Some(result)),
        }
    }

    pub(crate) fn channel() -> (Waiter, Self) {
        let (sender, receiver) = oneshot::channel();
        let completion = Self {
            inner: Inner::Waiting(receiver),
        };
        (sender, completion)
    }
}

impl Future for Completion {
    type Output = Result<(), DelayError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Inner::Ready(result) => {
                Poll::Ready(result.take().expect("Completion polled after it settled"))
            }
            // A dropped sender means the delay itself went away mid-run.
            Inner::Waiting(receiver) => receiver
                .poll_unpin(cx)
                .map(|result| result.unwrap_or(Err(DelayError::Cancelled))),
        }
    }
}

/// Settles every waiter of a run with the same outcome.
pub(crate) fn settle(waiters: Vec<Waiter>, result: Result<(), DelayError>) {
    for waiter in waiters {
        // The caller may have dropped its completion.
        let _ = waiter.send(result.clone());
    }
}

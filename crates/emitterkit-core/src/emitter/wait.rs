//! One-shot listeners and future-based waits.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::dispatch::{Emitter, Subscription};
use super::registry::Position;
use crate::delay::{after, Cancel};
use crate::error::{EmitterError, Result};
use crate::listener::Listener;
use crate::name::{Event, Name};

impl Emitter {
    /// Register `listener` to run on the next emission of `event` only
    ///
    /// The registration belongs to an internal wrapper: `off(event, listener)`
    /// and `is_registered(event, listener)` do not see it. Remove it through
    /// the returned [`Subscription`].
    pub fn once<P: 'static>(&self, event: &Event<P>, listener: &Listener<P>) -> Result<Subscription> {
        self.once_if(event, |_| true, listener)
    }

    /// Like [`once`](Self::once), but the listener runs before those already registered
    pub fn prepend_once<P: 'static>(
        &self,
        event: &Event<P>,
        listener: &Listener<P>,
    ) -> Result<Subscription> {
        self.register_once(event, |_| true, listener, Position::Front)
    }

    /// Register `listener` to run once, on the first emission whose payload
    /// satisfies `predicate`
    ///
    /// Non-matching emissions leave the registration in place. As with
    /// [`once`](Self::once), the registration belongs to an internal wrapper,
    /// not to `listener`; only the returned subscription can remove it before
    /// it ever matches.
    pub fn once_if<P, F>(
        &self,
        event: &Event<P>,
        predicate: F,
        listener: &Listener<P>,
    ) -> Result<Subscription>
    where
        P: 'static,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.register_once(event, predicate, listener, Position::Back)
    }

    fn register_once<P, F>(
        &self,
        event: &Event<P>,
        predicate: F,
        listener: &Listener<P>,
        position: Position,
    ) -> Result<Subscription>
    where
        P: 'static,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let fired = Arc::new(AtomicBool::new(false));

        let wrapper = {
            let slot = Arc::clone(&slot);
            let fired = Arc::clone(&fired);
            let target = listener.clone();
            Listener::fallible(move |payload: &P| {
                if fired.load(Ordering::Acquire) || !predicate(payload) {
                    return Ok(());
                }
                if fired.swap(true, Ordering::AcqRel) {
                    return Ok(());
                }
                let subscription = slot.lock().take();
                if let Some(subscription) = subscription {
                    subscription.off();
                }
                target.call(payload)
            })
        };

        let subscription = self.register(event, &wrapper, position)?;
        *slot.lock() = Some(subscription.clone());

        // A `newListener` listener may already have triggered the wrapper
        if fired.load(Ordering::Acquire) {
            let pending = slot.lock().take();
            if let Some(pending) = pending {
                pending.off();
            }
        }
        Ok(subscription)
    }

    /// Wait for the next emission of `event`
    ///
    /// See [`eventually_if`](Self::eventually_if).
    pub fn eventually<P>(&self, event: &Event<P>, timeout: Option<Duration>) -> Eventually<P>
    where
        P: Clone + Send + 'static,
    {
        self.eventually_if(event, |_| true, timeout)
    }

    /// Wait for the first emission of `event` whose payload satisfies
    /// `predicate`
    ///
    /// The listener and the timeout are armed immediately, not on first poll.
    /// Whichever side settles first cancels the other. `None` uses the
    /// emitter's default timeout.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn eventually_if<P, F>(
        &self,
        event: &Event<P>,
        predicate: F,
        timeout: Option<Duration>,
    ) -> Eventually<P>
    where
        P: Clone + Send + 'static,
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        let timeout = timeout.unwrap_or(self.inner.default_timeout);
        let (sender, receiver) = oneshot::channel();
        let wait = Arc::new(PendingWait {
            name: event.name().clone(),
            sender: Mutex::new(Some(sender)),
            timer: Mutex::new(None),
            subscription: Mutex::new(None),
        });

        let on_match = {
            let wait = Arc::clone(&wait);
            Listener::new(move |payload: &P| {
                if wait.settle(Ok(payload.clone())) {
                    tracing::trace!(event = %wait.name, "Wait resolved");
                    wait.subscription.lock().take();
                    wait.disarm();
                }
            })
        };

        match self.once_if(event, predicate, &on_match) {
            Ok(subscription) => {
                if !wait.is_settled() {
                    *wait.subscription.lock() = Some(subscription);
                }
            }
            Err(err) => {
                wait.settle(Err(err));
            }
        }

        if !wait.is_settled() {
            let timer_wait = Arc::clone(&wait);
            let cancel = after(timeout, move || {
                timer_wait.timer.lock().take();
                let outcome = Err(EmitterError::Timeout {
                    name: timer_wait.name.clone(),
                    timeout,
                });
                if timer_wait.settle(outcome) {
                    tracing::trace!(event = %timer_wait.name, "Wait timed out");
                    timer_wait.detach();
                }
            });
            *wait.timer.lock() = Some(cancel);

            // Matched on another thread while the timer was being armed
            if wait.is_settled() {
                wait.disarm();
            }
        }

        Eventually { receiver, wait }
    }
}

/// State shared by one wait's listener, timer and future.
struct PendingWait<P> {
    name: Name,
    sender: Mutex<Option<oneshot::Sender<Result<P>>>>,
    timer: Mutex<Option<Cancel>>,
    subscription: Mutex<Option<Subscription>>,
}

impl<P> PendingWait<P> {
    /// Deliver the outcome; only the first caller succeeds
    fn settle(&self, outcome: Result<P>) -> bool {
        let sender = self.sender.lock().take();
        match sender {
            Some(sender) => {
                // The receiver may already be gone; nothing to deliver then
                let _ = sender.send(outcome);
                true
            }
            None => false,
        }
    }

    fn is_settled(&self) -> bool {
        self.sender.lock().is_none()
    }

    fn disarm(&self) {
        let timer = self.timer.lock().take();
        if let Some(timer) = timer.filter(Cancel::is_pending) {
            timer.cancel();
        }
    }

    fn detach(&self) {
        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            subscription.off();
        }
    }
}

/// Future returned by [`Emitter::eventually`] and [`Emitter::eventually_if`]
///
/// Resolves with the matching payload, or [`EmitterError::Timeout`].
/// Dropping it before it resolves removes the listener and cancels the timer.
#[must_use = "the wait is cancelled when the future is dropped"]
pub struct Eventually<P> {
    receiver: oneshot::Receiver<Result<P>>,
    wait: Arc<PendingWait<P>>,
}

impl<P> Eventually<P> {
    /// The awaited event
    pub fn name(&self) -> &Name {
        &self.wait.name
    }
}

impl<P> Future for Eventually<P> {
    type Output = Result<P>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(EmitterError::Abandoned {
                name: this.wait.name.clone(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<P> Drop for Eventually<P> {
    fn drop(&mut self) {
        let sender = self.wait.sender.lock().take();
        if sender.is_some() {
            tracing::trace!(event = %self.wait.name, "Wait dropped before it settled");
            self.wait.disarm();
            self.wait.detach();
        }
    }
}

impl<P> std::fmt::Debug for Eventually<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eventually")
            .field("name", &self.wait.name)
            .field("settled", &self.wait.is_settled())
            .finish()
    }
}

//! Cancellable delayed callbacks on the Tokio timer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

enum DelayState {
    /// Waiting to fire. The abort handle is filled in right after spawning.
    Armed(Option<AbortHandle>),
    /// Fired or cancelled.
    Spent,
}

/// Handle returned by [`after`]; cancels the pending callback.
///
/// Cancelling more than once, or after the callback has fired, does nothing
/// beyond logging a warning.
pub struct Cancel {
    state: Arc<Mutex<DelayState>>,
}

impl Cancel {
    /// Prevent the callback from running and release the timer
    pub fn cancel(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), DelayState::Spent);
        match previous {
            DelayState::Armed(handle) => {
                if let Some(handle) = handle {
                    handle.abort();
                }
            }
            DelayState::Spent => {
                tracing::warn!("Expected cancel to be called at most once");
            }
        }
    }

    /// Whether the callback is still scheduled
    pub fn is_pending(&self) -> bool {
        matches!(*self.state.lock(), DelayState::Armed(_))
    }
}

impl std::fmt::Debug for Cancel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancel")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Call `callback` once after `delay`.
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime, like `tokio::spawn`.
pub fn after<F>(delay: Duration, callback: F) -> Cancel
where
    F: FnOnce() + Send + 'static,
{
    let state = Arc::new(Mutex::new(DelayState::Armed(None)));
    let task_state = Arc::clone(&state);

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let previous = std::mem::replace(&mut *task_state.lock(), DelayState::Spent);
        if matches!(previous, DelayState::Armed(_)) {
            tracing::trace!(delay_ms = delay.as_millis() as u64, "Delay fired");
            callback();
        }
    });

    if let DelayState::Armed(slot) = &mut *state.lock() {
        *slot = Some(task.abort_handle());
    }

    Cancel { state }
}

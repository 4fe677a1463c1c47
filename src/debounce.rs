//! Trailing-edge debouncer.
//!
//! [`Debouncer::schedule`] arms a timer; scheduling again before it fires
//! aborts the previous action and restarts the delay, so only the last
//! action of a burst runs.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

pub struct Debouncer {
    delay: Duration,
    handle: Handle,
    pending: Option<JoinHandle<()>>,
    disposed: CancellationToken,
}

impl Debouncer {
    /// Debouncer running its actions on the current tokio runtime.
    ///
    /// # Panics
    /// When called outside a tokio runtime.
    pub fn new(delay: Duration) -> Self {
        Self::with_handle(delay, Handle::current())
    }

    /// Debouncer running its actions on `handle`.
    pub fn with_handle(delay: Duration, handle: Handle) -> Self {
        Self {
            delay,
            handle,
            pending: None,
            disposed: CancellationToken::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `action` once `delay` has passed without another call.
    ///
    /// Does nothing after [`dispose`](Self::dispose).
    pub fn schedule<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.disposed.is_cancelled() {
            return;
        }
        self.cancel();

        let delay = self.delay;
        let disposed = self.disposed.clone();
        self.pending = Some(self.handle.spawn(async move {
            tokio::select! {
                _ = disposed.cancelled() => {}
                _ = tokio::time::sleep(delay) => action(),
            }
        }));
    }

    /// Drop the pending action, if any. Later calls to `schedule` still work.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    /// Cancel the pending action and refuse all future ones.
    pub fn dispose(&mut self) {
        self.disposed.cancel();
        self.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.is_cancelled()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.dispose();
    }
}

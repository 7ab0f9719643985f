//! Request-scoped cancellation and deadlines
//!
//! Every trait method receives a [`Context`]. Cancelling it (or letting its
//! timeout elapse) makes [`Context::until_cancelled`] give up on the wrapped
//! future.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Context carries cancellation signals and deadlines across async boundaries
/// CRITICAL: Pass this as first parameter to ALL async trait methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

/// Returned when a context is cancelled before the wrapped work finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done: done_rx,
                done_tx,
            }),
        }
    }

    /// Derives a context that is cancelled once `timeout` has elapsed.
    /// Must be called from within a tokio runtime.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let (done_tx, done_rx) = watch::channel(*self.inner.done.borrow());

        let timer_tx = done_tx.clone();
        let mut parent = self.inner.done.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline.into()) => {}
                Ok(_) = parent.wait_for(|done| *done) => {}
            }
            let _ = timer_tx.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done: done_rx,
                done_tx,
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }

    /// Runs `fut` to completion unless the context is cancelled first
    pub async fn until_cancelled<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        let mut done = self.inner.done.clone();
        tokio::select! {
            output = fut => Ok(output),
            Ok(_) = done.wait_for(|done| *done) => Err(Cancelled),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

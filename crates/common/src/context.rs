//! Request-scoped cancellation and deadline.
//!
//! A [`RequestContext`] is created by the transport for every incoming call
//! and threaded through the pipeline. Each step is raced against the context
//! with [`RequestContext::run`], so a cancelled or expired request stops at
//! the step it was in and never starts the next one.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a request stopped before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Caller-side handle that cancels every context derived from it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Cancellation signal plus optional deadline for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a cancellable context and the handle that cancels it.
    pub fn with_cancel() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            Self {
                cancel: Some(rx),
                deadline: None,
            },
        )
    }

    /// Sets an absolute deadline, keeping the earlier one if already set.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Sets a deadline relative to now.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason this context is done, if it is.
    pub fn check(&self) -> Result<(), ContextError> {
        if let Some(rx) = &self.cancel
            && *rx.borrow()
        {
            return Err(ContextError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(ContextError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Runs `fut` unless the context is done first.
    ///
    /// The future is dropped as soon as cancellation or the deadline fires.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        self.check()?;

        tokio::select! {
            biased;
            reason = self.done() => Err(reason),
            output = fut => Ok(output),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // sender dropped without cancelling
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => ContextError::Cancelled,
            () = expired => ContextError::DeadlineExceeded,
        }
    }
}

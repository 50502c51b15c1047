//! # Request Context
//!
//! Cancellation and deadline propagation for carrier operations.
//!
//! Every outbound call and every poll sleep runs through
//! [`RequestContext::run`] or [`RequestContext::sleep`], so cancelling the
//! context or passing its deadline stops work at the next suspension point.
//! Child contexts observe their parent's cancellation; the registry uses
//! this to stop sibling fan-out tasks together.

use crate::domain::error::{CarrierError, CarrierResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline carried by every operation.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Creates a context with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrows the deadline to at most `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Narrows the deadline to at most `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derives a child that is cancelled whenever this context is.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true if the context has been cancelled.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the deadline, if any.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, if any.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns the underlying cancellation token.
    #[inline]
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fails fast if the context is cancelled or past its deadline.
    ///
    /// # Errors
    ///
    /// Returns `CANCELLED` or `DEADLINE_EXCEEDED` attributed to `carrier`.
    pub fn check(&self, carrier: &str) -> CarrierResult<()> {
        if self.token.is_cancelled() {
            return Err(CarrierError::cancelled(carrier));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(CarrierError::deadline_exceeded(carrier));
        }
        Ok(())
    }

    /// Runs `fut` unless the context is cancelled or its deadline passes
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `CANCELLED`, `DEADLINE_EXCEEDED`, or the future's own error.
    pub async fn run<T, F>(&self, carrier: &str, fut: F) -> CarrierResult<T>
    where
        F: Future<Output = CarrierResult<T>>,
    {
        self.check(carrier)?;
        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(CarrierError::cancelled(carrier)),
            () = until(self.deadline) => Err(CarrierError::deadline_exceeded(carrier)),
            res = fut => res,
        }
    }

    /// Sleeps for `duration`, waking early on cancellation or deadline.
    ///
    /// # Errors
    ///
    /// Returns `CANCELLED` or `DEADLINE_EXCEEDED` if interrupted.
    pub async fn sleep(&self, carrier: &str, duration: Duration) -> CarrierResult<()> {
        self.run(carrier, async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending::<()>().await,
    }
}

//! # Mock Harness
//!
//! Behaviour shared by the per-carrier mock transports.
//!
//! Every mock operation runs the same sequence:
//!
//! 1. sleep for the simulated latency (through the request context, so a
//!    cancelled caller is not held up),
//! 2. fail with `MOCK_ERROR` when errors are simulated,
//! 3. delegate to the per-operation hook when one is installed,
//! 4. otherwise return canned data.

use crate::domain::error::{CarrierError, CarrierResult, codes};
use crate::domain::value_objects::RequestContext;
use std::sync::Arc;
use std::time::Duration;

/// Replacement behaviour for one mock operation.
pub type Hook<Req, Resp> = Arc<dyn Fn(&RequestContext, &Req) -> CarrierResult<Resp> + Send + Sync>;

/// Failure and latency injection shared by all mocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockBehavior {
    /// Fail every call with `MOCK_ERROR`.
    pub simulate_errors: bool,
    /// Delay every call.
    pub simulate_latency: Option<Duration>,
}

impl MockBehavior {
    /// Behaviour that fails every call.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            simulate_errors: true,
            simulate_latency: None,
        }
    }

    /// Behaviour that delays every call.
    #[must_use]
    pub fn delayed(latency: Duration) -> Self {
        Self {
            simulate_errors: false,
            simulate_latency: Some(latency),
        }
    }

    /// Applies latency and error injection.
    ///
    /// # Errors
    ///
    /// Returns `MOCK_ERROR` when errors are simulated, or the context's
    /// cancellation/deadline error if it fires during the delay.
    pub async fn prelude(&self, ctx: &RequestContext, carrier: &str) -> CarrierResult<()> {
        if let Some(latency) = self.simulate_latency {
            ctx.sleep(carrier, latency).await?;
        }
        if self.simulate_errors {
            return Err(simulated_error(carrier));
        }
        Ok(())
    }
}

/// The error every mock returns when errors are simulated.
#[must_use]
pub fn simulated_error(carrier: &str) -> CarrierError {
    CarrierError::new(carrier, codes::MOCK_ERROR, "Simulated API error")
}

/// Runs the hook when present, otherwise the canned default.
///
/// # Errors
///
/// Returns whatever the hook or default returns.
pub fn hook_or<Req, Resp>(
    hook: Option<&Hook<Req, Resp>>,
    ctx: &RequestContext,
    req: &Req,
    default: impl FnOnce() -> CarrierResult<Resp>,
) -> CarrierResult<Resp> {
    match hook {
        Some(hook) => hook(ctx, req),
        None => default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn default_behaviour_passes() {
        let ctx = RequestContext::new();
        assert_ok!(MockBehavior::default().prelude(&ctx, "m").await);
    }

    #[tokio::test]
    async fn failing_behaviour_returns_mock_error() {
        let ctx = RequestContext::new();
        let err = MockBehavior::failing().prelude(&ctx, "m").await.unwrap_err();
        assert_eq!(err.code(), codes::MOCK_ERROR);
        assert_eq!(err.message(), "Simulated API error");
    }

    #[tokio::test(start_paused = true)]
    async fn latency_respects_deadline() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(10));
        let err = MockBehavior::delayed(Duration::from_secs(5))
            .prelude(&ctx, "m")
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::DEADLINE_EXCEEDED);
    }

    #[test]
    fn hook_replaces_default() {
        let ctx = RequestContext::new();
        let hook: Hook<u32, u32> = Arc::new(|_: &RequestContext, req: &u32| Ok(req * 2));
        assert_eq!(hook_or(Some(&hook), &ctx, &21, || Ok(0)).unwrap(), 42);
        assert_eq!(hook_or(None, &ctx, &21, || Ok(0)).unwrap(), 0);
    }
}

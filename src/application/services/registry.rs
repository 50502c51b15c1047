//! # Carrier Registry
//!
//! Holds the configured carriers by name and fans quote requests out to
//! them concurrently.
//!
//! Each carrier in a fan-out runs in its own task under a child of one
//! group context derived from the caller's. A carrier's failure is recorded
//! as a [`CarrierFailure`] next to the successful responses and never aborts
//! its siblings. Cancelling the caller's context, or dropping the fan-out
//! future, cancels the group so no task starts new work.
//!
//! Orders, labels, cancellations and tracking are routed by the carrier tag
//! at the start of the rate or order id (see
//! [`ids`](crate::domain::value_objects::ids)).
//!
//! Results arrive in completion order; callers must not rely on carrier
//! order.

use crate::domain::error::{CarrierError, CarrierResult, Sentinel, codes};
use crate::domain::messages::{
    CancelOrderRequest, CancelOrderResponse, CreateOrderRequest, CreateOrderResponse,
    GetLabelRequest, GetLabelResponse, GetTrackingRequest, GetTrackingResponse, QuoteRequest,
    QuoteResponse,
};
use crate::domain::value_objects::ids::{CarrierTag, UNKNOWN_CARRIER};
use crate::domain::value_objects::RequestContext;
use crate::infrastructure::carriers::Carrier;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Registry settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Deadline applied to each carrier's task in a fan-out.
    pub per_carrier_timeout: Option<Duration>,
}

impl RegistryConfig {
    /// Sets the per-carrier deadline.
    #[must_use]
    pub fn with_per_carrier_timeout(mut self, timeout: Duration) -> Self {
        self.per_carrier_timeout = Some(timeout);
        self
    }
}

/// One carrier's failure inside a fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierFailure {
    /// Name the carrier is registered under, or the unknown name requested.
    pub carrier: String,
    /// The error it returned.
    pub error: CarrierError,
}

impl fmt::Display for CarrierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.carrier, self.error)
    }
}

/// Merged result of a quote fan-out.
#[derive(Debug, Clone, Default)]
pub struct FanOutOutcome {
    /// One response per carrier that succeeded.
    pub responses: Vec<QuoteResponse>,
    /// One entry per carrier that failed.
    pub errors: Vec<CarrierFailure>,
}

impl FanOutOutcome {
    /// Returns true when at least one carrier failed.
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of carriers accounted for.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len() + self.errors.len()
    }

    /// Returns true when no carrier was accounted for.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named carriers plus concurrent fan-out.
#[derive(Default)]
pub struct CarrierRegistry {
    carriers: RwLock<HashMap<String, Arc<dyn Carrier>>>,
    config: RegistryConfig,
}

impl fmt::Debug for CarrierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarrierRegistry")
            .field("carriers", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

impl CarrierRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with settings.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            carriers: RwLock::default(),
            config,
        }
    }

    /// Returns the settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers a carrier under its name, replacing any previous entry.
    pub fn register(&self, carrier: Arc<dyn Carrier>) {
        let name = carrier.name().to_string();
        let replaced = self.carriers.write().insert(name.clone(), carrier).is_some();
        tracing::debug!(carrier = %name, replaced, "Registered carrier");
    }

    /// Looks a carrier up by name.
    ///
    /// # Errors
    ///
    /// Returns `CARRIER_NOT_FOUND` naming `name`.
    pub fn get(&self, name: &str) -> CarrierResult<Arc<dyn Carrier>> {
        self.carriers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CarrierError::carrier_not_found(name))
    }

    /// All carriers, sorted by name.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn Carrier>> {
        let mut all: Vec<_> = self.carriers.read().values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.carriers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered carriers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.carriers.read().len()
    }

    /// Requests quotes from every registered carrier concurrently.
    ///
    /// An empty registry yields no responses and a single
    /// `CARRIER_NOT_FOUND` failure.
    pub async fn get_all_quotes(&self, ctx: &RequestContext, req: &QuoteRequest) -> FanOutOutcome {
        let carriers = self.all();
        if carriers.is_empty() {
            tracing::warn!("Quote fan-out with no registered carriers");
            return FanOutOutcome {
                responses: Vec::new(),
                errors: vec![CarrierFailure {
                    carrier: String::new(),
                    error: CarrierError::new(
                        "",
                        Sentinel::CarrierNotFound.code(),
                        "no carriers registered",
                    ),
                }],
            };
        }
        self.fan_out(ctx, req, carriers, Vec::new()).await
    }

    /// Requests quotes from the named carriers concurrently.
    ///
    /// An empty list means every carrier. Unknown names each produce a
    /// `CARRIER_NOT_FOUND` failure; the others proceed. Duplicate names are
    /// queried once.
    pub async fn get_quotes_from_carriers<S: AsRef<str>>(
        &self,
        ctx: &RequestContext,
        req: &QuoteRequest,
        names: &[S],
    ) -> FanOutOutcome {
        if names.is_empty() {
            return self.get_all_quotes(ctx, req).await;
        }

        let mut seen = HashSet::new();
        let mut carriers = Vec::new();
        let mut errors = Vec::new();
        for name in names.iter().map(AsRef::as_ref) {
            if !seen.insert(name) {
                continue;
            }
            match self.get(name) {
                Ok(carrier) => carriers.push(carrier),
                Err(error) => {
                    tracing::warn!(carrier = name, "Requested carrier is not registered");
                    errors.push(CarrierFailure {
                        carrier: name.to_string(),
                        error,
                    });
                }
            }
        }
        self.fan_out(ctx, req, carriers, errors).await
    }

    /// Runs one task per carrier under a shared group context.
    ///
    /// Outcomes are drained from a `FuturesUnordered` by this call alone, so
    /// the response and failure lists need no lock.
    async fn fan_out(
        &self,
        ctx: &RequestContext,
        req: &QuoteRequest,
        carriers: Vec<Arc<dyn Carrier>>,
        errors: Vec<CarrierFailure>,
    ) -> FanOutOutcome {
        let group = ctx.child();
        let _cancel_on_drop = group.token().clone().drop_guard();
        let req = Arc::new(req.clone());
        tracing::debug!(carriers = carriers.len(), "Starting quote fan-out");

        let mut tasks: FuturesUnordered<_> = carriers
            .into_iter()
            .map(|carrier| {
                let name = carrier.name().to_string();
                let task_ctx = match self.config.per_carrier_timeout {
                    Some(timeout) => group.child().with_timeout(timeout),
                    None => group.child(),
                };
                let req = Arc::clone(&req);
                let handle =
                    tokio::spawn(async move { carrier.get_quote(&task_ctx, &req).await });
                async move { (name, handle.await) }
            })
            .collect();

        let mut outcome = FanOutOutcome {
            responses: Vec::new(),
            errors,
        };
        while let Some((name, joined)) = tasks.next().await {
            let result = joined.unwrap_or_else(|e| {
                Err(CarrierError::new(
                    name.as_str(),
                    codes::SERVICE_UNAVAILABLE,
                    format!("task panicked: {e}"),
                ))
            });
            match result {
                Ok(resp) => outcome.responses.push(resp),
                Err(error) => {
                    tracing::warn!(carrier = %name, error = %error, "Carrier quote failed");
                    outcome.errors.push(CarrierFailure {
                        carrier: name,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            responses = outcome.responses.len(),
            errors = outcome.errors.len(),
            "Quote fan-out complete"
        );
        outcome
    }

    /// Resolves the carrier owning a rate id.
    ///
    /// # Errors
    ///
    /// Returns `CARRIER_NOT_FOUND` when the id carries no known tag or the
    /// owning carrier is not registered.
    pub fn carrier_for_rate(&self, rate_id: &str) -> CarrierResult<Arc<dyn Carrier>> {
        self.carrier_for_id(rate_id)
    }

    /// Resolves the carrier owning an order id.
    ///
    /// # Errors
    ///
    /// Same as [`carrier_for_rate`](Self::carrier_for_rate).
    pub fn carrier_for_order(&self, order_id: &str) -> CarrierResult<Arc<dyn Carrier>> {
        self.carrier_for_id(order_id)
    }

    fn carrier_for_id(&self, id: &str) -> CarrierResult<Arc<dyn Carrier>> {
        let name = CarrierTag::from_id(id).map(CarrierTag::carrier_name).ok_or_else(|| {
            CarrierError::new(
                UNKNOWN_CARRIER,
                codes::CARRIER_NOT_FOUND,
                format!("no carrier owns id {id:?}"),
            )
        })?;
        self.get(name)
    }

    /// Books `req.rate_id` with its owning carrier.
    ///
    /// # Errors
    ///
    /// Returns `CARRIER_NOT_FOUND` or the carrier's error.
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        req: &CreateOrderRequest,
    ) -> CarrierResult<CreateOrderResponse> {
        self.carrier_for_rate(&req.rate_id)?
            .create_order(ctx, req)
            .await
    }

    /// Fetches a label from the order's carrier.
    ///
    /// # Errors
    ///
    /// Returns `CARRIER_NOT_FOUND` or the carrier's error.
    pub async fn get_label(
        &self,
        ctx: &RequestContext,
        req: &GetLabelRequest,
    ) -> CarrierResult<GetLabelResponse> {
        self.carrier_for_order(&req.order_id)?.get_label(ctx, req).await
    }

    /// Cancels an order with its carrier.
    ///
    /// # Errors
    ///
    /// Returns `CARRIER_NOT_FOUND` or the carrier's error.
    pub async fn cancel_order(
        &self,
        ctx: &RequestContext,
        req: &CancelOrderRequest,
    ) -> CarrierResult<CancelOrderResponse> {
        self.carrier_for_order(&req.order_id)?
            .cancel_order(ctx, req)
            .await
    }

    /// Fetches tracking from the order's carrier.
    ///
    /// # Errors
    ///
    /// Returns `CARRIER_NOT_FOUND` or the carrier's error.
    pub async fn get_tracking(
        &self,
        ctx: &RequestContext,
        req: &GetTrackingRequest,
    ) -> CarrierResult<GetTrackingResponse> {
        self.carrier_for_order(&req.order_id)?
            .get_tracking(ctx, req)
            .await
    }
}

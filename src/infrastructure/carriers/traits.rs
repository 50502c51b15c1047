//! # Carrier Trait
//!
//! Port definition for carrier integrations.
//!
//! This module defines the [`Carrier`] trait that every adapter implements.
//! Live and mock variants are interchangeable behind it, and the registry
//! holds them as `Arc<dyn Carrier>` keyed by [`Carrier::name`].
//!
//! # Examples
//!
//! ```ignore
//! use carrier_gateway::infrastructure::carriers::Carrier;
//!
//! struct MyCarrier { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl Carrier for MyCarrier {
//!     // ... implement required methods
//! }
//! ```

use crate::domain::error::{CarrierError, CarrierResult, codes};
use crate::domain::messages::{
    CancelOrderRequest, CancelOrderResponse, CreateOrderRequest, CreateOrderResponse,
    GetLabelRequest, GetLabelResponse, GetTrackingRequest, GetTrackingResponse, QuoteRequest,
    QuoteResponse,
};
use crate::domain::value_objects::RequestContext;
use async_trait::async_trait;
use std::fmt;

/// Capability set every carrier adapter provides.
///
/// Each operation receives the caller's [`RequestContext`]; implementations
/// must run outbound calls and sleeps through it so cancellation and
/// deadlines are honoured.
#[async_trait]
pub trait Carrier: Send + Sync + fmt::Debug {
    /// Stable registry key, e.g. `freightcom`.
    fn name(&self) -> &str;

    /// Requests rates for a shipment.
    ///
    /// # Errors
    ///
    /// Returns a [`CarrierError`] when the carrier rejects the request or the
    /// transport fails.
    async fn get_quote(&self, ctx: &RequestContext, req: &QuoteRequest)
    -> CarrierResult<QuoteResponse>;

    /// Books a previously quoted rate.
    ///
    /// # Errors
    ///
    /// Returns a [`CarrierError`] when the shipment cannot be created.
    async fn create_order(
        &self,
        ctx: &RequestContext,
        req: &CreateOrderRequest,
    ) -> CarrierResult<CreateOrderResponse>;

    /// Fetches an order's label.
    ///
    /// # Errors
    ///
    /// Returns a [`CarrierError`] when no label is available.
    async fn get_label(
        &self,
        ctx: &RequestContext,
        req: &GetLabelRequest,
    ) -> CarrierResult<GetLabelResponse>;

    /// Cancels an order.
    ///
    /// # Errors
    ///
    /// Returns a [`CarrierError`] when the carrier refuses the cancellation.
    async fn cancel_order(
        &self,
        ctx: &RequestContext,
        req: &CancelOrderRequest,
    ) -> CarrierResult<CancelOrderResponse>;

    /// Fetches an order's tracking history.
    ///
    /// Carriers without tracking support keep the default, which fails with
    /// `UNSUPPORTED`.
    ///
    /// # Errors
    ///
    /// Returns a [`CarrierError`] when tracking is unavailable.
    async fn get_tracking(
        &self,
        _ctx: &RequestContext,
        _req: &GetTrackingRequest,
    ) -> CarrierResult<GetTrackingResponse> {
        Err(CarrierError::new(
            self.name(),
            codes::UNSUPPORTED,
            "tracking is not supported",
        ))
    }
}

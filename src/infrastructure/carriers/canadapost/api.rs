//! # Canada Post Transport Types
//!
//! Protocol-neutral shapes exchanged between the adapter and a
//! [`CanadaPostApi`] transport. The XML documents themselves live in
//! [`documents`](super::documents); the live transport converts between the
//! two so the adapter never handles markup.

use crate::domain::error::CarrierResult;
use crate::domain::value_objects::RequestContext;
use async_trait::async_trait;
use bytes::Bytes;
use rust_decimal::Decimal;
use std::fmt;

/// Transport for the Canada Post REST API.
#[async_trait]
pub trait CanadaPostApi: Send + Sync + fmt::Debug {
    /// Prices a parcel.
    ///
    /// # Errors
    ///
    /// Returns the carrier's message code or a mapped HTTP error.
    async fn get_rates(&self, ctx: &RequestContext, req: &RatesRequest)
    -> CarrierResult<RatesResponse>;

    /// Creates a shipment.
    ///
    /// # Errors
    ///
    /// Returns the carrier's message code or a mapped HTTP error.
    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse>;

    /// Downloads a label artifact as raw bytes. `media_type` is sent as the
    /// `Accept` header.
    ///
    /// # Errors
    ///
    /// Returns the carrier's message code or a mapped HTTP error.
    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        media_type: &str,
    ) -> CarrierResult<LabelResponse>;

    /// Voids a shipment.
    ///
    /// # Errors
    ///
    /// Returns the carrier's message code or a mapped HTTP error.
    async fn void_shipment(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
    ) -> CarrierResult<VoidResponse>;

    /// Fetches the tracking summary for a PIN.
    ///
    /// # Errors
    ///
    /// Returns the carrier's message code or a mapped HTTP error.
    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        tracking_pin: &str,
    ) -> CarrierResult<TrackingResponse>;
}

/// Parcel size in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    /// Longest side.
    pub length: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Where a rated parcel goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Canadian postal code.
    Domestic {
        /// Normalized postal code.
        postal_code: String,
    },
    /// United States zip code.
    UnitedStates {
        /// Zip code.
        zip_code: String,
    },
    /// Any other country.
    International {
        /// ISO 3166-1 alpha-2 code.
        country_code: String,
    },
}

impl Default for Destination {
    fn default() -> Self {
        Self::Domestic {
            postal_code: String::new(),
        }
    }
}

/// A rate request for one parcel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatesRequest {
    /// Contract customer number; omitted when empty.
    pub customer_number: String,
    /// Parcel weight in kilograms.
    pub weight_kg: f64,
    /// Parcel size; only sent when the length is positive.
    pub dimensions: Dimensions,
    /// Origin postal code.
    pub origin_postal_code: String,
    /// Destination.
    pub destination: Destination,
}

/// Priced services.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RatesResponse {
    /// Quote id.
    pub quote_id: String,
    /// One entry per service.
    pub rates: Vec<Rate>,
}

/// One priced service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rate {
    /// Service code, e.g. `DOM.RP`.
    pub service_code: String,
    /// Display name.
    pub service_name: String,
    /// Base price.
    pub base_rate: Decimal,
    /// `FUELSC` adjustment.
    pub fuel_surcharge: Decimal,
    /// GST + PST + HST.
    pub taxes: Decimal,
    /// Amount due.
    pub total_price: Decimal,
    /// Expected transit time in days.
    pub expected_transit: u32,
    /// `YYYY-MM-DD`, possibly empty.
    pub expected_delivery: String,
    /// Delivery date is guaranteed.
    pub guaranteed: bool,
}

/// Street address on a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct Address {
    pub name: String,
    pub company: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country_code: String,
    pub phone: String,
}

/// A shipment to create.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShipmentRequest {
    /// Shipment group.
    pub group_id: String,
    /// Service code.
    pub service_code: String,
    /// Sender.
    pub sender: Address,
    /// Recipient.
    pub destination: Address,
    /// Parcel weight in kilograms.
    pub weight_kg: f64,
    /// Parcel size.
    pub dimensions: Dimensions,
}

/// A hypermedia link returned with a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    /// Relation, e.g. `label` or `tracking`.
    pub rel: String,
    /// Target URL.
    pub href: String,
    /// Media type of the target.
    pub media_type: String,
}

/// A created shipment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct ShipmentResponse {
    pub shipment_id: String,
    pub tracking_pin: String,
    pub status: String,
    pub service_name: String,
    pub total_charged: Decimal,
    pub expected_delivery: String,
    pub links: Vec<Link>,
}

impl ShipmentResponse {
    /// Returns the href of the first link with relation `rel`.
    #[must_use]
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == rel)
            .map(|l| l.href.as_str())
    }
}

/// A label artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelResponse {
    /// Shipment id.
    pub shipment_id: String,
    /// Media type that was requested.
    pub media_type: String,
    /// Raw document bytes.
    pub data: Bytes,
}

/// Outcome of a void.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoidResponse {
    /// Shipment id.
    pub shipment_id: String,
    /// `voided` on success.
    pub status: String,
}

/// Tracking summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackingResponse {
    /// Tracking PIN.
    pub tracking_pin: String,
    /// Latest event type.
    pub status: String,
    /// Events, newest last.
    pub events: Vec<TrackingEvent>,
}

/// One tracking event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct TrackingEvent {
    pub timestamp: String,
    pub description: String,
    pub location: String,
    pub kind: String,
}

//! # Freightcom Wire Types
//!
//! JSON payloads of the Freightcom REST API and the transport trait the
//! adapter talks to.
//!
//! Rates and shipments are asynchronous on the carrier side: the first call
//! answers with an id and `pending`, and the transport polls until a
//! terminal status. Implementations of [`FreightcomApi`] hide that loop, so
//! callers only ever see terminal responses.

use crate::domain::error::CarrierResult;
use crate::domain::value_objects::RequestContext;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport for the Freightcom API.
#[async_trait]
pub trait FreightcomApi: Send + Sync + fmt::Debug {
    /// Submits a rate request and waits for it to complete.
    ///
    /// # Errors
    ///
    /// Returns `RATE_ERROR`, `UNKNOWN_STATUS`, `TIMEOUT` or a mapped HTTP
    /// error.
    async fn get_rates(&self, ctx: &RequestContext, req: &RatesRequest)
    -> CarrierResult<RatesResponse>;

    /// Creates a shipment, waiting for it to leave `pending`.
    ///
    /// # Errors
    ///
    /// Returns `SHIPMENT_ERROR`, `TIMEOUT` or a mapped HTTP error.
    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse>;

    /// Fetches a shipment's labels in `format`.
    ///
    /// # Errors
    ///
    /// Returns a mapped HTTP error.
    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        format: &str,
    ) -> CarrierResult<LabelResponse>;

    /// Cancels a shipment.
    ///
    /// # Errors
    ///
    /// Returns a mapped HTTP error.
    async fn cancel_shipment(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        reason: Option<&str>,
    ) -> CarrierResult<CancelResponse>;

    /// Fetches a shipment's tracking events.
    ///
    /// # Errors
    ///
    /// Returns a mapped HTTP error.
    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
    ) -> CarrierResult<TrackingResponse>;
}

/// `POST /rate` body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RatesRequest {
    /// Service ids to query; all when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<i64>,
    /// Service ids to exclude.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_services: Vec<i64>,
    /// Shipment details.
    pub details: ShippingDetails,
}

/// Origin, destination and packaging.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShippingDetails {
    /// Pickup location.
    pub origin: Location,
    /// Delivery location.
    pub destination: Location,
    /// Packages.
    pub packaging: PackagingInfo,
}

/// A pickup or delivery location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Location {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    /// ISO 3166-1 alpha-2.
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub residential: bool,
}

/// Packaging block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackagingInfo {
    /// `package`, `envelope` or `pallet`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Packages.
    pub packages: Vec<Package>,
}

/// One package, in centimetres and kilograms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Package {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub quantity: u32,
}

/// Acknowledgement of `POST /rate`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateRequestResponse {
    /// Id to poll.
    pub request_id: String,
    /// Usually `pending`.
    #[serde(default)]
    pub status: String,
}

/// `GET /rate/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatesResponse {
    /// Request id.
    #[serde(default)]
    pub request_id: String,
    /// `pending`, `complete` or `error`.
    #[serde(default)]
    pub status: String,
    /// Rates once complete.
    #[serde(default)]
    pub rates: Vec<Rate>,
    /// Failure text when `error`.
    #[serde(default)]
    pub error: String,
}

/// One rate line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Rate {
    pub id: String,
    pub service_id: i64,
    #[serde(default)]
    pub carrier_code: String,
    #[serde(default)]
    pub carrier_name: String,
    #[serde(default)]
    pub service_code: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub base_rate: Decimal,
    #[serde(default)]
    pub fuel_surcharge: Decimal,
    #[serde(default)]
    pub total_tax: Decimal,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub transit_days: u32,
    /// `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub estimated_delivery: String,
    #[serde(default)]
    pub guaranteed: bool,
    /// RFC 3339.
    #[serde(default)]
    pub expires_at: String,
}

/// `POST /shipment` body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShipmentRequest {
    /// Idempotency key, at most 128 characters.
    pub unique_id: String,
    /// Payment method to charge.
    pub payment_method_id: i64,
    /// Service to book.
    pub service_id: i64,
    /// Shipment details.
    pub details: ShippingDetails,
    /// Sender identity.
    pub sender: Contact,
    /// Recipient identity.
    pub recipient: Contact,
    /// Caller reference.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    /// Purchase order number.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub po_number: String,
    /// Delivery instructions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instructions: String,
}

/// Sender or recipient.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Contact {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// Shipment as reported by `POST /shipment` and `GET /shipment/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ShipmentResponse {
    pub id: String,
    #[serde(default)]
    pub unique_id: String,
    #[serde(default)]
    pub previously_created: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tracking_numbers: Vec<String>,
    #[serde(default)]
    pub tracking_url: String,
    #[serde(default)]
    pub carrier_code: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub total_charged: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub estimated_delivery: String,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// A hosted label document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Label {
    /// `4x6` or `letter`.
    #[serde(default)]
    pub size: String,
    /// `pdf`, `zpl` or `png`.
    #[serde(default)]
    pub format: String,
    /// Download URL.
    #[serde(default)]
    pub url: String,
}

/// Labels of one shipment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelResponse {
    /// Shipment id.
    pub shipment_id: String,
    /// Labels matching the requested format.
    pub labels: Vec<Label>,
}

/// `DELETE /shipment/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CancelResponse {
    #[serde(default)]
    pub shipment_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub refund_amount: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub confirmation_number: String,
}

/// `GET /shipment/{id}/tracking-events` body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TrackingResponse {
    #[serde(default)]
    pub shipment_id: String,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub events: Vec<TrackingEvent>,
}

/// One tracking scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TrackingEvent {
    /// RFC 3339.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub code: String,
}

/// Structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine code.
    #[serde(default)]
    pub code: String,
    /// Human message.
    #[serde(default)]
    pub message: String,
}

/// Loose error body with either field set.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SimpleError {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}

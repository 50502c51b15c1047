//! # Purolator Transport Types
//!
//! Shapes exchanged between the adapter and a [`PurolatorApi`] transport,
//! plus the service and scan lookup tables shared by the live and canned
//! transports.

use crate::domain::error::CarrierResult;
use crate::domain::value_objects::RequestContext;
use async_trait::async_trait;
use bytes::Bytes;
use rust_decimal::Decimal;
use std::fmt;

/// Transport for the Purolator web services.
#[async_trait]
pub trait PurolatorApi: Send + Sync + fmt::Debug {
    /// Estimates every available service (`GetFullEstimate`).
    ///
    /// # Errors
    ///
    /// Returns the SOAP fault, the first response error, or a mapped HTTP
    /// error.
    async fn get_rates(&self, ctx: &RequestContext, req: &RatesRequest)
    -> CarrierResult<RatesResponse>;

    /// Books a shipment (`CreateShipment`).
    ///
    /// # Errors
    ///
    /// Same as [`get_rates`](Self::get_rates).
    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse>;

    /// Fetches the label document of a shipment (`GetDocuments`).
    ///
    /// # Errors
    ///
    /// Same as [`get_rates`](Self::get_rates), plus `LABEL_NOT_FOUND` when no
    /// completed document is returned.
    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_pin: &str,
        media_type: &str,
    ) -> CarrierResult<LabelResponse>;

    /// Voids a shipment (`VoidShipment`).
    ///
    /// # Errors
    ///
    /// Same as [`get_rates`](Self::get_rates).
    async fn void_shipment(
        &self,
        ctx: &RequestContext,
        shipment_pin: &str,
    ) -> CarrierResult<VoidResponse>;

    /// Fetches the scans of a PIN (`TrackPackagesByPin`).
    ///
    /// # Errors
    ///
    /// Same as [`get_rates`](Self::get_rates), plus `TRACKING_NOT_FOUND` when
    /// the PIN is absent from the response.
    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        tracking_pin: &str,
    ) -> CarrierResult<TrackingResponse>;
}

/// Address on a rate or shipment request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct Address {
    pub name: String,
    pub company: String,
    pub street_address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

/// Total weight and piece count of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackageInformation {
    /// Sum of all package weights, in kilograms.
    pub total_weight_kg: f64,
    /// Number of packages.
    pub total_pieces: u32,
}

/// A full-estimate request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatesRequest {
    /// Account billed for the shipment.
    pub billing_account: String,
    /// Origin postal code.
    pub sender_postal_code: String,
    /// Destination; only city, province, postal code and country are sent.
    pub receiver: Address,
    /// Weight and pieces.
    pub packages: PackageInformation,
}

/// Estimated services.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RatesResponse {
    /// Quote id.
    pub quote_id: String,
    /// One entry per service.
    pub rates: Vec<Rate>,
}

/// One estimated service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rate {
    /// Service id, e.g. `PurolatorExpress`.
    pub service_id: String,
    /// Display name.
    pub service_name: String,
    /// Base price.
    pub base_price: Decimal,
    /// The `Fuel` / `FuelSurcharge` surcharge.
    pub fuel_surcharge: Decimal,
    /// Sum of all taxes.
    pub taxes: Decimal,
    /// Total price.
    pub total_price: Decimal,
    /// `YYYY-MM-DD`, possibly empty.
    pub expected_delivery: String,
    /// Estimated transit days.
    pub transit_days: u32,
    /// Delivery is guaranteed.
    pub guaranteed: bool,
}

/// A shipment to book.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShipmentRequest {
    /// Account billed for the shipment.
    pub billing_account: String,
    /// Service id.
    pub service_id: String,
    /// Sender.
    pub sender: Address,
    /// Receiver.
    pub receiver: Address,
    /// Weight and pieces.
    pub packages: PackageInformation,
    /// `Regular` or `Thermal`.
    pub printer_type: String,
}

/// A booked shipment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShipmentResponse {
    /// Shipment PIN; also the tracking number.
    pub shipment_pin: String,
    /// One PIN per piece.
    pub piece_pins: Vec<String>,
    /// Total price.
    pub total_price: Decimal,
    /// `YYYY-MM-DD`, possibly empty.
    pub expected_delivery: String,
    /// Hosted label, when the transport knows one.
    pub label_url: String,
}

/// A decoded label document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelResponse {
    /// Shipment PIN.
    pub shipment_pin: String,
    /// Media type that was requested.
    pub media_type: String,
    /// Raw document bytes.
    pub data: Bytes,
}

/// Outcome of a void.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoidResponse {
    /// Shipment PIN.
    pub shipment_pin: String,
    /// `voided` or `failed`.
    pub status: String,
}

/// Scans of one PIN.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackingResponse {
    /// Tracking PIN.
    pub tracking_pin: String,
    /// Scan type of the latest (first) scan.
    pub status: String,
    /// Scans, latest first.
    pub events: Vec<TrackingEvent>,
}

/// One scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackingEvent {
    /// `{date}T{time}` as reported.
    pub timestamp: String,
    /// Scan description.
    pub description: String,
    /// `City, Province`.
    pub location: String,
    /// Scan type, e.g. `InTransit`.
    pub scan_type: String,
}

/// Display name of a service id; unknown ids are returned unchanged.
#[must_use]
pub fn service_name(service_id: &str) -> &str {
    match service_id {
        "PurolatorExpress" => "Purolator Express",
        "PurolatorExpress9AM" => "Purolator Express 9AM",
        "PurolatorExpress10:30AM" => "Purolator Express 10:30AM",
        "PurolatorExpress12PM" => "Purolator Express 12PM",
        "PurolatorExpressEvening" => "Purolator Express Evening",
        "PurolatorGround" => "Purolator Ground",
        "PurolatorGround9AM" => "Purolator Ground 9AM",
        "PurolatorGround10:30AM" => "Purolator Ground 10:30AM",
        "PurolatorExpressUS" => "Purolator Express U.S.",
        "PurolatorExpressUSPack" => "Purolator Express U.S. Pack",
        "PurolatorGroundUS" => "Purolator Ground U.S.",
        other => other,
    }
}

/// Returns true for services with a delivery guarantee.
#[must_use]
pub fn is_guaranteed(service_id: &str) -> bool {
    matches!(
        service_id,
        "PurolatorExpress"
            | "PurolatorExpress9AM"
            | "PurolatorExpress10:30AM"
            | "PurolatorExpress12PM"
            | "PurolatorExpressEvening"
            | "PurolatorExpressUS"
    )
}

/// Display form of a scan type; unknown types are returned unchanged.
#[must_use]
pub fn scan_display(scan_type: &str) -> &str {
    match scan_type {
        "PickedUp" => "Picked Up",
        "InTransit" => "In Transit",
        "OutForDelivery" => "Out for Delivery",
        "Delivered" => "Delivered",
        "Exception" => "Exception",
        "ReturnToSender" => "Return to Sender",
        other => other,
    }
}

//! # Carrier Messages
//!
//! Request/response pairs exchanged through the carrier capability trait.
//!
//! Requests are plain data with serde defaults so an inbound layer can
//! deserialize partial JSON. Responses are produced by the adapters and
//! always carry carrier-tagged ids.

use crate::domain::entities::{Address, Contact, Label, Order, Package, RateOption, TrackingEvent};
use crate::domain::error::{CarrierError, CarrierResult, Sentinel};
use crate::domain::value_objects::enums::{LabelFormat, ServiceType, ShipmentStatus};
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Shipping preferences attached to a quote request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingOptions {
    /// Carriers to ask; empty means all.
    pub carriers: Vec<String>,
    /// Service types to keep; empty means all.
    pub service_types: Vec<ServiceType>,
    /// Signature on delivery.
    pub signature_required: bool,
    /// Declared-value coverage.
    pub insurance_required: bool,
    /// Saturday delivery.
    pub saturday_delivery: bool,
    /// Planned ship date; today when absent.
    pub ship_date: Option<Timestamp>,
}

/// Request for shipping quotes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteRequest {
    /// Calling shipper.
    pub shipper_id: String,
    /// Pickup address.
    pub origin: Address,
    /// Delivery address.
    pub destination: Address,
    /// Packages in the shipment.
    pub packages: Vec<Package>,
    /// Preferences.
    pub options: ShippingOptions,
}

impl QuoteRequest {
    /// Checks that the request can be rated at all.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PACKAGE` when there are no packages or one has a
    /// non-positive weight. Returns `INVALID_ADDRESS` when the origin postal
    /// code is blank, or the destination's is blank and the destination is
    /// Canadian or US.
    pub fn validate(&self, carrier: &str) -> CarrierResult<()> {
        if self.packages.is_empty() || !self.packages.iter().all(Package::is_valid) {
            return Err(CarrierError::from_sentinel(carrier, Sentinel::InvalidPackage));
        }
        let blank_destination = self.destination.postal_code.trim().is_empty()
            && self.destination.requires_postal_code();
        if self.origin.postal_code.trim().is_empty() || blank_destination {
            return Err(CarrierError::from_sentinel(carrier, Sentinel::InvalidAddress));
        }
        Ok(())
    }

    /// Returns the ship date, defaulting to now.
    #[must_use]
    pub fn ship_date(&self) -> Timestamp {
        self.options.ship_date.unwrap_or_else(Timestamp::now)
    }
}

/// Rates returned by one carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Carrier quote id.
    pub quote_id: String,
    /// Rate lines in carrier order.
    pub rates: Vec<RateOption>,
    /// Overall expiry.
    pub expires_at: Timestamp,
}

impl QuoteResponse {
    /// Builds a response whose expiry is the earliest rate expiry, or
    /// `fallback` when there are no rates.
    #[must_use]
    pub fn from_rates(quote_id: impl Into<String>, rates: Vec<RateOption>, fallback: Timestamp) -> Self {
        let expires_at = rates.iter().map(|r| r.expires_at).min().unwrap_or(fallback);
        Self {
            quote_id: quote_id.into(),
            rates,
            expires_at,
        }
    }

    /// Returns the cheapest rate by total price.
    #[must_use]
    pub fn cheapest(&self) -> Option<&RateOption> {
        self.rates.iter().min_by_key(|r| r.total_price.amount())
    }

    /// Keeps only rates of the given service types; an empty filter keeps
    /// everything.
    #[must_use]
    pub fn filter_service_types(mut self, types: &[ServiceType]) -> Self {
        if !types.is_empty() {
            self.rates.retain(|r| types.contains(&r.service_type));
        }
        self
    }
}

/// Request to book a previously quoted rate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    /// Calling shipper.
    pub shipper_id: String,
    /// Quote the rate came from.
    pub quote_id: String,
    /// Carrier-tagged rate id.
    pub rate_id: String,
    /// Sender identity.
    pub sender: Contact,
    /// Pickup address.
    pub sender_address: Address,
    /// Recipient identity.
    pub recipient: Contact,
    /// Delivery address.
    pub recipient_address: Address,
    /// Packages in the shipment.
    pub packages: Vec<Package>,
    /// Caller reference; doubles as the idempotency key where supported.
    pub reference: Option<String>,
    /// Purchase order number.
    pub po_number: Option<String>,
    /// Delivery instructions.
    pub instructions: Option<String>,
}

/// A booked shipment.
pub type CreateOrderResponse = Order;

/// Request for an order's label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetLabelRequest {
    /// Carrier-tagged order id.
    pub order_id: String,
    /// Desired format.
    pub format: LabelFormat,
}

/// An order's label documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLabelResponse {
    /// Carrier-tagged order id.
    pub order_id: String,
    /// Primary label.
    pub label: Label,
    /// Extra labels for multi-piece shipments.
    pub additional_labels: Vec<Label>,
}

/// Request to cancel an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CancelOrderRequest {
    /// Carrier-tagged order id.
    pub order_id: String,
    /// Free-form reason.
    pub reason: Option<String>,
}

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    /// Carrier-tagged order id.
    pub order_id: String,
    /// Status after the cancellation attempt.
    pub status: ShipmentStatus,
    /// Refund, when the carrier reports one.
    pub refund_amount: Option<Money>,
    /// Carrier confirmation reference.
    pub confirmation_number: String,
}

/// Request for an order's tracking history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetTrackingRequest {
    /// Carrier-tagged order id.
    pub order_id: String,
    /// Tracking number, when it differs from the order id.
    pub tracking_number: Option<String>,
}

/// An order's tracking history, newest event first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTrackingResponse {
    /// Carrier-tagged order id.
    pub order_id: String,
    /// Tracking number.
    pub tracking_number: String,
    /// Current status.
    pub status: ShipmentStatus,
    /// Events.
    pub events: Vec<TrackingEvent>,
}

//! # Order
//!
//! A booked shipment as reported back by a carrier.

use crate::domain::value_objects::enums::ShipmentStatus;
use crate::domain::value_objects::ids::carrier_from_id;
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// A booked shipment.
///
/// `order_id` carries the owning carrier's tag; label, cancel and tracking
/// calls are routed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Carrier-tagged order id.
    pub order_id: String,
    /// Carrier tracking number.
    pub tracking_number: String,
    /// Public tracking page.
    pub tracking_url: String,
    /// Normalized status.
    pub status: ShipmentStatus,
    /// Carrier registry name.
    pub carrier: String,
    /// Human-readable service name.
    pub service_name: String,
    /// Amount charged.
    pub total_charged: Money,
    /// Estimated delivery.
    pub estimated_delivery: Option<Timestamp>,
    /// Hosted label, if the carrier returned one.
    pub label_url: Option<String>,
}

impl Order {
    /// Returns the carrier recovered from the order id's tag.
    #[must_use]
    pub fn owning_carrier(&self) -> &'static str {
        carrier_from_id(&self.order_id)
    }
}

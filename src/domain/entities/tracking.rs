//! # Tracking Event

use crate::domain::value_objects::enums::ShipmentStatus;
use crate::domain::value_objects::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// One scan or status change reported by a carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// When the event happened.
    pub timestamp: Timestamp,
    /// Carrier description.
    pub description: String,
    /// Where it happened, e.g. `Toronto, ON`.
    pub location: String,
    /// Normalized status after the event.
    pub status: ShipmentStatus,
    /// Raw carrier event code.
    pub carrier_code: String,
}

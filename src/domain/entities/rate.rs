//! # Rate Option
//!
//! One priced service offered by a carrier in response to a quote request.

use crate::domain::value_objects::enums::ServiceType;
use crate::domain::value_objects::ids::carrier_from_id;
use crate::domain::value_objects::money::Money;
use crate::domain::value_objects::timestamp::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A carrier-specific quote line.
///
/// `rate_id` carries the owning carrier's tag so a later create-order call
/// can be routed without a lookup table. `total_price` equals the sum of
/// the three components within [`RateOption::TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateOption {
    /// Carrier-tagged rate id.
    pub rate_id: String,
    /// Carrier registry name.
    pub carrier: String,
    /// Carrier service code.
    pub service_code: String,
    /// Human-readable service name.
    pub service_name: String,
    /// Normalized service classification.
    pub service_type: ServiceType,
    /// Base rate.
    pub base_rate: Money,
    /// Fuel surcharge.
    pub fuel_surcharge: Money,
    /// Taxes.
    pub taxes: Money,
    /// Total price.
    pub total_price: Money,
    /// Transit time in business days.
    pub transit_days: u32,
    /// Estimated delivery.
    pub estimated_delivery: Option<Timestamp>,
    /// When this rate stops being bookable.
    pub expires_at: Timestamp,
    /// Signature on delivery included.
    pub signature_required: bool,
    /// Delivery date is guaranteed.
    pub guaranteed: bool,
}

impl RateOption {
    /// Allowed rounding difference between the total and its components.
    pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Returns the carrier recovered from the rate id's tag.
    #[must_use]
    pub fn owning_carrier(&self) -> &'static str {
        carrier_from_id(&self.rate_id)
    }

    /// Returns true if base + fuel + taxes equals the total within
    /// [`Self::TOLERANCE`].
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let sum = self.base_rate.amount() + self.fuel_surcharge.amount() + self.taxes.amount();
        (sum - self.total_price.amount()).abs() <= Self::TOLERANCE
    }
}

//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`Money`]: non-negative decimal amount with currency
//! - [`Timestamp`]: UTC point in time
//! - [`CarrierTag`]: carrier prefix embedded in rate and order ids
//! - [`RequestContext`]: cancellation and deadline carried by each call
//! - Enums: [`ShipmentStatus`], [`ServiceType`], [`PackageType`],
//!   [`WeightUnit`], [`DimensionUnit`], [`LabelFormat`]

pub mod context;
pub mod enums;
pub mod ids;
pub mod money;
pub mod timestamp;

pub use context::RequestContext;
pub use enums::{
    DimensionUnit, LabelFormat, PackageType, ParseEnumError, ServiceType, ShipmentStatus,
    WeightUnit,
};
pub use ids::{CarrierTag, carrier_from_id};
pub use money::{Money, MoneyError};
pub use timestamp::Timestamp;

//! # Domain Enums
//!
//! Enumeration types for shipping concepts.
//!
//! - [`ShipmentStatus`] - Normalized shipment lifecycle state
//! - [`ServiceType`] - Carrier-independent service classification
//! - [`PackageType`] - Physical package kind
//! - [`WeightUnit`] / [`DimensionUnit`] - Measurement units
//! - [`LabelFormat`] - Label document format
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits. Serialized forms are lowercase.
//! The measurement units deserialize leniently: a blank or null unit reads
//! as the default.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized shipment status.
///
/// The lifecycle runs pending → quoted → confirmed → assigned → picked_up →
/// in_transit → out_for_delivery → delivered. `Cancelled` and `Exception`
/// are terminal side states reachable from any non-terminal state. Carriers
/// may skip steps.
///
/// # Examples
///
/// ```
/// use carrier_gateway::domain::value_objects::enums::ShipmentStatus;
///
/// assert_eq!(ShipmentStatus::PickedUp.to_string(), "picked_up");
/// assert!(ShipmentStatus::Delivered.is_terminal());
/// assert!(!ShipmentStatus::InTransit.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Created but not yet confirmed by the carrier.
    #[default]
    Pending,
    /// Rated but not booked.
    Quoted,
    /// Booked with the carrier.
    Confirmed,
    /// Assigned to a driver or route.
    Assigned,
    /// Collected from the sender.
    PickedUp,
    /// Moving through the carrier network.
    InTransit,
    /// On the final delivery vehicle.
    OutForDelivery,
    /// Delivered to the recipient.
    Delivered,
    /// Cancelled or voided.
    Cancelled,
    /// The carrier reported a problem.
    Exception,
}

impl ShipmentStatus {
    /// Returns the lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Quoted => "quoted",
            Self::Confirmed => "confirmed",
            Self::Assigned => "assigned",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Exception => "exception",
        }
    }

    /// Returns true if no further transitions are expected.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Exception)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "quoted" => Ok(Self::Quoted),
            "confirmed" => Ok(Self::Confirmed),
            "assigned" => Ok(Self::Assigned),
            "picked_up" | "pickedup" => Ok(Self::PickedUp),
            "in_transit" | "intransit" => Ok(Self::InTransit),
            "out_for_delivery" | "outfordelivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "exception" => Ok(Self::Exception),
            _ => Err(ParseEnumError::InvalidValue("ShipmentStatus", s.to_string())),
        }
    }
}

/// Carrier-independent service classification.
///
/// # Examples
///
/// ```
/// use carrier_gateway::domain::value_objects::enums::ServiceType;
///
/// let st: ServiceType = "Overnight".parse().unwrap();
/// assert_eq!(st, ServiceType::Overnight);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Ground / regular parcel.
    #[default]
    Standard,
    /// Expedited delivery.
    Express,
    /// Priority delivery.
    Priority,
    /// Next-morning delivery.
    Overnight,
    /// Lowest-cost, slowest service.
    Economy,
    /// LTL / pallet freight.
    Freight,
}

impl ServiceType {
    /// Returns the lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Priority => "priority",
            Self::Overnight => "overnight",
            Self::Economy => "economy",
            Self::Freight => "freight",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "priority" => Ok(Self::Priority),
            "overnight" => Ok(Self::Overnight),
            "economy" => Ok(Self::Economy),
            "freight" => Ok(Self::Freight),
            _ => Err(ParseEnumError::InvalidValue("ServiceType", s.to_string())),
        }
    }
}

/// Physical package kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Rigid box.
    #[default]
    Box,
    /// Document envelope.
    Envelope,
    /// Mailing tube.
    Tube,
    /// Pallet.
    Pallet,
    /// Anything else.
    Custom,
}

impl PackageType {
    /// Returns the lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Envelope => "envelope",
            Self::Tube => "tube",
            Self::Pallet => "pallet",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "box" => Ok(Self::Box),
            "envelope" => Ok(Self::Envelope),
            "tube" => Ok(Self::Tube),
            "pallet" => Ok(Self::Pallet),
            "custom" => Ok(Self::Custom),
            _ => Err(ParseEnumError::InvalidValue("PackageType", s.to_string())),
        }
    }
}

/// Weight measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms.
    #[default]
    Kg,
    /// Pounds.
    Lb,
}

impl WeightUnit {
    const KG_PER_LB: f64 = 0.453_592_37;

    /// Returns the lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Lb => "lb",
        }
    }

    /// Converts a value in this unit to kilograms.
    #[inline]
    #[must_use]
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            Self::Kg => value,
            Self::Lb => value * Self::KG_PER_LB,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WeightUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_unit(deserializer)
    }
}

impl FromStr for WeightUnit {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kg" | "kgs" => Ok(Self::Kg),
            "lb" | "lbs" => Ok(Self::Lb),
            _ => Err(ParseEnumError::InvalidValue("WeightUnit", s.to_string())),
        }
    }
}

/// Dimension measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    /// Centimetres.
    #[default]
    Cm,
    /// Inches.
    In,
}

impl DimensionUnit {
    /// Returns the lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::In => "in",
        }
    }

    /// Converts a value in this unit to centimetres.
    #[inline]
    #[must_use]
    pub fn to_cm(self, value: f64) -> f64 {
        match self {
            Self::Cm => value,
            Self::In => value * 2.54,
        }
    }
}

impl fmt::Display for DimensionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DimensionUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_unit(deserializer)
    }
}

impl FromStr for DimensionUnit {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cm" => Ok(Self::Cm),
            "in" | "inch" | "inches" => Ok(Self::In),
            _ => Err(ParseEnumError::InvalidValue("DimensionUnit", s.to_string())),
        }
    }
}

/// Reads a unit by its `FromStr` spelling, mapping blank or null to the
/// default.
fn deserialize_unit<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = ParseEnumError> + Default,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(serde::de::Error::custom)
        }
        _ => Ok(T::default()),
    }
}

/// Label document format.
///
/// Parsing is lenient: carriers that accept a free-form format fall back to
/// PDF via [`LabelFormat::parse_or_default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelFormat {
    /// PDF document.
    #[default]
    Pdf,
    /// PNG image.
    Png,
    /// Zebra printer language.
    Zpl,
}

impl LabelFormat {
    /// Returns the lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Zpl => "zpl",
        }
    }

    /// Parses a format case-insensitively, defaulting to PDF.
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "zpl" => Ok(Self::Zpl),
            _ => Err(ParseEnumError::InvalidValue("LabelFormat", s.to_string())),
        }
    }
}

/// Error type for parsing enum values from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    InvalidValue(&'static str, String),
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(enum_name, value) => {
                write!(f, "invalid {} value: '{}'", enum_name, value)
            }
        }
    }
}

impl std::error::Error for ParseEnumError {}

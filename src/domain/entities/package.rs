//! # Package
//!
//! A physical parcel with unit-tagged dimensions and weight.

use crate::domain::value_objects::enums::{DimensionUnit, PackageType, WeightUnit};
use crate::domain::value_objects::money::DEFAULT_CURRENCY;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A package to be shipped.
///
/// Omitted units default to cm/kg, the type to box and the currency to CAD.
///
/// # Examples
///
/// ```
/// use carrier_gateway::domain::entities::Package;
/// use carrier_gateway::domain::value_objects::{DimensionUnit, WeightUnit};
///
/// let pkg: Package = serde_json::from_str(r#"{"length":30,"width":20,"height":10,"weight":2.5}"#).unwrap();
/// assert_eq!(pkg.dimension_unit, DimensionUnit::Cm);
/// assert_eq!(pkg.weight_unit, WeightUnit::Kg);
/// assert_eq!(pkg.currency, "CAD");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Caller-side package id.
    pub id: Option<String>,
    /// Length.
    pub length: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Unit of the three dimensions.
    pub dimension_unit: DimensionUnit,
    /// Weight.
    pub weight: f64,
    /// Unit of `weight`.
    pub weight_unit: WeightUnit,
    /// Package kind.
    pub package_type: PackageType,
    /// Contents description.
    pub description: Option<String>,
    /// Declared value for insurance.
    pub declared_value: Option<Decimal>,
    /// Currency of `declared_value`.
    pub currency: String,
}

impl Default for Package {
    fn default() -> Self {
        Self {
            id: None,
            length: 0.0,
            width: 0.0,
            height: 0.0,
            dimension_unit: DimensionUnit::default(),
            weight: 0.0,
            weight_unit: WeightUnit::default(),
            package_type: PackageType::default(),
            description: None,
            declared_value: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Package {
    /// Creates a box with dimensions in cm and weight in kg.
    #[must_use]
    pub fn new(length: f64, width: f64, height: f64, weight: f64) -> Self {
        Self {
            length,
            width,
            height,
            weight,
            ..Self::default()
        }
    }

    /// Returns a copy with an empty currency replaced by CAD.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.currency.trim().is_empty() {
            self.currency = DEFAULT_CURRENCY.to_string();
        }
        self
    }

    /// Returns the weight in kilograms.
    #[must_use]
    pub fn weight_kg(&self) -> f64 {
        self.weight_unit.to_kg(self.weight)
    }

    /// Returns `(length, width, height)` in centimetres.
    #[must_use]
    pub fn dimensions_cm(&self) -> (f64, f64, f64) {
        let u = self.dimension_unit;
        (u.to_cm(self.length), u.to_cm(self.width), u.to_cm(self.height))
    }

    /// Returns true if weight is positive and no dimension is negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weight.is_finite()
            && self.weight > 0.0
            && [self.length, self.width, self.height]
                .iter()
                .all(|d| d.is_finite() && *d >= 0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_currency_normalizes_to_cad() {
        let pkg = Package {
            currency: String::new(),
            ..Package::new(10.0, 10.0, 10.0, 1.0)
        };
        assert_eq!(pkg.normalized().currency, "CAD");
    }

    #[test]
    fn blank_units_deserialize_as_cm_and_kg() {
        let pkg: Package = serde_json::from_str(
            r#"{"length":30,"width":20,"height":10,"weight":2.5,"dimension_unit":"","weight_unit":""}"#,
        )
        .unwrap();
        assert_eq!(pkg.dimension_unit, DimensionUnit::Cm);
        assert_eq!(pkg.weight_unit, WeightUnit::Kg);
    }

    #[test]
    fn unit_conversion() {
        let pkg = Package {
            dimension_unit: DimensionUnit::In,
            weight_unit: WeightUnit::Lb,
            ..Package::new(10.0, 5.0, 2.0, 2.0)
        };
        let (l, w, h) = pkg.dimensions_cm();
        assert!((l - 25.4).abs() < 1e-9);
        assert!((w - 12.7).abs() < 1e-9);
        assert!((h - 5.08).abs() < 1e-9);
        assert!((pkg.weight_kg() - 0.907_184_74).abs() < 1e-9);
    }

    #[test]
    fn validity() {
        assert!(Package::new(10.0, 10.0, 10.0, 1.0).is_valid());
        assert!(Package::new(0.0, 0.0, 0.0, 0.5).is_valid());
        assert!(!Package::new(10.0, 10.0, 10.0, 0.0).is_valid());
        assert!(!Package::new(-1.0, 10.0, 10.0, 1.0).is_valid());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn default_units_are_cm_and_kg(
                l in 0.0f64..500.0,
                w in 0.0f64..500.0,
                h in 0.0f64..500.0,
                kg in 0.01f64..1000.0,
            ) {
                let pkg = Package::new(l, w, h, kg);
                prop_assert_eq!(pkg.dimensions_cm(), (l, w, h));
                prop_assert_eq!(pkg.weight_kg(), kg);
                prop_assert!(pkg.is_valid());
            }

            #[test]
            fn blank_currency_normalizes_to_cad(pad in " {0,4}") {
                let pkg = Package { currency: pad, ..Package::default() }.normalized();
                prop_assert_eq!(pkg.currency, "CAD");
            }
        }
    }
}

//! # Address and Contact
//!
//! Postal address and sender/recipient identity.

use serde::{Deserialize, Serialize};

/// Country assumed when the caller omits one.
///
/// Adapters rely on it to pick domestic vs. international code paths.
pub const DEFAULT_COUNTRY: &str = "CA";

/// A shipping address.
///
/// # Examples
///
/// ```
/// use carrier_gateway::domain::entities::Address;
///
/// let addr: Address = serde_json::from_str(r#"{"city":"Toronto","postal_code":"m5v 3l9"}"#).unwrap();
/// assert_eq!(addr.country(), "CA");
/// assert_eq!(addr.normalized_postal_code(), "M5V3L9");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Addressee name.
    pub name: String,
    /// Company name.
    pub company: Option<String>,
    /// First street line.
    pub line1: String,
    /// Second street line.
    pub line2: String,
    /// City.
    pub city: String,
    /// Province or state code, e.g. `ON`.
    pub province_code: String,
    /// Postal or zip code.
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: Option<String>,
    /// Delivery instructions.
    pub instructions: Option<String>,
    /// Residential delivery.
    pub is_residential: bool,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            name: String::new(),
            company: None,
            line1: String::new(),
            line2: String::new(),
            city: String::new(),
            province_code: String::new(),
            postal_code: String::new(),
            country_code: DEFAULT_COUNTRY.to_string(),
            phone: String::new(),
            email: None,
            instructions: None,
            is_residential: false,
        }
    }
}

impl Address {
    /// Returns the country code, falling back to [`DEFAULT_COUNTRY`].
    #[must_use]
    pub fn country(&self) -> &str {
        let code = self.country_code.trim();
        if code.is_empty() { DEFAULT_COUNTRY } else { code }
    }

    /// Returns true if the address is in Canada.
    #[inline]
    #[must_use]
    pub fn is_domestic(&self) -> bool {
        self.country().eq_ignore_ascii_case(DEFAULT_COUNTRY)
    }

    /// Returns true if carriers need a postal code to rate this address.
    ///
    /// Only Canadian and US addresses are rated by postal or zip code; other
    /// destinations are rated by country alone.
    #[must_use]
    pub fn requires_postal_code(&self) -> bool {
        self.is_domestic() || self.country().eq_ignore_ascii_case("US")
    }

    /// Returns the postal code uppercased with spaces removed.
    #[must_use]
    pub fn normalized_postal_code(&self) -> String {
        normalize_postal_code(&self.postal_code)
    }

    /// Returns a copy with the country defaulted and uppercased.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.country_code = self.country().to_uppercase();
        self
    }
}

/// Uppercases a postal code and strips whitespace.
#[must_use]
pub fn normalize_postal_code(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Sender or recipient identity, distinct from the postal address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    /// Contact name.
    pub name: String,
    /// Company name.
    pub company: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Tax id for customs.
    pub tax_id: Option<String>,
}

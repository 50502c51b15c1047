//! # Carrier-Tagged Identifiers
//!
//! Rate and order ids are opaque strings prefixed with a short carrier tag.
//! The prefix is the only routing information: a bare id is mapped back to
//! its owning carrier by literal, case-sensitive prefix match. The `-`
//! separator is part of the tag.
//!
//! | Carrier      | Tag     |
//! |--------------|---------|
//! | `freightcom` | `fc-`   |
//! | `canadapost` | `cp-`   |
//! | `purolator`  | `puro-` |
//!
//! # Examples
//!
//! ```
//! use carrier_gateway::domain::value_objects::ids::{carrier_from_id, CarrierTag};
//!
//! assert_eq!(carrier_from_id("fc-101-abc"), "freightcom");
//! assert_eq!(carrier_from_id("puro-329012345678"), "purolator");
//! assert_eq!(carrier_from_id("FC-101"), "unknown");
//!
//! let id = CarrierTag::CanadaPost.tag("123456");
//! assert_eq!(id, "cp-123456");
//! assert_eq!(CarrierTag::CanadaPost.strip(&id), "123456");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Registry name of the Freightcom adapter.
pub const FREIGHTCOM: &str = "freightcom";
/// Registry name of the Canada Post adapter.
pub const CANADAPOST: &str = "canadapost";
/// Registry name of the Purolator adapter.
pub const PUROLATOR: &str = "purolator";
/// Returned when no carrier tag matches an id.
pub const UNKNOWN_CARRIER: &str = "unknown";

/// Carrier tag embedded at the start of rate and order ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierTag {
    /// `fc-`
    Freightcom,
    /// `cp-`
    CanadaPost,
    /// `puro-`
    Purolator,
}

impl CarrierTag {
    /// All known tags.
    pub const ALL: [Self; 3] = [Self::Freightcom, Self::CanadaPost, Self::Purolator];

    /// Returns the literal prefix, separator included.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Freightcom => "fc-",
            Self::CanadaPost => "cp-",
            Self::Purolator => "puro-",
        }
    }

    /// Returns the registry name of the owning carrier.
    #[must_use]
    pub const fn carrier_name(self) -> &'static str {
        match self {
            Self::Freightcom => FREIGHTCOM,
            Self::CanadaPost => CANADAPOST,
            Self::Purolator => PUROLATOR,
        }
    }

    /// Resolves the tag an id starts with.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| id.starts_with(t.prefix()))
    }

    /// Prefixes a raw carrier id with this tag.
    ///
    /// An id that already carries the tag is returned unchanged.
    #[must_use]
    pub fn tag(self, raw: &str) -> String {
        if raw.starts_with(self.prefix()) {
            raw.to_string()
        } else {
            format!("{}{}", self.prefix(), raw)
        }
    }

    /// Removes this tag from an id, returning the carrier's raw id.
    ///
    /// Ids without the tag are returned unchanged.
    #[must_use]
    pub fn strip(self, id: &str) -> &str {
        id.strip_prefix(self.prefix()).unwrap_or(id)
    }
}

impl fmt::Display for CarrierTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Maps a rate or order id to its owning carrier name.
///
/// Returns [`UNKNOWN_CARRIER`] when no tag matches.
#[must_use]
pub fn carrier_from_id(id: &str) -> &'static str {
    CarrierTag::from_id(id).map_or(UNKNOWN_CARRIER, CarrierTag::carrier_name)
}

/// Returns the first eight characters of a fresh UUID.
#[must_use]
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_prefixes() {
        assert_eq!(carrier_from_id("fc-12345"), FREIGHTCOM);
        assert_eq!(carrier_from_id("cp-DOM.RP-20240101120000"), CANADAPOST);
        assert_eq!(carrier_from_id("puro-PurolatorGround-20240101120000"), PUROLATOR);
    }

    #[test]
    fn separator_is_part_of_the_tag() {
        assert_eq!(carrier_from_id("fc12345"), UNKNOWN_CARRIER);
        assert_eq!(carrier_from_id("cp_123"), UNKNOWN_CARRIER);
        assert_eq!(carrier_from_id("puro"), UNKNOWN_CARRIER);
        assert_eq!(carrier_from_id(""), UNKNOWN_CARRIER);
    }

    #[test]
    fn match_is_case_sensitive_and_anchored() {
        assert_eq!(carrier_from_id("CP-123"), UNKNOWN_CARRIER);
        assert_eq!(carrier_from_id(" fc-1"), UNKNOWN_CARRIER);
        assert_eq!(carrier_from_id("x-fc-1"), UNKNOWN_CARRIER);
    }

    #[test]
    fn tag_is_idempotent() {
        let once = CarrierTag::Purolator.tag("329");
        assert_eq!(CarrierTag::Purolator.tag(&once), "puro-329");
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(short_id().len(), 8);
    }

    proptest! {
        #[test]
        fn tagged_ids_route_to_their_carrier(raw in "[A-Za-z0-9.\\-]{0,24}") {
            for tag in CarrierTag::ALL {
                let id = tag.tag(&raw);
                prop_assert_eq!(carrier_from_id(&id), tag.carrier_name());
                prop_assert!(id.starts_with(tag.prefix()));
            }
        }

        #[test]
        fn strip_undoes_tag(raw in "[0-9A-Z]{1,16}") {
            for tag in CarrierTag::ALL {
                let id = tag.tag(&raw);
                prop_assert_eq!(tag.strip(&id), raw.as_str());
            }
        }

        #[test]
        fn untagged_ids_are_unknown(raw in "[A-Z0-9_]{0,16}") {
            prop_assert_eq!(carrier_from_id(&raw), UNKNOWN_CARRIER);
        }
    }
}

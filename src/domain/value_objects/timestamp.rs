//! # Timestamp Value Object
//!
//! UTC point in time used for rate expiry, delivery estimates and tracking
//! events.
//!
//! # Examples
//!
//! ```
//! use carrier_gateway::domain::value_objects::timestamp::Timestamp;
//!
//! let now = Timestamp::now();
//! let later = now.add_mins(30);
//!
//! assert!(later.is_after(&now));
//! assert!(!later.is_expired());
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Compact format used inside carrier rate ids: `YYYYMMDDhhmmss`.
    pub const COMPACT_FORMAT: &'static str = "%Y%m%d%H%M%S";

    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use carrier_gateway::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_secs(1704067200).unwrap();
    /// assert_eq!(ts.to_compact(), "20240101000000");
    /// ```
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Parses an RFC 3339 timestamp such as `2024-01-15T10:30:00Z`.
    #[must_use]
    pub fn parse_rfc3339(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Parses a calendar date (`YYYY-MM-DD`) as midnight UTC.
    #[must_use]
    pub fn parse_date(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(Utc.from_utc_datetime(&dt)))
    }

    /// Parses an RFC 3339 timestamp, a zone-less `YYYY-MM-DDThh:mm:ss`
    /// (read as UTC) or a bare date.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Option<Self> {
        Self::parse_rfc3339(s)
            .or_else(|| {
                NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|dt| Self(Utc.from_utc_datetime(&dt)))
            })
            .or_else(|| Self::parse_date(s))
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Returns the Unix timestamp in nanoseconds, if representable.
    #[inline]
    #[must_use]
    pub fn timestamp_nanos(&self) -> Option<i64> {
        self.0.timestamp_nanos_opt()
    }

    /// Adds seconds to the timestamp.
    #[must_use]
    pub fn add_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Adds minutes to the timestamp.
    #[must_use]
    pub fn add_mins(&self, mins: i64) -> Self {
        Self(self.0 + Duration::minutes(mins))
    }

    /// Adds whole days to the timestamp.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns true if this timestamp is in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.0 < Utc::now()
    }

    /// Returns true if this timestamp is before another.
    #[inline]
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Formats as `YYYYMMDDhhmmss`.
    #[must_use]
    pub fn to_compact(&self) -> String {
        self.0.format(Self::COMPACT_FORMAT).to_string()
    }

    /// Formats as `YYYY-MM-DD`.
    #[must_use]
    pub fn to_date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Formats as ISO 8601.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Returns the underlying DateTime.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn rfc3339_with_offset() {
            let ts = Timestamp::parse_rfc3339("2024-01-15T10:30:00-05:00").unwrap();
            assert_eq!(ts.to_compact(), "20240115153000");
        }

        #[test]
        fn bare_date() {
            let ts = Timestamp::parse_date("2024-03-01").unwrap();
            assert_eq!(ts.to_date_string(), "2024-03-01");
            assert_eq!(Timestamp::parse_lenient("2024-03-01"), Some(ts));
        }

        #[test]
        fn zoneless_datetime_is_utc() {
            let ts = Timestamp::parse_lenient("2024-06-01T14:30:00").unwrap();
            assert_eq!(ts.to_compact(), "20240601143000");
        }

        #[test]
        fn garbage_is_none() {
            assert!(Timestamp::parse_lenient("tomorrow").is_none());
            assert!(Timestamp::parse_lenient("").is_none());
        }
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn add_units() {
            let ts = Timestamp::from_secs(0).unwrap();
            assert_eq!(ts.add_secs(90).timestamp_secs(), 90);
            assert_eq!(ts.add_mins(30).timestamp_secs(), 1800);
            assert_eq!(ts.add_days(2).timestamp_secs(), 172_800);
        }

        #[test]
        fn expiry() {
            assert!(Timestamp::from_secs(0).unwrap().is_expired());
            assert!(!Timestamp::now().add_mins(5).is_expired());
        }
    }

    #[test]
    fn serde_is_transparent() {
        let ts = Timestamp::from_secs(1704067200).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-01T00:00:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}

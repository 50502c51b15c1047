//! # Carrier Errors
//!
//! Structured error type shared by every carrier adapter.
//!
//! Every wire-level failure (HTTP status, SOAP fault, XML error block, JSON
//! error field) is converted into a [`CarrierError`] at the adapter boundary.
//! Errors compare equal when their machine-readable codes match, so callers
//! can match on a class of failure regardless of which carrier produced it.
//!
//! # Examples
//!
//! ```
//! use carrier_gateway::domain::error::{CarrierError, Sentinel};
//!
//! let fc = CarrierError::from_sentinel("freightcom", Sentinel::InvalidAddress);
//! let cp = CarrierError::new("canadapost", "INVALID_ADDRESS", "postal code rejected");
//! assert_eq!(fc, cp);
//! assert!(cp.is(Sentinel::InvalidAddress));
//!
//! let limited = CarrierError::from_sentinel("purolator", Sentinel::RateLimitExceeded);
//! assert!(limited.is_retryable());
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Well-known error codes produced by the adapters.
pub mod codes {
    /// The address is invalid or incomplete.
    pub const INVALID_ADDRESS: &str = "INVALID_ADDRESS";
    /// The carrier service is temporarily unavailable.
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    /// The quote has expired.
    pub const QUOTE_EXPIRED: &str = "QUOTE_EXPIRED";
    /// The quote id is unknown.
    pub const QUOTE_NOT_FOUND: &str = "QUOTE_NOT_FOUND";
    /// The order id is unknown.
    pub const ORDER_NOT_FOUND: &str = "ORDER_NOT_FOUND";
    /// The order can no longer be cancelled.
    pub const CANCELLATION_NOT_ALLOWED: &str = "CANCELLATION_NOT_ALLOWED";
    /// The label is not yet available.
    pub const LABEL_NOT_AVAILABLE: &str = "LABEL_NOT_AVAILABLE";
    /// The carrier rejected the credentials.
    pub const AUTHENTICATION_FAILED: &str = "AUTHENTICATION_FAILED";
    /// The carrier rate limit was exceeded.
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
    /// Package dimensions or weight are invalid.
    pub const INVALID_PACKAGE: &str = "INVALID_PACKAGE";
    /// The requested carrier is not registered.
    pub const CARRIER_NOT_FOUND: &str = "CARRIER_NOT_FOUND";

    /// An asynchronous poll loop ran past its deadline.
    pub const TIMEOUT: &str = "TIMEOUT";
    /// The carrier reported a failed rate request.
    pub const RATE_ERROR: &str = "RATE_ERROR";
    /// The carrier reported a failed shipment.
    pub const SHIPMENT_ERROR: &str = "SHIPMENT_ERROR";
    /// The carrier returned a status the adapter does not understand.
    pub const UNKNOWN_STATUS: &str = "UNKNOWN_STATUS";
    /// The carrier response could not be decoded.
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    /// The outbound request could not be encoded.
    pub const ENCODE_ERROR: &str = "ENCODE_ERROR";
    /// No usable label document was returned.
    pub const LABEL_NOT_FOUND: &str = "LABEL_NOT_FOUND";
    /// No tracking information matched the request.
    pub const TRACKING_NOT_FOUND: &str = "TRACKING_NOT_FOUND";
    /// Failure injected by a mock transport.
    pub const MOCK_ERROR: &str = "MOCK_ERROR";
    /// Transport-level connection failure.
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    /// The HTTP client timed out waiting for a response.
    pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";
    /// The request context was cancelled.
    pub const CANCELLED: &str = "CANCELLED";
    /// The request context deadline elapsed.
    pub const DEADLINE_EXCEEDED: &str = "DEADLINE_EXCEEDED";
    /// The operation is not supported by this carrier.
    pub const UNSUPPORTED: &str = "UNSUPPORTED";

    /// Builds the generic `HTTP_{status}` code.
    #[must_use]
    pub fn http(status: u16) -> String {
        format!("HTTP_{status}")
    }
}

/// Sentinel failure conditions shared across carriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// The address is invalid or incomplete.
    InvalidAddress,
    /// The carrier service is temporarily unavailable.
    ServiceUnavailable,
    /// The quote has expired and cannot be used.
    QuoteExpired,
    /// The quote id was not found.
    QuoteNotFound,
    /// The order id was not found.
    OrderNotFound,
    /// The order cannot be cancelled.
    CancellationNotAllowed,
    /// The label is not yet available.
    LabelNotAvailable,
    /// Carrier authentication failed.
    AuthenticationFailed,
    /// The carrier rate limit was exceeded.
    RateLimitExceeded,
    /// Package dimensions or weight are invalid.
    InvalidPackage,
    /// The requested carrier is not registered.
    CarrierNotFound,
}

impl Sentinel {
    /// Returns the machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidAddress => codes::INVALID_ADDRESS,
            Self::ServiceUnavailable => codes::SERVICE_UNAVAILABLE,
            Self::QuoteExpired => codes::QUOTE_EXPIRED,
            Self::QuoteNotFound => codes::QUOTE_NOT_FOUND,
            Self::OrderNotFound => codes::ORDER_NOT_FOUND,
            Self::CancellationNotAllowed => codes::CANCELLATION_NOT_ALLOWED,
            Self::LabelNotAvailable => codes::LABEL_NOT_AVAILABLE,
            Self::AuthenticationFailed => codes::AUTHENTICATION_FAILED,
            Self::RateLimitExceeded => codes::RATE_LIMIT_EXCEEDED,
            Self::InvalidPackage => codes::INVALID_PACKAGE,
            Self::CarrierNotFound => codes::CARRIER_NOT_FOUND,
        }
    }

    /// Returns the canonical human-readable message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidAddress => "invalid address",
            Self::ServiceUnavailable => "service unavailable",
            Self::QuoteExpired => "quote has expired",
            Self::QuoteNotFound => "quote not found",
            Self::OrderNotFound => "order not found",
            Self::CancellationNotAllowed => "cancellation not allowed",
            Self::LabelNotAvailable => "label not available",
            Self::AuthenticationFailed => "authentication failed",
            Self::RateLimitExceeded => "rate limit exceeded",
            Self::InvalidPackage => "invalid package",
            Self::CarrierNotFound => "carrier not found",
        }
    }

    /// Returns true if this condition is retryable by default.
    #[inline]
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ServiceUnavailable | Self::RateLimitExceeded)
    }

    /// Looks up the sentinel for a code, if there is one.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// All sentinel conditions.
    pub const ALL: [Self; 11] = [
        Self::InvalidAddress,
        Self::ServiceUnavailable,
        Self::QuoteExpired,
        Self::QuoteNotFound,
        Self::OrderNotFound,
        Self::CancellationNotAllowed,
        Self::LabelNotAvailable,
        Self::AuthenticationFailed,
        Self::RateLimitExceeded,
        Self::InvalidPackage,
        Self::CarrierNotFound,
    ];
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Error returned by carrier operations.
///
/// Carries the carrier name, a machine-readable code, a human message, the
/// HTTP status when one was involved, an optional explicit retryable flag
/// and an optional wrapped cause.
#[derive(Clone)]
pub struct CarrierError {
    carrier: String,
    code: String,
    message: String,
    status_code: Option<u16>,
    retryable: Option<bool>,
    cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl CarrierError {
    /// Creates a new error.
    #[must_use]
    pub fn new(
        carrier: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            carrier: carrier.into(),
            code: code.into(),
            message: message.into(),
            status_code: None,
            retryable: None,
            cause: None,
        }
    }

    /// Creates an error for a sentinel condition.
    #[must_use]
    pub fn from_sentinel(carrier: impl Into<String>, sentinel: Sentinel) -> Self {
        Self::new(carrier, sentinel.code(), sentinel.message())
    }

    /// Creates a `CARRIER_NOT_FOUND` error naming the missing carrier.
    #[must_use]
    pub fn carrier_not_found(name: impl Into<String>) -> Self {
        Self::from_sentinel(name, Sentinel::CarrierNotFound)
    }

    /// Creates an error from a non-success HTTP status.
    ///
    /// 401/403 become `AUTHENTICATION_FAILED`, 429 becomes
    /// `RATE_LIMIT_EXCEEDED`, everything else `HTTP_{status}`. 429 and 5xx
    /// are retryable.
    #[must_use]
    pub fn http_status(carrier: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            401 | 403 => codes::AUTHENTICATION_FAILED.to_string(),
            429 => codes::RATE_LIMIT_EXCEEDED.to_string(),
            _ => codes::http(status),
        };
        Self::new(carrier, code, message)
            .with_status_code(status)
            .with_retryable(status == 429 || status >= 500)
    }

    /// Creates a `TIMEOUT` error for an elapsed poll deadline.
    #[must_use]
    pub fn timeout(carrier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(carrier, codes::TIMEOUT, message)
    }

    /// Creates a `PARSE_ERROR` error.
    #[must_use]
    pub fn parse(carrier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(carrier, codes::PARSE_ERROR, message)
    }

    /// Creates a `CANCELLED` error.
    #[must_use]
    pub fn cancelled(carrier: impl Into<String>) -> Self {
        Self::new(carrier, codes::CANCELLED, "request cancelled").with_retryable(false)
    }

    /// Creates a `DEADLINE_EXCEEDED` error.
    #[must_use]
    pub fn deadline_exceeded(carrier: impl Into<String>) -> Self {
        Self::new(carrier, codes::DEADLINE_EXCEEDED, "request deadline exceeded")
            .with_retryable(false)
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Attaches the HTTP status code.
    #[must_use]
    pub fn with_status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Sets the explicit retryable flag.
    #[must_use]
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    /// Returns a copy attributed to the given carrier.
    #[must_use]
    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = carrier.into();
        self
    }

    /// Returns the carrier name.
    #[inline]
    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// Returns the machine-readable code.
    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status code, if any.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Returns true if the operation may succeed when retried.
    ///
    /// The explicit flag wins; without one only `SERVICE_UNAVAILABLE` and
    /// `RATE_LIMIT_EXCEEDED` are retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.retryable {
            Some(flag) => flag,
            None => Sentinel::from_code(&self.code).is_some_and(Sentinel::is_retryable),
        }
    }

    /// Returns true if this error has the sentinel's code.
    #[inline]
    #[must_use]
    pub fn is(&self, sentinel: Sentinel) -> bool {
        self.code == sentinel.code()
    }

    /// Returns the sentinel matching this error's code, if any.
    #[must_use]
    pub fn sentinel(&self) -> Option<Sentinel> {
        Sentinel::from_code(&self.code)
    }
}

impl PartialEq for CarrierError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for CarrierError {}

impl fmt::Debug for CarrierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarrierError")
            .field("carrier", &self.carrier)
            .field("code", &self.code)
            .field("message", &self.message)
            .field("status_code", &self.status_code)
            .field("retryable", &self.retryable)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl fmt::Display for CarrierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.carrier.is_empty() {
            write!(f, "error ({}): {}", self.code, self.message)?;
        } else {
            write!(f, "{} error ({}): {}", self.carrier, self.code, self.message)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl StdError for CarrierError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn StdError + 'static))
    }
}

impl From<Sentinel> for CarrierError {
    fn from(sentinel: Sentinel) -> Self {
        Self::from_sentinel(String::new(), sentinel)
    }
}

/// Result type for carrier operations.
pub type CarrierResult<T> = Result<T, CarrierError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod display {
        use super::*;

        #[test]
        fn includes_carrier_code_and_message() {
            let err = CarrierError::new("freightcom", "RATE_ERROR", "no rates");
            assert_eq!(err.to_string(), "freightcom error (RATE_ERROR): no rates");
        }

        #[test]
        fn appends_cause() {
            let io = std::io::Error::other("connection reset");
            let err = CarrierError::new("canadapost", "NETWORK_ERROR", "send failed").with_cause(io);
            assert_eq!(
                err.to_string(),
                "canadapost error (NETWORK_ERROR): send failed: connection reset"
            );
            assert!(err.source().is_some());
        }

        #[test]
        fn omits_empty_carrier() {
            let err = CarrierError::from(Sentinel::CarrierNotFound);
            assert_eq!(err.to_string(), "error (CARRIER_NOT_FOUND): carrier not found");
        }
    }

    mod equality {
        use super::*;

        #[test]
        fn matches_on_code_only() {
            let a = CarrierError::new("freightcom", codes::INVALID_ADDRESS, "bad street");
            let b = CarrierError::new("canadapost", codes::INVALID_ADDRESS, "bad postal code");
            assert_eq!(a, b);
            assert!(a.is(Sentinel::InvalidAddress));
            assert!(b.is(Sentinel::InvalidAddress));
        }

        #[test]
        fn different_codes_differ() {
            let a = CarrierError::new("freightcom", codes::INVALID_ADDRESS, "x");
            let b = CarrierError::new("freightcom", codes::INVALID_PACKAGE, "x");
            assert_ne!(a, b);
            assert!(!a.is(Sentinel::InvalidPackage));
        }
    }

    mod retryable {
        use super::*;

        #[test]
        fn sentinel_defaults() {
            for sentinel in Sentinel::ALL {
                let err = CarrierError::from_sentinel("x", sentinel);
                assert_eq!(err.is_retryable(), sentinel.is_retryable(), "{sentinel:?}");
            }
            assert!(CarrierError::from_sentinel("x", Sentinel::ServiceUnavailable).is_retryable());
            assert!(!CarrierError::from_sentinel("x", Sentinel::InvalidAddress).is_retryable());
        }

        #[test]
        fn explicit_flag_wins() {
            let err = CarrierError::from_sentinel("x", Sentinel::RateLimitExceeded)
                .with_retryable(false);
            assert!(!err.is_retryable());

            let err = CarrierError::new("x", "HTTP_400", "bad").with_retryable(true);
            assert!(err.is_retryable());
        }

        #[test]
        fn unknown_code_without_flag_is_not_retryable() {
            assert!(!CarrierError::new("x", codes::PARSE_ERROR, "bad xml").is_retryable());
        }
    }

    mod http_status {
        use super::*;

        #[test]
        fn maps_auth_and_rate_limit() {
            let err = CarrierError::http_status("x", 401, "nope");
            assert!(err.is(Sentinel::AuthenticationFailed));
            assert!(!err.is_retryable());

            let err = CarrierError::http_status("x", 429, "slow down");
            assert!(err.is(Sentinel::RateLimitExceeded));
            assert!(err.is_retryable());
            assert_eq!(err.status_code(), Some(429));
        }

        #[test]
        fn server_errors_are_retryable() {
            let err = CarrierError::http_status("x", 503, "down");
            assert_eq!(err.code(), "HTTP_503");
            assert!(err.is_retryable());

            let err = CarrierError::http_status("x", 404, "missing");
            assert_eq!(err.code(), "HTTP_404");
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn sentinel_round_trips_through_code() {
        for sentinel in Sentinel::ALL {
            assert_eq!(Sentinel::from_code(sentinel.code()), Some(sentinel));
        }
        assert_eq!(Sentinel::from_code("NOPE"), None);
    }
}

//! # HTTP Client Utilities
//!
//! Shared HTTP client for the carrier transports.
//!
//! This module provides a thin wrapper around [`reqwest::Client`] with:
//! - Configurable timeouts
//! - Default headers (auth, content negotiation) set once per transport
//! - Context-aware sends that stop on cancellation or deadline
//! - Uniform mapping of transport failures into [`CarrierError`]
//!
//! Carrier protocols differ in how they encode error bodies, so [`send`]
//! returns the raw status and body for every response and leaves status
//! interpretation to the caller.
//!
//! [`send`]: HttpClient::send
//!
//! # Examples
//!
//! ```ignore
//! use carrier_gateway::infrastructure::carriers::http_client::HttpClient;
//! use reqwest::Method;
//!
//! let client = HttpClient::new("freightcom", 30_000)?;
//! let reply = client
//!     .send(&ctx, client.request(Method::GET, "https://api.example.com/rate/42"))
//!     .await?;
//! ```

use crate::domain::error::{CarrierError, CarrierResult, codes};
use crate::domain::value_objects::RequestContext;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default request timeout when a transport is not configured otherwise.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// HTTP client wrapper bound to one carrier.
///
/// Errors raised by the client are attributed to that carrier.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Carrier name used on errors.
    carrier: String,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `NETWORK_ERROR` if the client cannot be created.
    pub fn new(carrier: impl Into<String>, timeout_ms: u64) -> CarrierResult<Self> {
        Self::with_headers(carrier, timeout_ms, HeaderMap::new())
    }

    /// Creates a new HTTP client sending `default_headers` on every request.
    ///
    /// # Errors
    ///
    /// Returns `NETWORK_ERROR` if the client cannot be created.
    pub fn with_headers(
        carrier: impl Into<String>,
        timeout_ms: u64,
        default_headers: HeaderMap,
    ) -> CarrierResult<Self> {
        let carrier = carrier.into();
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                CarrierError::new(
                    carrier.clone(),
                    codes::NETWORK_ERROR,
                    format!("Failed to create HTTP client: {e}"),
                )
                .with_cause(e)
            })?;

        Ok(Self {
            client,
            carrier,
            timeout_ms,
        })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Returns the carrier this client reports errors for.
    #[inline]
    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// Starts a request.
    #[must_use]
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Sends a request and buffers the whole response body.
    ///
    /// Non-success statuses are not errors here; inspect
    /// [`HttpReply::status`].
    ///
    /// # Errors
    ///
    /// Returns `CANCELLED` / `DEADLINE_EXCEEDED` from the context,
    /// `REQUEST_TIMEOUT` when the client timeout elapses, and `NETWORK_ERROR`
    /// for connection and body read failures.
    pub async fn send(&self, ctx: &RequestContext, builder: RequestBuilder) -> CarrierResult<HttpReply> {
        ctx.run(&self.carrier, async {
            let response = builder
                .send()
                .await
                .map_err(|e| self.map_reqwest_error(e))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| self.map_reqwest_error(e))?;
            Ok(HttpReply { status, body })
        })
        .await
    }

    /// Maps a reqwest error to a retryable carrier error.
    fn map_reqwest_error(&self, error: reqwest::Error) -> CarrierError {
        let (code, message) = if error.is_timeout() {
            (codes::REQUEST_TIMEOUT, "Request timed out".to_string())
        } else if error.is_connect() {
            (codes::NETWORK_ERROR, format!("Connection failed: {error}"))
        } else {
            (codes::NETWORK_ERROR, format!("HTTP request failed: {error}"))
        };
        CarrierError::new(self.carrier.clone(), code, message)
            .with_retryable(true)
            .with_cause(error)
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    status: u16,
    body: Bytes,
}

impl HttpReply {
    /// Creates a reply from parts.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code.
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true for 2xx statuses.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Raw body bytes.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the reply, returning the body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `PARSE_ERROR` attributed to `carrier` when decoding fails.
    pub fn json<T: DeserializeOwned>(&self, carrier: &str) -> CarrierResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            CarrierError::parse(carrier, format!("Failed to parse response: {e}")).with_cause(e)
        })
    }
}

/// Builds a sensitive header value, hidden from debug output.
///
/// # Errors
///
/// Returns `ENCODE_ERROR` when the value contains characters not allowed in
/// a header.
pub fn sensitive_header(carrier: &str, value: &str) -> CarrierResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|e| {
        CarrierError::new(carrier, codes::ENCODE_ERROR, format!("Invalid header value: {e}"))
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Builds an HTTP Basic `Authorization` value.
///
/// With no password the user alone is encoded, which is how key-only
/// credentials are sent.
///
/// # Errors
///
/// Returns `ENCODE_ERROR` when the encoded value is not a valid header.
pub fn basic_auth(carrier: &str, user: &str, password: Option<&str>) -> CarrierResult<HeaderValue> {
    let raw = match password {
        Some(p) if !p.is_empty() => format!("{user}:{p}"),
        _ => user.to_string(),
    };
    sensitive_header(carrier, &format!("Basic {}", BASE64.encode(raw)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn new_client() {
        let client = HttpClient::new("freightcom", 5000);
        assert!(client.is_ok());
        let client = client.unwrap();
        assert_eq!(client.timeout_ms(), 5000);
        assert_eq!(client.carrier(), "freightcom");
    }

    #[test]
    fn with_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Custom", "value".parse().unwrap());
        let client = HttpClient::with_headers("canadapost", 3000, headers);
        assert!(client.is_ok());
    }

    mod auth {
        use super::*;

        #[test]
        fn key_and_secret() {
            let header = basic_auth("cp", "user", Some("pass")).unwrap();
            assert_eq!(header.to_str().unwrap(), "Basic dXNlcjpwYXNz");
            assert!(header.is_sensitive());
        }

        #[test]
        fn key_only() {
            let header = basic_auth("cp", "user", None).unwrap();
            assert_eq!(header.to_str().unwrap(), "Basic dXNlcg==");
            let empty_secret = basic_auth("cp", "user", Some("")).unwrap();
            assert_eq!(header, empty_secret);
        }

        #[test]
        fn rejects_control_characters() {
            let err = sensitive_header("fc", "bad\nvalue").unwrap_err();
            assert_eq!(err.code(), codes::ENCODE_ERROR);
        }
    }

    mod reply {
        use super::*;

        #[test]
        fn success_range() {
            assert!(HttpReply::new(204, Bytes::new()).is_success());
            assert!(!HttpReply::new(302, Bytes::new()).is_success());
        }

        #[test]
        fn json_parse_error_is_attributed() {
            let reply = HttpReply::new(200, "not json");
            let err = reply.json::<serde_json::Value>("freightcom").unwrap_err();
            assert_eq!(err.code(), codes::PARSE_ERROR);
            assert_eq!(err.carrier(), "freightcom");
        }

        #[test]
        fn text_is_lossy() {
            let reply = HttpReply::new(500, vec![b'o', b'k', 0xff]);
            assert!(reply.text().starts_with("ok"));
        }
    }
}

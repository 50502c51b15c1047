//! # Canada Post HTTP Transport
//!
//! Live [`CanadaPostApi`] over the XML REST gateway. Every call carries
//! Basic credentials and `Accept-Language: en-CA`; the vendor media type is
//! sent as both `Content-Type` and `Accept` where the endpoint defines one.

use super::adapter::CanadaPostConfig;
use super::api::{
    CanadaPostApi, LabelResponse, RatesRequest, RatesResponse, ShipmentRequest, ShipmentResponse,
    TrackingResponse, VoidResponse,
};
use super::documents::{MailingScenario, Messages, PriceQuotes, ShipmentDocument, ShipmentInfo, TrackingSummary};
use crate::domain::error::{CarrierError, CarrierResult, codes};
use crate::domain::value_objects::ids::CANADAPOST;
use crate::domain::value_objects::{RequestContext, Timestamp};
use crate::infrastructure::carriers::http_client::{HttpClient, HttpReply, basic_auth};
use crate::infrastructure::carriers::xml::{XmlError, from_xml, to_xml};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

const RATE_MEDIA_TYPE: &str = "application/vnd.cpc.ship.rate-v4+xml";
const SHIPMENT_MEDIA_TYPE: &str = "application/vnd.cpc.shipment-v8+xml";
const TRACK_MEDIA_TYPE: &str = "application/vnd.cpc.track-v2+xml";

/// Canada Post transport backed by [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpCanadaPostApi {
    http: HttpClient,
    base_url: String,
    account_id: String,
}

impl HttpCanadaPostApi {
    /// Creates a transport from the carrier settings.
    ///
    /// # Errors
    ///
    /// Returns `ENCODE_ERROR` for credentials that are not a valid header
    /// value and `NETWORK_ERROR` if the client cannot be built.
    pub fn new(config: &CanadaPostConfig) -> CarrierResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            basic_auth(CANADAPOST, &config.api_key, Some(&config.api_secret))?,
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-CA"));

        let timeout_ms = u64::try_from(config.http_timeout.as_millis()).unwrap_or(u64::MAX);
        Ok(Self {
            http: HttpClient::with_headers(CANADAPOST, timeout_ms, headers)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request; `media_type` becomes `Accept`, and also
    /// `Content-Type` when a body is present.
    async fn call(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        media_type: Option<&str>,
        body: Option<String>,
    ) -> CarrierResult<HttpReply> {
        let mut builder = self.http.request(method, &self.url(path));
        if let Some(media_type) = media_type {
            builder = builder.header(ACCEPT, media_type);
            if body.is_some() {
                builder = builder.header(CONTENT_TYPE, media_type);
            }
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        self.http.send(ctx, builder).await
    }
}

#[async_trait]
impl CanadaPostApi for HttpCanadaPostApi {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        req: &RatesRequest,
    ) -> CarrierResult<RatesResponse> {
        let body = encode(&MailingScenario::from(req))?;
        let reply = self
            .call(ctx, Method::POST, "/rs/ship/price", Some(RATE_MEDIA_TYPE), Some(body))
            .await?;
        if reply.status() != 200 {
            return Err(parse_error(&reply));
        }
        let quotes: PriceQuotes = decode(&reply)?;
        let nanos = Timestamp::now().timestamp_nanos().unwrap_or_default();
        Ok(RatesResponse {
            quote_id: format!("cp-quote-{nanos}"),
            rates: quotes.into_rates(),
        })
    }

    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse> {
        let body = encode(&ShipmentDocument::from(req))?;
        let path = format!("/rs/{}/{}/shipment", self.account_id, req.group_id);
        let reply = self
            .call(ctx, Method::POST, &path, Some(SHIPMENT_MEDIA_TYPE), Some(body))
            .await?;
        if !matches!(reply.status(), 200 | 201) {
            return Err(parse_error(&reply));
        }
        let info: ShipmentInfo = decode(&reply)?;
        Ok(info.into())
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        media_type: &str,
    ) -> CarrierResult<LabelResponse> {
        let path = format!("/rs/{}/artifact/{shipment_id}", self.account_id);
        let reply = self
            .call(ctx, Method::GET, &path, Some(media_type), None)
            .await?;
        if reply.status() != 200 {
            return Err(parse_error(&reply));
        }
        Ok(LabelResponse {
            shipment_id: shipment_id.to_string(),
            media_type: media_type.to_string(),
            data: reply.into_body(),
        })
    }

    async fn void_shipment(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
    ) -> CarrierResult<VoidResponse> {
        let path = format!("/rs/{}/shipment/{shipment_id}", self.account_id);
        let reply = self.call(ctx, Method::DELETE, &path, None, None).await?;
        if !matches!(reply.status(), 200 | 204) {
            return Err(parse_error(&reply));
        }
        Ok(VoidResponse {
            shipment_id: shipment_id.to_string(),
            status: "voided".to_string(),
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        tracking_pin: &str,
    ) -> CarrierResult<TrackingResponse> {
        let path = format!("/vis/track/pin/{tracking_pin}/summary");
        let reply = self
            .call(ctx, Method::GET, &path, Some(TRACK_MEDIA_TYPE), None)
            .await?;
        if reply.status() != 200 {
            return Err(parse_error(&reply));
        }
        let summary: TrackingSummary = decode(&reply)?;
        Ok(summary.into())
    }
}

/// Converts a non-success reply into a carrier error, preferring the first
/// `<message>` of a `<messages>` body.
fn parse_error(reply: &HttpReply) -> CarrierError {
    let status = reply.status();
    let first = from_xml::<Messages>(&reply.text())
        .ok()
        .and_then(Messages::first)
        .filter(|m| !m.code.is_empty());
    match first {
        Some(message) => CarrierError::new(CANADAPOST, message.code, message.description)
            .with_status_code(status)
            .with_retryable(status == 429 || status >= 500),
        None => CarrierError::http_status(CANADAPOST, status, reply.text()),
    }
}

fn encode<T: Serialize>(value: &T) -> CarrierResult<String> {
    to_xml(value).map_err(|e| {
        CarrierError::new(
            CANADAPOST,
            codes::ENCODE_ERROR,
            format!("Failed to encode request: {e}"),
        )
        .with_cause(e)
    })
}

fn decode<T: DeserializeOwned>(reply: &HttpReply) -> CarrierResult<T> {
    from_xml(&reply.text()).map_err(|e: XmlError| {
        CarrierError::parse(CANADAPOST, format!("Failed to parse response: {e}")).with_cause(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply::new(status, body.to_string())
    }

    mod errors {
        use super::*;

        #[test]
        fn messages_body_keeps_carrier_code() {
            let body = r#"<?xml version="1.0" encoding="UTF-8"?>
                <messages xmlns="http://www.canadapost.ca/ws/messages">
                  <message><code>9111</code><description>Invalid postal code</description></message>
                </messages>"#;
            let err = parse_error(&reply(400, body));
            assert_eq!(err.code(), "9111");
            assert_eq!(err.message(), "Invalid postal code");
            assert_eq!(err.status_code(), Some(400));
            assert!(!err.is_retryable());
        }

        #[test]
        fn messages_on_5xx_are_retryable() {
            let body = "<messages><message><code>E1</code><description>down</description></message></messages>";
            assert!(parse_error(&reply(503, body)).is_retryable());
        }

        #[test]
        fn unparseable_body_maps_status() {
            let err = parse_error(&reply(401, "Unauthorized"));
            assert_eq!(err.code(), codes::AUTHENTICATION_FAILED);

            let err = parse_error(&reply(404, "<html>not found</html>"));
            assert_eq!(err.code(), "HTTP_404");
            assert_eq!(err.message(), "<html>not found</html>");
        }
    }

    #[test]
    fn malformed_success_body_is_parse_error() {
        let err = decode::<PriceQuotes>(&reply(200, "<price-quotes></shipment-info>")).unwrap_err();
        assert_eq!(err.code(), codes::PARSE_ERROR);
    }
}

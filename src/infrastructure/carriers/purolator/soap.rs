//! # Purolator SOAP Transport
//!
//! Live [`PurolatorApi`] over the Purolator web services. Each operation
//! posts an envelope to its service endpoint with the matching
//! `SOAPAction` and Basic credentials.
//!
//! Replies are checked in order: a non-200 status, a `soap:Fault`, a
//! missing response element, then the first entry of
//! `ResponseInformation/Errors`.

use super::adapter::PurolatorConfig;
use super::api::{
    LabelResponse, PurolatorApi, RatesRequest, RatesResponse, ShipmentRequest, ShipmentResponse,
    TrackingResponse, VoidResponse,
};
use super::envelope::{
    Body, Envelope, Responded, documents_envelope, rates_envelope, shipment_envelope,
    tracking_envelope, void_envelope,
};
use crate::domain::error::{CarrierError, CarrierResult, codes};
use crate::domain::value_objects::ids::PUROLATOR;
use crate::domain::value_objects::{RequestContext, Timestamp};
use crate::infrastructure::carriers::http_client::{HttpClient, HttpReply, basic_auth};
use crate::infrastructure::carriers::xml::{XmlElement, from_xml};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

const ESTIMATING_PATH: &str = "/EWS/V2/Estimating/EstimatingService.asmx";
const SHIPPING_PATH: &str = "/EWS/V2/Shipping/ShippingService.asmx";
const DOCUMENTS_PATH: &str = "/EWS/V2/ShippingDocuments/ShippingDocumentsService.asmx";
const TRACKING_PATH: &str = "/PWS/V1/Tracking/TrackingService.asmx";

const SOAP_ACTION_BASE: &str = "http://purolator.com/pws/service/v2/";

/// Purolator transport backed by [`HttpClient`].
#[derive(Debug, Clone)]
pub struct SoapPurolatorApi {
    http: HttpClient,
    base_url: String,
}

impl SoapPurolatorApi {
    /// Creates a transport from the carrier settings.
    ///
    /// # Errors
    ///
    /// Returns `ENCODE_ERROR` for credentials that are not a valid header
    /// value and `NETWORK_ERROR` if the client cannot be built.
    pub fn new(config: &PurolatorConfig) -> CarrierResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            basic_auth(PUROLATOR, &config.username, Some(&config.password))?,
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml; charset=utf-8"),
        );

        let timeout_ms = u64::try_from(config.http_timeout.as_millis()).unwrap_or(u64::MAX);
        Ok(Self {
            http: HttpClient::with_headers(PUROLATOR, timeout_ms, headers)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Posts `envelope` to `path` and decodes the reply body.
    async fn call(
        &self,
        ctx: &RequestContext,
        path: &str,
        action: &str,
        envelope: XmlElement,
    ) -> CarrierResult<Body> {
        let body = envelope.to_xml_string().map_err(|e| {
            CarrierError::new(
                PUROLATOR,
                codes::ENCODE_ERROR,
                format!("Failed to encode request: {e}"),
            )
            .with_cause(e)
        })?;
        let builder = self
            .http
            .request(Method::POST, &format!("{}{path}", self.base_url))
            .header("SOAPAction", format!("{SOAP_ACTION_BASE}{action}"))
            .body(body);
        let reply = self.http.send(ctx, builder).await?;
        read_body(&reply)
    }
}

fn request_reference() -> String {
    format!("req-{}", Timestamp::now().timestamp_nanos().unwrap_or_default())
}

/// Applies the status and fault checks and returns the SOAP body.
fn read_body(reply: &HttpReply) -> CarrierResult<Body> {
    let status = reply.status();
    let parsed = from_xml::<Envelope>(&reply.text());
    if status != 200 {
        let fault = parsed
            .ok()
            .and_then(|env| env.body.fault)
            .filter(|f| !f.code.is_empty());
        return Err(match fault {
            Some(fault) => CarrierError::new(PUROLATOR, fault.code, fault.message)
                .with_status_code(status)
                .with_retryable(status == 429 || status >= 500),
            None => CarrierError::http_status(PUROLATOR, status, reply.text()),
        });
    }
    let envelope = parsed.map_err(|e| {
        CarrierError::parse(PUROLATOR, format!("Failed to parse response: {e}")).with_cause(e)
    })?;
    match envelope.body.fault {
        Some(fault) => Err(CarrierError::new(PUROLATOR, fault.code, fault.message)),
        None => Ok(envelope.body),
    }
}

/// Requires the response element and rejects reported errors.
fn checked<T: Responded>(response: Option<T>, element: &str) -> CarrierResult<T> {
    let response = response.ok_or_else(|| {
        CarrierError::parse(PUROLATOR, format!("No {element} in response"))
    })?;
    if let Some(error) = response.information().first_error() {
        return Err(CarrierError::new(
            PUROLATOR,
            error.code.clone(),
            error.description.clone(),
        ));
    }
    Ok(response)
}

#[async_trait]
impl PurolatorApi for SoapPurolatorApi {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        req: &RatesRequest,
    ) -> CarrierResult<RatesResponse> {
        let envelope = rates_envelope(req, &request_reference());
        let body = self
            .call(ctx, ESTIMATING_PATH, "GetFullEstimate", envelope)
            .await?;
        let estimate = checked(body.get_full_estimate_response, "GetFullEstimateResponse")?;
        let nanos = Timestamp::now().timestamp_nanos().unwrap_or_default();
        Ok(RatesResponse {
            quote_id: format!("puro-quote-{nanos}"),
            rates: estimate.into_rates(),
        })
    }

    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse> {
        let envelope = shipment_envelope(req, &request_reference());
        let body = self
            .call(ctx, SHIPPING_PATH, "CreateShipment", envelope)
            .await?;
        let created = checked(body.create_shipment_response, "CreateShipmentResponse")?;
        Ok(created.into())
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_pin: &str,
        media_type: &str,
    ) -> CarrierResult<LabelResponse> {
        let envelope = documents_envelope(shipment_pin, &request_reference());
        let body = self
            .call(ctx, DOCUMENTS_PATH, "GetDocuments", envelope)
            .await?;
        let documents = checked(body.get_documents_response, "GetDocumentsResponse")?;
        let encoded = documents.completed_data().ok_or_else(|| {
            CarrierError::new(
                PUROLATOR,
                codes::LABEL_NOT_FOUND,
                format!("No completed document for shipment {shipment_pin}"),
            )
        })?;
        // xs:base64Binary may arrive wrapped across lines.
        let compact: String = encoded.split_ascii_whitespace().collect();
        let data = BASE64.decode(compact).map_err(|e| {
            CarrierError::parse(PUROLATOR, format!("Invalid document data: {e}")).with_cause(e)
        })?;
        Ok(LabelResponse {
            shipment_pin: shipment_pin.to_string(),
            media_type: media_type.to_string(),
            data: Bytes::from(data),
        })
    }

    async fn void_shipment(
        &self,
        ctx: &RequestContext,
        shipment_pin: &str,
    ) -> CarrierResult<VoidResponse> {
        let envelope = void_envelope(shipment_pin, &request_reference());
        let body = self
            .call(ctx, SHIPPING_PATH, "VoidShipment", envelope)
            .await?;
        let void = checked(body.void_shipment_response, "VoidShipmentResponse")?;
        Ok(VoidResponse {
            shipment_pin: shipment_pin.to_string(),
            status: if void.voided() { "voided" } else { "failed" }.to_string(),
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        tracking_pin: &str,
    ) -> CarrierResult<TrackingResponse> {
        let envelope = tracking_envelope(tracking_pin, &request_reference());
        let body = self
            .call(ctx, TRACKING_PATH, "TrackPackagesByPin", envelope)
            .await?;
        let tracking = checked(
            body.track_packages_by_pin_response,
            "TrackPackagesByPinResponse",
        )?;
        tracking.into_tracking(tracking_pin).ok_or_else(|| {
            CarrierError::new(
                PUROLATOR,
                codes::TRACKING_NOT_FOUND,
                format!("No tracking information for PIN {tracking_pin}"),
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply::new(status, body.to_string())
    }

    const FAULT: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
        <soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>Service busy</faultstring></soap:Fault></soap:Body>
      </soap:Envelope>"#;

    #[test]
    fn fault_on_error_status_keeps_code_and_is_retryable() {
        let err = read_body(&reply(500, FAULT)).unwrap_err();
        assert_eq!(err.code(), "soap:Server");
        assert_eq!(err.message(), "Service busy");
        assert_eq!(err.status_code(), Some(500));
        assert!(err.is_retryable());
    }

    #[test]
    fn fault_on_200_is_still_an_error() {
        let err = read_body(&reply(200, FAULT)).unwrap_err();
        assert_eq!(err.code(), "soap:Server");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn non_soap_error_maps_status() {
        let err = read_body(&reply(401, "Unauthorized")).unwrap_err();
        assert_eq!(err.code(), codes::AUTHENTICATION_FAILED);
    }

    #[test]
    fn missing_element_and_reported_errors() {
        let body = read_body(&reply(200, "<Envelope><Body/></Envelope>")).unwrap();
        let err = checked(body.void_shipment_response, "VoidShipmentResponse").unwrap_err();
        assert_eq!(err.code(), codes::PARSE_ERROR);
        assert_eq!(err.message(), "No VoidShipmentResponse in response");

        let xml = "<Envelope><Body><VoidShipmentResponse><ResponseInformation><Errors>\
                   <Error><Code>1100690</Code><Description>PIN not found</Description></Error>\
                   </Errors></ResponseInformation></VoidShipmentResponse></Body></Envelope>";
        let body = read_body(&reply(200, xml)).unwrap();
        let err = checked(body.void_shipment_response, "VoidShipmentResponse").unwrap_err();
        assert_eq!(err.code(), "1100690");
        assert_eq!(err.message(), "PIN not found");
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let err = read_body(&reply(200, "<Envelope><Body></Envelope>")).unwrap_err();
        assert_eq!(err.code(), codes::PARSE_ERROR);
    }
}

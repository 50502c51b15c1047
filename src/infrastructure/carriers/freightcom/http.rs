//! # Freightcom HTTP Transport
//!
//! Live [`FreightcomApi`] over JSON/HTTPS.
//!
//! Rates and shipments are submitted and then polled at a fixed interval
//! until they reach a terminal status. The poll loop checks the request
//! context on every iteration and enforces its own wall-clock deadline,
//! independent of any deadline the caller set.

use super::adapter::FreightcomConfig;
use super::api::{
    ApiError, CancelResponse, FreightcomApi, LabelResponse, RateRequestResponse, RatesRequest,
    RatesResponse, ShipmentRequest, ShipmentResponse, SimpleError, TrackingResponse,
};
use crate::domain::error::{CarrierError, CarrierResult, codes};
use crate::domain::value_objects::RequestContext;
use crate::domain::value_objects::ids::FREIGHTCOM;
use crate::infrastructure::carriers::http_client::{HttpClient, HttpReply, sensitive_header};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const USER_AGENT_VALUE: &str = "delivro-logistic/1.0";

/// Outcome of one poll attempt.
enum PollStep<T> {
    Done(T),
    Pending,
}

/// Freightcom transport backed by [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpFreightcomApi {
    http: HttpClient,
    base_url: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl HttpFreightcomApi {
    /// Creates a transport from the carrier settings.
    ///
    /// # Errors
    ///
    /// Returns `ENCODE_ERROR` for an API key that is not a valid header value
    /// and `NETWORK_ERROR` if the client cannot be built.
    pub fn new(config: &FreightcomConfig) -> CarrierResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-API-Key", sensitive_header(FREIGHTCOM, &config.api_key)?);

        let timeout_ms = u64::try_from(config.http_timeout.as_millis()).unwrap_or(u64::MAX);
        Ok(Self {
            http: HttpClient::with_headers(FREIGHTCOM, timeout_ms, headers)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval,
            poll_timeout: config.poll_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> CarrierResult<HttpReply> {
        let mut builder = self.http.request(method, &self.url(path));
        if let Some(body) = body {
            builder = builder.body(body);
        }
        self.http.send(ctx, builder).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> CarrierResult<T> {
        let reply = self.call(ctx, Method::GET, path, None).await?;
        if reply.status() != 200 {
            return Err(parse_error(&reply));
        }
        reply.json(FREIGHTCOM)
    }

    /// Runs `step` until it reports completion, sleeping `poll_interval`
    /// between attempts.
    async fn poll_until<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        timeout_message: &str,
        mut step: F,
    ) -> CarrierResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CarrierResult<PollStep<T>>>,
    {
        let deadline = Instant::now() + self.poll_timeout;
        loop {
            ctx.check(FREIGHTCOM)?;
            if Instant::now() >= deadline {
                return Err(CarrierError::timeout(FREIGHTCOM, timeout_message));
            }
            match step().await? {
                PollStep::Done(value) => return Ok(value),
                PollStep::Pending => ctx.sleep(FREIGHTCOM, self.poll_interval).await?,
            }
        }
    }

    async fn rate_step(&self, ctx: &RequestContext, path: &str) -> CarrierResult<PollStep<RatesResponse>> {
        let rates: RatesResponse = self.get(ctx, path).await?;
        match rates.status.as_str() {
            "complete" => Ok(PollStep::Done(rates)),
            "error" => Err(CarrierError::new(FREIGHTCOM, codes::RATE_ERROR, rates.error)),
            "pending" => Ok(PollStep::Pending),
            other => Err(CarrierError::new(
                FREIGHTCOM,
                codes::UNKNOWN_STATUS,
                format!("Unknown rate status: {other}"),
            )),
        }
    }

    async fn shipment_step(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> CarrierResult<PollStep<ShipmentResponse>> {
        let shipment: ShipmentResponse = self.get(ctx, path).await?;
        match shipment.status.as_str() {
            "pending" | "processing" => Ok(PollStep::Pending),
            "error" | "failed" => Err(CarrierError::new(
                FREIGHTCOM,
                codes::SHIPMENT_ERROR,
                format!("Shipment failed with status: {}", shipment.status),
            )),
            _ => Ok(PollStep::Done(shipment)),
        }
    }
}

#[async_trait]
impl FreightcomApi for HttpFreightcomApi {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        req: &RatesRequest,
    ) -> CarrierResult<RatesResponse> {
        let reply = self.call(ctx, Method::POST, "/rate", Some(encode(req)?)).await?;
        if !matches!(reply.status(), 200 | 202) {
            return Err(parse_error(&reply));
        }
        let ack: RateRequestResponse = reply.json(FREIGHTCOM)?;
        debug!(request_id = %ack.request_id, "Freightcom rate request accepted");

        let path = format!("/rate/{}", ack.request_id);
        let path = path.as_str();
        self.poll_until(ctx, "Rate request timed out waiting for results", || {
            self.rate_step(ctx, path)
        })
        .await
    }

    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse> {
        let reply = self.call(ctx, Method::POST, "/shipment", Some(encode(req)?)).await?;
        if !matches!(reply.status(), 200 | 201 | 202) {
            return Err(parse_error(&reply));
        }
        let shipment: ShipmentResponse = reply.json(FREIGHTCOM)?;
        if !matches!(shipment.status.as_str(), "pending" | "processing") {
            return Ok(shipment);
        }

        debug!(shipment_id = %shipment.id, "Freightcom shipment pending, polling");
        let path = format!("/shipment/{}", shipment.id);
        let path = path.as_str();
        self.poll_until(ctx, "Shipment creation timed out", || {
            self.shipment_step(ctx, path)
        })
        .await
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        format: &str,
    ) -> CarrierResult<LabelResponse> {
        let shipment: ShipmentResponse = self.get(ctx, &format!("/shipment/{shipment_id}")).await?;
        let labels = if format.is_empty() {
            shipment.labels
        } else {
            shipment
                .labels
                .into_iter()
                .filter(|l| l.format.eq_ignore_ascii_case(format))
                .collect()
        };
        Ok(LabelResponse {
            shipment_id: shipment_id.to_string(),
            labels,
        })
    }

    async fn cancel_shipment(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        _reason: Option<&str>,
    ) -> CarrierResult<CancelResponse> {
        let path = format!("/shipment/{shipment_id}");
        let reply = self.call(ctx, Method::DELETE, &path, None).await?;
        let cancelled = || CancelResponse {
            shipment_id: shipment_id.to_string(),
            status: "cancelled".to_string(),
            ..CancelResponse::default()
        };
        match reply.status() {
            204 => Ok(cancelled()),
            200 => Ok(serde_json::from_slice(reply.body()).unwrap_or_else(|_| cancelled())),
            _ => Err(parse_error(&reply)),
        }
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
    ) -> CarrierResult<TrackingResponse> {
        let mut tracking: TrackingResponse = self
            .get(ctx, &format!("/shipment/{shipment_id}/tracking-events"))
            .await?;
        tracking.shipment_id = shipment_id.to_string();
        Ok(tracking)
    }
}

/// Converts a non-success reply into a carrier error.
///
/// A structured `{code, message}` body keeps the carrier's code; a loose
/// `{error}` or `{message}` body, or no parseable body at all, is mapped
/// from the HTTP status.
fn parse_error(reply: &HttpReply) -> CarrierError {
    let status = reply.status();
    if let Some(api) = serde_json::from_slice::<ApiError>(reply.body())
        .ok()
        .filter(|e| !e.code.is_empty())
    {
        return CarrierError::new(FREIGHTCOM, api.code, api.message)
            .with_status_code(status)
            .with_retryable(status == 429 || status >= 500);
    }
    if let Ok(simple) = serde_json::from_slice::<SimpleError>(reply.body()) {
        let message = if simple.error.is_empty() {
            simple.message
        } else {
            simple.error
        };
        if !message.is_empty() {
            return CarrierError::http_status(FREIGHTCOM, status, message);
        }
    }
    CarrierError::http_status(FREIGHTCOM, status, reply.text())
}

fn encode<T: Serialize>(value: &T) -> CarrierResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        CarrierError::new(
            FREIGHTCOM,
            codes::ENCODE_ERROR,
            format!("Failed to encode request: {e}"),
        )
        .with_cause(e)
    })
}

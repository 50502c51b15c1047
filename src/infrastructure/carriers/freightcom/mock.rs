//! # Freightcom Mock Transport
//!
//! Canned [`FreightcomApi`] for tests and local runs. Each operation can be
//! replaced with a hook; see [`mock_support`](crate::infrastructure::carriers::mock_support)
//! for the shared latency and error injection.

use super::api::{
    CancelResponse, FreightcomApi, Label, LabelResponse, Rate, RatesRequest, RatesResponse,
    ShipmentRequest, ShipmentResponse, TrackingEvent, TrackingResponse,
};
use crate::domain::error::CarrierResult;
use crate::domain::value_objects::ids::{FREIGHTCOM, short_id};
use crate::domain::value_objects::{RequestContext, Timestamp};
use crate::infrastructure::carriers::mock_support::{Hook, MockBehavior, hook_or};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Canned Freightcom transport.
#[derive(Default)]
pub struct MockFreightcomApi {
    /// Latency and error injection.
    pub behavior: MockBehavior,
    /// Replaces `get_rates`.
    pub on_get_rates: Option<Hook<RatesRequest, RatesResponse>>,
    /// Replaces `create_shipment`.
    pub on_create_shipment: Option<Hook<ShipmentRequest, ShipmentResponse>>,
    /// Replaces `get_label`; receives `(shipment_id, format)`.
    pub on_get_label: Option<Hook<(String, String), LabelResponse>>,
    /// Replaces `cancel_shipment`; receives `(shipment_id, reason)`.
    pub on_cancel_shipment: Option<Hook<(String, Option<String>), CancelResponse>>,
    /// Replaces `get_tracking`; receives the shipment id.
    pub on_get_tracking: Option<Hook<String, TrackingResponse>>,
    pub(crate) cancellations: AtomicU64,
}

impl fmt::Debug for MockFreightcomApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockFreightcomApi")
            .field("behavior", &self.behavior)
            .field("on_get_rates", &self.on_get_rates.is_some())
            .field("on_create_shipment", &self.on_create_shipment.is_some())
            .finish_non_exhaustive()
    }
}

impl MockFreightcomApi {
    /// Creates a mock returning canned data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock with latency and error injection.
    #[must_use]
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }
}

fn canned_rate(
    service_id: i64,
    carrier: (&str, &str),
    service: (&str, &str),
    cents: [i64; 4],
    transit_days: u32,
    guaranteed: bool,
) -> Rate {
    let [base, fuel, tax, total] = cents.map(|c| Decimal::new(c, 2));
    let now = Timestamp::now();
    Rate {
        id: format!("rate-{}", short_id()),
        service_id,
        carrier_code: carrier.0.to_string(),
        carrier_name: carrier.1.to_string(),
        service_code: service.0.to_string(),
        service_name: service.1.to_string(),
        base_rate: base,
        fuel_surcharge: fuel,
        total_tax: tax,
        total_price: total,
        currency: "CAD".to_string(),
        transit_days,
        estimated_delivery: now.add_days(i64::from(transit_days)).to_date_string(),
        guaranteed,
        expires_at: now.add_mins(30).to_iso8601(),
    }
}

fn canned_rates() -> RatesResponse {
    RatesResponse {
        request_id: format!("fc-req-{}", short_id()),
        status: "complete".to_string(),
        rates: vec![
            canned_rate(
                101,
                ("fedex", "FedEx"),
                ("FEDEX_GROUND", "FedEx Ground"),
                [1599, 192, 233, 2024],
                3,
                false,
            ),
            canned_rate(
                102,
                ("fedex", "FedEx"),
                ("FEDEX_EXPRESS_SAVER", "FedEx Express Saver"),
                [2899, 348, 422, 3669],
                2,
                true,
            ),
            canned_rate(
                201,
                ("ups", "UPS"),
                ("UPS_GROUND", "UPS Ground"),
                [1450, 174, 211, 1835],
                4,
                false,
            ),
        ],
        error: String::new(),
    }
}

fn canned_shipment(req: &ShipmentRequest) -> ShipmentResponse {
    let id = format!("ship-{}", short_id());
    let nanos = Timestamp::now().timestamp_nanos().unwrap_or_default();
    let tracking = 100_000_000_000 + nanos.rem_euclid(900_000_000_000);
    ShipmentResponse {
        unique_id: req.unique_id.clone(),
        previously_created: false,
        status: "booked".to_string(),
        tracking_numbers: vec![tracking.to_string()],
        tracking_url: format!("https://www.fedex.com/fedextrack/?trknbr={tracking}"),
        carrier_code: "fedex".to_string(),
        service_name: "FedEx Ground".to_string(),
        total_charged: Decimal::new(2024, 2),
        currency: "CAD".to_string(),
        estimated_delivery: Timestamp::now().add_days(3).to_date_string(),
        labels: vec![Label {
            size: "4x6".to_string(),
            format: "pdf".to_string(),
            url: format!("https://api.freightcom.com/shipment/{id}/label.pdf"),
        }],
        id,
    }
}

fn canned_tracking(shipment_id: &str) -> TrackingResponse {
    let now = Timestamp::now();
    TrackingResponse {
        shipment_id: shipment_id.to_string(),
        tracking_number: format!("TRK{}", short_id().to_uppercase()),
        status: "in_transit".to_string(),
        events: vec![
            TrackingEvent {
                timestamp: now.add_secs(-48 * 3600).to_iso8601(),
                description: "Shipment picked up".to_string(),
                location: "Toronto, ON".to_string(),
                status: "picked_up".to_string(),
                code: "PU".to_string(),
            },
            TrackingEvent {
                timestamp: now.add_secs(-24 * 3600).to_iso8601(),
                description: "In transit to destination".to_string(),
                location: "Mississauga, ON".to_string(),
                status: "in_transit".to_string(),
                code: "IT".to_string(),
            },
        ],
    }
}

#[async_trait]
impl FreightcomApi for MockFreightcomApi {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        req: &RatesRequest,
    ) -> CarrierResult<RatesResponse> {
        self.behavior.prelude(ctx, FREIGHTCOM).await?;
        hook_or(self.on_get_rates.as_ref(), ctx, req, || Ok(canned_rates()))
    }

    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse> {
        self.behavior.prelude(ctx, FREIGHTCOM).await?;
        hook_or(self.on_create_shipment.as_ref(), ctx, req, || {
            Ok(canned_shipment(req))
        })
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        format: &str,
    ) -> CarrierResult<LabelResponse> {
        self.behavior.prelude(ctx, FREIGHTCOM).await?;
        let args = (shipment_id.to_string(), format.to_string());
        hook_or(self.on_get_label.as_ref(), ctx, &args, || {
            Ok(LabelResponse {
                shipment_id: shipment_id.to_string(),
                labels: vec![Label {
                    size: "4x6".to_string(),
                    format: format.to_string(),
                    url: format!("https://api.freightcom.com/shipment/{shipment_id}/label.{format}"),
                }],
            })
        })
    }

    async fn cancel_shipment(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        reason: Option<&str>,
    ) -> CarrierResult<CancelResponse> {
        self.behavior.prelude(ctx, FREIGHTCOM).await?;
        let args = (shipment_id.to_string(), reason.map(str::to_string));
        hook_or(self.on_cancel_shipment.as_ref(), ctx, &args, || {
            let n = self.cancellations.fetch_add(1, Ordering::Relaxed) + 1;
            Ok(CancelResponse {
                shipment_id: shipment_id.to_string(),
                status: "cancelled".to_string(),
                refund_amount: Decimal::new(2024, 2),
                currency: "CAD".to_string(),
                confirmation_number: format!("CANCEL-{n}"),
            })
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
    ) -> CarrierResult<TrackingResponse> {
        self.behavior.prelude(ctx, FREIGHTCOM).await?;
        let id = shipment_id.to_string();
        hook_or(self.on_get_tracking.as_ref(), ctx, &id, || {
            Ok(canned_tracking(shipment_id))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::error::{CarrierError, codes};
    use std::sync::Arc;

    #[tokio::test]
    async fn canned_rates_are_complete_and_consistent() {
        let api = MockFreightcomApi::new();
        let resp = api
            .get_rates(&RequestContext::new(), &RatesRequest::default())
            .await
            .unwrap();
        assert_eq!(resp.status, "complete");
        assert!(resp.request_id.starts_with("fc-req-"));
        assert_eq!(resp.rates.len(), 3);
        for rate in &resp.rates {
            assert_eq!(
                rate.base_rate + rate.fuel_surcharge + rate.total_tax,
                rate.total_price
            );
            assert!(Timestamp::parse_rfc3339(&rate.expires_at).is_some());
        }
    }

    #[tokio::test]
    async fn shipment_tracking_number_has_twelve_digits() {
        let api = MockFreightcomApi::new();
        let ship = api
            .create_shipment(&RequestContext::new(), &ShipmentRequest::default())
            .await
            .unwrap();
        assert_eq!(ship.status, "booked");
        let tracking = ship.tracking_numbers.first().unwrap();
        assert_eq!(tracking.len(), 12);
        assert!(tracking.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn hook_overrides_rates() {
        let api = MockFreightcomApi {
            on_get_rates: Some(Arc::new(|_: &RequestContext, _: &RatesRequest| {
                Err(CarrierError::new(FREIGHTCOM, codes::RATE_ERROR, "no service"))
            })),
            ..MockFreightcomApi::default()
        };
        let err = api
            .get_rates(&RequestContext::new(), &RatesRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::RATE_ERROR);
    }

    #[tokio::test]
    async fn cancellation_numbers_increase() {
        let api = MockFreightcomApi::new();
        let ctx = RequestContext::new();
        let a = api.cancel_shipment(&ctx, "s1", None).await.unwrap();
        let b = api.cancel_shipment(&ctx, "s2", Some("dup")).await.unwrap();
        assert_eq!(a.confirmation_number, "CANCEL-1");
        assert_eq!(b.confirmation_number, "CANCEL-2");
    }

    #[tokio::test]
    async fn simulated_errors_win_over_hooks() {
        let api = MockFreightcomApi {
            on_get_tracking: Some(Arc::new(|_: &RequestContext, id: &String| {
                Ok(TrackingResponse {
                    shipment_id: id.clone(),
                    ..TrackingResponse::default()
                })
            })),
            ..MockFreightcomApi::with_behavior(MockBehavior::failing())
        };
        let err = api
            .get_tracking(&RequestContext::new(), "s1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::MOCK_ERROR);
    }
}

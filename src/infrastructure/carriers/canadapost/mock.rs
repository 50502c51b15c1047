//! Canned [`CanadaPostApi`] with per-operation hooks.

use super::api::{
    CanadaPostApi, LabelResponse, Link, Rate, RatesRequest, RatesResponse, ShipmentRequest,
    ShipmentResponse, TrackingEvent, TrackingResponse, VoidResponse,
};
use crate::domain::error::CarrierResult;
use crate::domain::value_objects::ids::{CANADAPOST, short_id};
use crate::domain::value_objects::{RequestContext, Timestamp};
use crate::infrastructure::carriers::mock_support::{Hook, MockBehavior, hook_or};
use async_trait::async_trait;
use bytes::Bytes;
use rust_decimal::Decimal;
use std::fmt;

/// Body of every canned label.
pub const MOCK_LABEL: &[u8] = b"%PDF-1.4 mock label data";

/// Canned Canada Post transport.
#[derive(Default)]
pub struct MockCanadaPostApi {
    /// Latency and error injection.
    pub behavior: MockBehavior,
    /// Replaces `get_rates`.
    pub on_get_rates: Option<Hook<RatesRequest, RatesResponse>>,
    /// Replaces `create_shipment`.
    pub on_create_shipment: Option<Hook<ShipmentRequest, ShipmentResponse>>,
    /// Replaces `get_label`; receives `(shipment_id, media_type)`.
    pub on_get_label: Option<Hook<(String, String), LabelResponse>>,
    /// Replaces `void_shipment`; receives the shipment id.
    pub on_void_shipment: Option<Hook<String, VoidResponse>>,
    /// Replaces `get_tracking`; receives the PIN.
    pub on_get_tracking: Option<Hook<String, TrackingResponse>>,
}

impl fmt::Debug for MockCanadaPostApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCanadaPostApi")
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl MockCanadaPostApi {
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

fn canned_rate(code: &str, name: &str, cents: [i64; 4], transit: u32, guaranteed: bool) -> Rate {
    let [base_rate, fuel_surcharge, taxes, total_price] = cents.map(|c| Decimal::new(c, 2));
    Rate {
        service_code: code.to_string(),
        service_name: name.to_string(),
        base_rate,
        fuel_surcharge,
        taxes,
        total_price,
        expected_transit: transit,
        expected_delivery: Timestamp::now()
            .add_days(i64::from(transit))
            .to_date_string(),
        guaranteed,
    }
}

fn canned_shipment() -> ShipmentResponse {
    let shipment_id = format!("ship-{}", short_id());
    let nanos = Timestamp::now().timestamp_nanos().unwrap_or_default();
    let pin = (1_000_000_000_000 + nanos.rem_euclid(9_000_000_000_000)).to_string();
    ShipmentResponse {
        links: vec![
            Link {
                rel: "label".to_string(),
                href: format!("https://api.canadapost.ca/rs/artifact/{shipment_id}/label"),
                media_type: "application/pdf".to_string(),
            },
            Link {
                rel: "tracking".to_string(),
                href: format!(
                    "https://www.canadapost-postescanada.ca/track-reperage/en#/search?searchFor={pin}"
                ),
                media_type: "text/html".to_string(),
            },
        ],
        shipment_id,
        tracking_pin: pin,
        status: "created".to_string(),
        service_name: "Regular Parcel".to_string(),
        total_charged: Decimal::new(1265, 2),
        expected_delivery: Timestamp::now().add_days(5).to_date_string(),
    }
}

fn canned_tracking(pin: &str) -> TrackingResponse {
    let now = Timestamp::now();
    let event = |hours: i64, kind: &str, description: &str, location: &str| TrackingEvent {
        timestamp: now.add_secs(-hours * 3600).to_iso8601(),
        description: description.to_string(),
        location: location.to_string(),
        kind: kind.to_string(),
    };
    TrackingResponse {
        tracking_pin: pin.to_string(),
        status: "in_transit".to_string(),
        events: vec![
            event(48, "accepted", "Item accepted at post office", "Toronto, ON"),
            event(24, "in_transit", "Item in transit", "Mississauga, ON"),
        ],
    }
}

#[async_trait]
impl CanadaPostApi for MockCanadaPostApi {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        req: &RatesRequest,
    ) -> CarrierResult<RatesResponse> {
        self.behavior.prelude(ctx, CANADAPOST).await?;
        hook_or(self.on_get_rates.as_ref(), ctx, req, || {
            Ok(RatesResponse {
                quote_id: format!("cp-quote-{}", short_id()),
                rates: vec![
                    canned_rate("DOM.RP", "Regular Parcel", [999, 120, 146, 1265], 5, false),
                    canned_rate("DOM.XP", "Xpresspost", [1999, 240, 291, 2530], 2, true),
                    canned_rate("DOM.PC", "Priority", [3499, 420, 510, 4429], 1, true),
                ],
            })
        })
    }

    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse> {
        self.behavior.prelude(ctx, CANADAPOST).await?;
        hook_or(self.on_create_shipment.as_ref(), ctx, req, || Ok(canned_shipment()))
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
        media_type: &str,
    ) -> CarrierResult<LabelResponse> {
        self.behavior.prelude(ctx, CANADAPOST).await?;
        let args = (shipment_id.to_string(), media_type.to_string());
        hook_or(self.on_get_label.as_ref(), ctx, &args, || {
            Ok(LabelResponse {
                shipment_id: shipment_id.to_string(),
                media_type: media_type.to_string(),
                data: Bytes::from_static(MOCK_LABEL),
            })
        })
    }

    async fn void_shipment(
        &self,
        ctx: &RequestContext,
        shipment_id: &str,
    ) -> CarrierResult<VoidResponse> {
        self.behavior.prelude(ctx, CANADAPOST).await?;
        let id = shipment_id.to_string();
        hook_or(self.on_void_shipment.as_ref(), ctx, &id, || {
            Ok(VoidResponse {
                shipment_id: shipment_id.to_string(),
                status: "voided".to_string(),
            })
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        tracking_pin: &str,
    ) -> CarrierResult<TrackingResponse> {
        self.behavior.prelude(ctx, CANADAPOST).await?;
        let pin = tracking_pin.to_string();
        hook_or(self.on_get_tracking.as_ref(), ctx, &pin, || {
            Ok(canned_tracking(tracking_pin))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::error::codes;

    #[tokio::test]
    async fn canned_rates_add_up() {
        let api = MockCanadaPostApi::new();
        let resp = api
            .get_rates(&RequestContext::new(), &RatesRequest::default())
            .await
            .unwrap();
        assert!(resp.quote_id.starts_with("cp-quote-"));
        let codes: Vec<_> = resp.rates.iter().map(|r| r.service_code.as_str()).collect();
        assert_eq!(codes, ["DOM.RP", "DOM.XP", "DOM.PC"]);
        for rate in &resp.rates {
            assert_eq!(rate.base_rate + rate.fuel_surcharge + rate.taxes, rate.total_price);
        }
    }

    #[tokio::test]
    async fn shipment_has_thirteen_digit_pin_and_links() {
        let api = MockCanadaPostApi::new();
        let ship = api
            .create_shipment(&RequestContext::new(), &ShipmentRequest::default())
            .await
            .unwrap();
        assert_eq!(ship.tracking_pin.len(), 13);
        assert!(ship.link("label").unwrap().ends_with("/label"));
        assert!(ship.link("tracking").unwrap().ends_with(&ship.tracking_pin));
    }

    #[tokio::test]
    async fn label_is_raw_pdf() {
        let api = MockCanadaPostApi::new();
        let label = api
            .get_label(&RequestContext::new(), "ship-1", "application/pdf")
            .await
            .unwrap();
        assert!(label.data.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn failing_behavior_reports_mock_error() {
        let api = MockCanadaPostApi::with_behavior(MockBehavior::failing());
        let err = api
            .void_shipment(&RequestContext::new(), "ship-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::MOCK_ERROR);
        assert_eq!(err.carrier(), CANADAPOST);
    }
}

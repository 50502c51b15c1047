//! Canned [`PurolatorApi`] with per-operation hooks.

use super::api::{
    LabelResponse, PurolatorApi, Rate, RatesRequest, RatesResponse, ShipmentRequest,
    ShipmentResponse, TrackingEvent, TrackingResponse, VoidResponse, service_name,
};
use crate::domain::error::CarrierResult;
use crate::domain::value_objects::ids::{PUROLATOR, short_id};
use crate::domain::value_objects::{RequestContext, Timestamp};
use crate::infrastructure::carriers::mock_support::{Hook, MockBehavior, hook_or};
use async_trait::async_trait;
use bytes::Bytes;
use rust_decimal::Decimal;
use std::fmt;

/// Body of every canned label.
pub const MOCK_LABEL: &[u8] = b"%PDF-1.4 mock purolator label data";

/// Canned Purolator transport.
#[derive(Default)]
pub struct MockPurolatorApi {
    /// Latency and error injection.
    pub behavior: MockBehavior,
    /// Replaces `get_rates`.
    pub on_get_rates: Option<Hook<RatesRequest, RatesResponse>>,
    /// Replaces `create_shipment`.
    pub on_create_shipment: Option<Hook<ShipmentRequest, ShipmentResponse>>,
    /// Replaces `get_label`; receives `(shipment_pin, media_type)`.
    pub on_get_label: Option<Hook<(String, String), LabelResponse>>,
    /// Replaces `void_shipment`; receives the PIN.
    pub on_void_shipment: Option<Hook<String, VoidResponse>>,
    /// Replaces `get_tracking`; receives the PIN.
    pub on_get_tracking: Option<Hook<String, TrackingResponse>>,
}

impl fmt::Debug for MockPurolatorApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPurolatorApi")
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl MockPurolatorApi {
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

fn canned_rate(service_id: &str, cents: [i64; 4], transit_days: u32, guaranteed: bool) -> Rate {
    let [base_price, fuel_surcharge, taxes, total_price] = cents.map(|c| Decimal::new(c, 2));
    Rate {
        service_id: service_id.to_string(),
        service_name: service_name(service_id).to_string(),
        base_price,
        fuel_surcharge,
        taxes,
        total_price,
        expected_delivery: Timestamp::now()
            .add_days(i64::from(transit_days))
            .to_date_string(),
        transit_days,
        guaranteed,
    }
}

fn canned_shipment() -> ShipmentResponse {
    let nanos = Timestamp::now().timestamp_nanos().unwrap_or_default();
    let pin = format!("329{:012}", nanos.rem_euclid(1_000_000_000_000));
    ShipmentResponse {
        label_url: format!("https://eship.purolator.com/shipment/{pin}/label.pdf"),
        piece_pins: vec![pin.clone()],
        shipment_pin: pin,
        total_price: Decimal::new(2120, 2),
        expected_delivery: Timestamp::now().add_days(5).to_date_string(),
    }
}

fn canned_tracking(pin: &str) -> TrackingResponse {
    let now = Timestamp::now();
    let scan = |hours: i64, scan_type: &str, description: &str, location: &str| TrackingEvent {
        timestamp: now.add_secs(-hours * 3600).to_iso8601(),
        description: description.to_string(),
        location: location.to_string(),
        scan_type: scan_type.to_string(),
    };
    TrackingResponse {
        tracking_pin: pin.to_string(),
        status: "InTransit".to_string(),
        events: vec![
            scan(48, "PickedUp", "Picked up by Purolator", "Toronto, ON"),
            scan(24, "InTransit", "In transit to destination", "Mississauga, ON"),
        ],
    }
}

#[async_trait]
impl PurolatorApi for MockPurolatorApi {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        req: &RatesRequest,
    ) -> CarrierResult<RatesResponse> {
        self.behavior.prelude(ctx, PUROLATOR).await?;
        hook_or(self.on_get_rates.as_ref(), ctx, req, || {
            Ok(RatesResponse {
                quote_id: format!("puro-quote-{}", short_id()),
                rates: vec![
                    canned_rate("PurolatorGround", [1675, 201, 244, 2120], 5, false),
                    canned_rate("PurolatorExpress", [2850, 342, 415, 3607], 2, true),
                    canned_rate("PurolatorExpress9AM", [4500, 540, 655, 5695], 1, true),
                ],
            })
        })
    }

    async fn create_shipment(
        &self,
        ctx: &RequestContext,
        req: &ShipmentRequest,
    ) -> CarrierResult<ShipmentResponse> {
        self.behavior.prelude(ctx, PUROLATOR).await?;
        hook_or(self.on_create_shipment.as_ref(), ctx, req, || Ok(canned_shipment()))
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        shipment_pin: &str,
        media_type: &str,
    ) -> CarrierResult<LabelResponse> {
        self.behavior.prelude(ctx, PUROLATOR).await?;
        let args = (shipment_pin.to_string(), media_type.to_string());
        hook_or(self.on_get_label.as_ref(), ctx, &args, || {
            Ok(LabelResponse {
                shipment_pin: shipment_pin.to_string(),
                media_type: media_type.to_string(),
                data: Bytes::from_static(MOCK_LABEL),
            })
        })
    }

    async fn void_shipment(
        &self,
        ctx: &RequestContext,
        shipment_pin: &str,
    ) -> CarrierResult<VoidResponse> {
        self.behavior.prelude(ctx, PUROLATOR).await?;
        let pin = shipment_pin.to_string();
        hook_or(self.on_void_shipment.as_ref(), ctx, &pin, || {
            Ok(VoidResponse {
                shipment_pin: shipment_pin.to_string(),
                status: "voided".to_string(),
            })
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        tracking_pin: &str,
    ) -> CarrierResult<TrackingResponse> {
        self.behavior.prelude(ctx, PUROLATOR).await?;
        let pin = tracking_pin.to_string();
        hook_or(self.on_get_tracking.as_ref(), ctx, &pin, || {
            Ok(canned_tracking(tracking_pin))
        })
    }
}

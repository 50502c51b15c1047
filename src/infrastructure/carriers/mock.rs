//! # Mock Carrier
//!
//! A carrier that answers under any name with canned data.
//!
//! Used by registry tests, benchmarks and demos where no carrier protocol is
//! involved. Failure and latency can be injected through [`MockBehavior`].
//! When the name matches a known carrier, ids carry that carrier's tag so
//! routed calls resolve back to it.

use crate::domain::entities::{Label, Order, RateOption, TrackingEvent};
use crate::domain::error::CarrierResult;
use crate::domain::messages::{
    CancelOrderRequest, CancelOrderResponse, CreateOrderRequest, CreateOrderResponse,
    GetLabelRequest, GetLabelResponse, GetTrackingRequest, GetTrackingResponse, QuoteRequest,
    QuoteResponse,
};
use crate::domain::value_objects::ids::CarrierTag;
use crate::domain::value_objects::money::{DEFAULT_CURRENCY, Money};
use crate::domain::value_objects::{RequestContext, ServiceType, ShipmentStatus, Timestamp};
use crate::infrastructure::carriers::mock_support::MockBehavior;
use crate::infrastructure::carriers::traits::Carrier;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

struct CannedRate {
    code: &'static str,
    name: &'static str,
    service_type: ServiceType,
    cents: [u32; 4],
    transit_days: u32,
    guaranteed: bool,
}

static CANNED_RATES: [CannedRate; 2] = [
    CannedRate {
        code: "STANDARD",
        name: "Standard",
        service_type: ServiceType::Standard,
        cents: [1250, 150, 182, 1582],
        transit_days: 5,
        guaranteed: false,
    },
    CannedRate {
        code: "EXPRESS",
        name: "Express",
        service_type: ServiceType::Express,
        cents: [2400, 250, 345, 2995],
        transit_days: 2,
        guaranteed: true,
    },
];

impl CannedRate {
    fn total_cents(&self) -> u32 {
        let [_, _, _, total] = self.cents;
        total
    }
}

/// Canned carrier with configurable failure and latency.
#[derive(Debug)]
pub struct MockCarrier {
    name: String,
    prefix: String,
    behavior: MockBehavior,
    counter: AtomicU64,
}

impl MockCarrier {
    /// Creates a mock that succeeds immediately.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let prefix = CarrierTag::ALL
            .into_iter()
            .find(|t| t.carrier_name() == name)
            .map_or_else(|| format!("{name}-"), |t| t.prefix().to_string());
        Self {
            name,
            prefix,
            behavior: MockBehavior::default(),
            counter: AtomicU64::new(0),
        }
    }

    /// Creates a mock that fails every call with `MOCK_ERROR`.
    #[must_use]
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name).with_behavior(MockBehavior::failing())
    }

    /// Sets failure and latency injection.
    #[must_use]
    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.behavior.simulate_latency = Some(latency);
        self
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn id(&self, kind: &str) -> String {
        format!("{}{kind}-{}", self.prefix, self.next())
    }

    fn rate(&self, canned: &CannedRate, now: Timestamp) -> RateOption {
        let [base, fuel, taxes, total] = canned.cents;
        RateOption {
            rate_id: self.id(&canned.code.to_lowercase()),
            carrier: self.name.clone(),
            service_code: canned.code.to_string(),
            service_name: canned.name.to_string(),
            service_type: canned.service_type,
            base_rate: Money::from_cents(base, DEFAULT_CURRENCY),
            fuel_surcharge: Money::from_cents(fuel, DEFAULT_CURRENCY),
            taxes: Money::from_cents(taxes, DEFAULT_CURRENCY),
            total_price: Money::from_cents(total, DEFAULT_CURRENCY),
            transit_days: canned.transit_days,
            estimated_delivery: Some(now.add_days(i64::from(canned.transit_days))),
            expires_at: now.add_mins(30),
            signature_required: false,
            guaranteed: canned.guaranteed,
        }
    }

    fn canned_for_rate(rate_id: &str) -> &'static CannedRate {
        let [standard, express] = &CANNED_RATES;
        if rate_id.contains("express") {
            express
        } else {
            standard
        }
    }
}

#[async_trait]
impl Carrier for MockCarrier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_quote(
        &self,
        ctx: &RequestContext,
        _req: &QuoteRequest,
    ) -> CarrierResult<QuoteResponse> {
        self.behavior.prelude(ctx, &self.name).await?;
        let now = Timestamp::now();
        let rates = CANNED_RATES.iter().map(|r| self.rate(r, now)).collect();
        Ok(QuoteResponse::from_rates(
            self.id("quote"),
            rates,
            now.add_mins(30),
        ))
    }

    async fn create_order(
        &self,
        ctx: &RequestContext,
        req: &CreateOrderRequest,
    ) -> CarrierResult<CreateOrderResponse> {
        self.behavior.prelude(ctx, &self.name).await?;
        let canned = Self::canned_for_rate(&req.rate_id);
        let order_id = self.id("order");
        let tracking = format!("MOCK{:010}", self.next());
        Ok(Order {
            tracking_url: format!("https://track.{}.mock/{tracking}", self.name),
            label_url: Some(format!("https://labels.{}.mock/{order_id}.pdf", self.name)),
            order_id,
            tracking_number: tracking,
            status: ShipmentStatus::Confirmed,
            carrier: self.name.clone(),
            service_name: canned.name.to_string(),
            total_charged: Money::from_cents(canned.total_cents(), DEFAULT_CURRENCY),
            estimated_delivery: Some(Timestamp::now().add_days(i64::from(canned.transit_days))),
        })
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        req: &GetLabelRequest,
    ) -> CarrierResult<GetLabelResponse> {
        self.behavior.prelude(ctx, &self.name).await?;
        let url = format!(
            "https://labels.{}.mock/{}.{}",
            self.name, req.order_id, req.format
        );
        Ok(GetLabelResponse {
            order_id: req.order_id.clone(),
            label: Label::hosted(req.format, url),
            additional_labels: Vec::new(),
        })
    }

    async fn cancel_order(
        &self,
        ctx: &RequestContext,
        req: &CancelOrderRequest,
    ) -> CarrierResult<CancelOrderResponse> {
        self.behavior.prelude(ctx, &self.name).await?;
        Ok(CancelOrderResponse {
            order_id: req.order_id.clone(),
            status: ShipmentStatus::Cancelled,
            refund_amount: Some(Money::from_cents(1582, DEFAULT_CURRENCY)),
            confirmation_number: format!("CANCEL-{}", self.next()),
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        req: &GetTrackingRequest,
    ) -> CarrierResult<GetTrackingResponse> {
        self.behavior.prelude(ctx, &self.name).await?;
        let tracking_number = req
            .tracking_number
            .clone()
            .unwrap_or_else(|| req.order_id.clone());
        Ok(GetTrackingResponse {
            order_id: req.order_id.clone(),
            tracking_number,
            status: ShipmentStatus::InTransit,
            events: vec![TrackingEvent {
                timestamp: Timestamp::now().add_secs(-3600),
                description: "In transit".to_string(),
                location: "Toronto, ON".to_string(),
                status: ShipmentStatus::InTransit,
                carrier_code: "IT".to_string(),
            }],
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::error::codes;
    use crate::domain::value_objects::LabelFormat;
    use crate::domain::value_objects::ids::carrier_from_id;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn quote_has_two_consistent_rates() {
        let carrier = MockCarrier::new("alpha");
        let quote = carrier
            .get_quote(&RequestContext::new(), &QuoteRequest::default())
            .await
            .unwrap();
        assert_eq!(quote.rates.len(), 2);
        assert!(quote.rates.iter().all(RateOption::is_consistent));
        assert_eq!(quote.cheapest().unwrap().total_price.amount(), Decimal::new(1582, 2));
        assert!(quote.rates[1].guaranteed);
        assert!(quote.rates[0].rate_id.starts_with("alpha-"));
    }

    #[tokio::test]
    async fn known_name_uses_carrier_tag() {
        let carrier = MockCarrier::new("purolator");
        let quote = carrier
            .get_quote(&RequestContext::new(), &QuoteRequest::default())
            .await
            .unwrap();
        assert_eq!(carrier_from_id(&quote.rates[0].rate_id), "purolator");
    }

    #[tokio::test]
    async fn order_lifecycle() {
        let carrier = MockCarrier::new("alpha");
        let ctx = RequestContext::new();
        let order = carrier
            .create_order(
                &ctx,
                &CreateOrderRequest {
                    rate_id: "alpha-express-2".into(),
                    ..CreateOrderRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(order.status, ShipmentStatus::Confirmed);
        assert_eq!(order.total_charged.amount(), Decimal::new(2995, 2));

        let label = carrier
            .get_label(
                &ctx,
                &GetLabelRequest {
                    order_id: order.order_id.clone(),
                    format: LabelFormat::Zpl,
                },
            )
            .await
            .unwrap();
        assert!(label.label.url.unwrap().ends_with(".zpl"));

        let cancel = carrier
            .cancel_order(
                &ctx,
                &CancelOrderRequest {
                    order_id: order.order_id.clone(),
                    reason: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(cancel.status, ShipmentStatus::Cancelled);
        assert_eq!(cancel.refund_amount.unwrap().amount(), Decimal::new(1582, 2));
        assert!(cancel.confirmation_number.starts_with("CANCEL-"));
    }

    #[tokio::test]
    async fn failing_mock_reports_mock_error() {
        let carrier = MockCarrier::failing("broken");
        let err = carrier
            .get_quote(&RequestContext::new(), &QuoteRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::MOCK_ERROR);
        assert_eq!(err.carrier(), "broken");
    }

    #[tokio::test]
    async fn cancelled_context_stops_delayed_mock() {
        let carrier = MockCarrier::new("slow").with_latency(Duration::from_secs(30));
        let ctx = RequestContext::new();
        ctx.cancel();
        let err = carrier
            .get_quote(&ctx, &QuoteRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::CANCELLED);
    }
}

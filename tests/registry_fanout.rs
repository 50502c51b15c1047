//! Registry fan-out and routing over the mock-mode carriers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use carrier_gateway::application::bootstrap::build_registry;
use carrier_gateway::application::services::registry::{CarrierRegistry, RegistryConfig};
use carrier_gateway::config::GatewayConfig;
use carrier_gateway::domain::entities::{Address, Package};
use carrier_gateway::domain::error::codes;
use carrier_gateway::domain::messages::{
    CancelOrderRequest, CreateOrderRequest, GetLabelRequest, GetTrackingRequest, QuoteRequest,
};
use carrier_gateway::domain::value_objects::ids::{CANADAPOST, FREIGHTCOM, PUROLATOR};
use carrier_gateway::domain::value_objects::{
    LabelFormat, RequestContext, ShipmentStatus, carrier_from_id,
};
use carrier_gateway::infrastructure::carriers::MockCarrier;
use carrier_gateway::infrastructure::carriers::mock_support::MockBehavior;
use std::sync::Arc;
use std::time::Duration;

fn mock_registry() -> CarrierRegistry {
    let config = GatewayConfig::from_vars([
        ("FREIGHTCOM_USE_MOCK", "true"),
        ("CANADAPOST_USE_MOCK", "true"),
        ("PUROLATOR_USE_MOCK", "true"),
    ])
    .unwrap();
    build_registry(&config).unwrap()
}

fn quote_request() -> QuoteRequest {
    QuoteRequest {
        shipper_id: "shipper-1".into(),
        origin: Address {
            line1: "123 Main St".into(),
            city: "Toronto".into(),
            province_code: "ON".into(),
            postal_code: "M5V 3L9".into(),
            ..Address::default()
        },
        destination: Address {
            line1: "500 Rue Sherbrooke".into(),
            city: "Montreal".into(),
            province_code: "QC".into(),
            postal_code: "H2X 1Y4".into(),
            ..Address::default()
        },
        packages: vec![Package::new(30.0, 20.0, 10.0, 2.0)],
        ..QuoteRequest::default()
    }
}

mod fan_out {
    use super::*;

    #[tokio::test]
    async fn every_carrier_answers() {
        let registry = mock_registry();
        assert_eq!(registry.names(), [CANADAPOST, FREIGHTCOM, PUROLATOR]);

        let outcome = registry
            .get_all_quotes(&RequestContext::new(), &quote_request())
            .await;

        assert!(!outcome.has_errors(), "{:?}", outcome.errors);
        assert_eq!(outcome.responses.len(), 3);
        for resp in &outcome.responses {
            assert!(!resp.rates.is_empty());
            let owner = carrier_from_id(&resp.quote_id);
            for rate in &resp.rates {
                assert_eq!(carrier_from_id(&rate.rate_id), owner);
                assert_eq!(rate.carrier, owner);
            }
        }
    }

    #[tokio::test]
    async fn failing_carrier_does_not_hide_the_others() {
        let registry = mock_registry();
        registry.register(Arc::new(MockCarrier::failing("broken")));

        let outcome = registry
            .get_all_quotes(&RequestContext::new(), &quote_request())
            .await;

        assert_eq!(outcome.responses.len(), 3);
        assert_eq!(outcome.errors.len(), 1);
        let failure = outcome.errors.first().unwrap();
        assert_eq!(failure.carrier, "broken");
        assert_eq!(failure.error.code(), codes::MOCK_ERROR);
    }

    #[tokio::test]
    async fn subset_with_unknown_name() {
        let registry = mock_registry();

        let outcome = registry
            .get_quotes_from_carriers(
                &RequestContext::new(),
                &quote_request(),
                &[PUROLATOR, "ups", PUROLATOR],
            )
            .await;

        assert_eq!(outcome.responses.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        let failure = outcome.errors.first().unwrap();
        assert_eq!(failure.carrier, "ups");
        assert_eq!(failure.error.code(), codes::CARRIER_NOT_FOUND);
    }

    #[tokio::test]
    async fn slow_carrier_is_cut_off() {
        let registry = CarrierRegistry::with_config(
            RegistryConfig::default().with_per_carrier_timeout(Duration::from_millis(50)),
        );
        registry.register(Arc::new(MockCarrier::new(FREIGHTCOM)));
        registry.register(Arc::new(
            MockCarrier::new("slow").with_behavior(MockBehavior::delayed(Duration::from_secs(10))),
        ));

        let outcome = registry
            .get_all_quotes(&RequestContext::new(), &quote_request())
            .await;

        assert_eq!(outcome.responses.len(), 1);
        let failure = outcome.errors.first().unwrap();
        assert_eq!(failure.carrier, "slow");
        assert_eq!(failure.error.code(), codes::DEADLINE_EXCEEDED);
    }
}

mod routing {
    use super::*;

    #[tokio::test]
    async fn order_lifecycle_follows_the_rate_owner() {
        let registry = mock_registry();
        let ctx = RequestContext::new();
        let req = quote_request();

        let outcome = registry.get_all_quotes(&ctx, &req).await;
        let cheapest = outcome
            .responses
            .iter()
            .filter_map(|r| r.cheapest())
            .min_by_key(|r| r.total_price.amount())
            .cloned()
            .unwrap();
        let owner = carrier_from_id(&cheapest.rate_id);

        let order = registry
            .create_order(
                &ctx,
                &CreateOrderRequest {
                    rate_id: cheapest.rate_id.clone(),
                    sender_address: req.origin.clone(),
                    recipient_address: req.destination.clone(),
                    packages: req.packages.clone(),
                    ..CreateOrderRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(carrier_from_id(&order.order_id), owner);
        assert_eq!(order.carrier, owner);

        let label = registry
            .get_label(
                &ctx,
                &GetLabelRequest {
                    order_id: order.order_id.clone(),
                    format: LabelFormat::Pdf,
                },
            )
            .await
            .unwrap();
        assert_eq!(label.order_id, order.order_id);
        assert!(label.label.data.is_some() || label.label.url.is_some());

        let tracking = registry
            .get_tracking(
                &ctx,
                &GetTrackingRequest {
                    order_id: order.order_id.clone(),
                    tracking_number: Some(order.tracking_number.clone()),
                },
            )
            .await
            .unwrap();
        assert!(!tracking.events.is_empty());

        let cancelled = registry
            .cancel_order(
                &ctx,
                &CancelOrderRequest {
                    order_id: order.order_id.clone(),
                    reason: Some("changed plans".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(cancelled.status, ShipmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn untagged_ids_are_rejected() {
        let registry = mock_registry();

        let err = registry
            .get_label(
                &RequestContext::new(),
                &GetLabelRequest {
                    order_id: "ups-1Z999".to_string(),
                    format: LabelFormat::Pdf,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), codes::CARRIER_NOT_FOUND);
    }

    #[tokio::test]
    async fn caller_cancellation_stops_the_fan_out() {
        let registry = CarrierRegistry::new();
        registry.register(Arc::new(
            MockCarrier::new(PUROLATOR).with_behavior(MockBehavior::delayed(Duration::from_secs(10))),
        ));
        let ctx = RequestContext::new();
        ctx.cancel();

        let outcome = registry.get_all_quotes(&ctx, &quote_request()).await;

        assert!(outcome.responses.is_empty());
        assert_eq!(outcome.errors.first().unwrap().error.code(), codes::CANCELLED);
    }
}

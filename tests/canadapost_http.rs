//! Canada Post adapter against a stubbed XML REST API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use carrier_gateway::domain::entities::{Address, Contact, Package};
use carrier_gateway::domain::error::codes;
use carrier_gateway::domain::messages::{
    CancelOrderRequest, CreateOrderRequest, GetLabelRequest, GetTrackingRequest, QuoteRequest,
};
use carrier_gateway::domain::value_objects::{
    LabelFormat, RequestContext, ServiceType, ShipmentStatus,
};
use carrier_gateway::infrastructure::carriers::Carrier;
use carrier_gateway::infrastructure::carriers::canadapost::{CanadaPostCarrier, CanadaPostConfig};
use rust_decimal::Decimal;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str = "0009876543";

const PRICE_QUOTES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<price-quotes xmlns="http://www.canadapost.ca/ws/ship/rate-v4">
  <price-quote>
    <service-code>DOM.RP</service-code>
    <service-name>Regular Parcel</service-name>
    <price-details>
      <base>12.50</base>
      <taxes><gst>0.00</gst><pst>0.00</pst><hst percent="13.00">1.79</hst></taxes>
      <due>15.29</due>
      <adjustments>
        <adjustment><adjustment-code>FUELSC</adjustment-code><adjustment-cost>1.00</adjustment-cost></adjustment>
      </adjustments>
    </price-details>
    <service-standard>
      <guaranteed-delivery>false</guaranteed-delivery>
      <expected-transit-time>4</expected-transit-time>
      <expected-delivery-date>2026-10-22</expected-delivery-date>
    </service-standard>
  </price-quote>
  <price-quote>
    <service-code>DOM.XP</service-code>
    <service-name>Xpresspost</service-name>
    <price-details>
      <base>20.00</base>
      <taxes><gst>0.00</gst><pst>0.00</pst><hst percent="13.00">2.86</hst></taxes>
      <due>24.86</due>
      <adjustments>
        <adjustment><adjustment-code>FUELSC</adjustment-code><adjustment-cost>2.00</adjustment-cost></adjustment>
      </adjustments>
    </price-details>
    <service-standard>
      <guaranteed-delivery>true</guaranteed-delivery>
      <expected-transit-time>1</expected-transit-time>
      <expected-delivery-date>2026-10-19</expected-delivery-date>
    </service-standard>
  </price-quote>
</price-quotes>"#;

const MESSAGES: &str = r#"<messages xmlns="http://www.canadapost.ca/ws/messages">
  <message><code>E1002</code><description>Postal code is invalid.</description></message>
</messages>"#;

fn carrier(server: &MockServer) -> CanadaPostCarrier {
    CanadaPostCarrier::new(CanadaPostConfig {
        api_key: "user".to_string(),
        api_secret: "pass".to_string(),
        account_id: ACCOUNT.to_string(),
        base_url: server.uri(),
        ..CanadaPostConfig::default()
    })
    .unwrap()
}

fn toronto() -> Address {
    Address {
        line1: "1 Front St W".into(),
        city: "Toronto".into(),
        province_code: "ON".into(),
        postal_code: "M5V 3L9".into(),
        ..Address::default()
    }
}

fn ottawa() -> Address {
    Address {
        line1: "111 Wellington St".into(),
        city: "Ottawa".into(),
        province_code: "ON".into(),
        postal_code: "K1A 0A9".into(),
        ..Address::default()
    }
}

mod quotes {
    use super::*;

    #[tokio::test]
    async fn rates_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rs/ship/price"))
            .and(header("Authorization", "Basic dXNlcjpwYXNz"))
            .and(header("Content-Type", "application/vnd.cpc.ship.rate-v4+xml"))
            .and(body_string_contains("M5V3L9"))
            .and(body_string_contains("K1A0A9"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PRICE_QUOTES))
            .expect(1)
            .mount(&server)
            .await;

        let resp = carrier(&server)
            .get_quote(
                &RequestContext::new(),
                &QuoteRequest {
                    origin: toronto(),
                    destination: ottawa(),
                    packages: vec![Package::new(30.0, 20.0, 10.0, 2.0)],
                    ..QuoteRequest::default()
                },
            )
            .await
            .unwrap();

        assert!(resp.quote_id.starts_with("cp-"));
        assert_eq!(resp.rates.len(), 2);
        let xpresspost = resp.rates.get(1).unwrap();
        assert!(xpresspost.rate_id.starts_with("cp-DOM.XP-"));
        assert_eq!(xpresspost.service_type, ServiceType::Express);
        assert_eq!(xpresspost.fuel_surcharge.amount(), Decimal::new(200, 2));
        assert_eq!(xpresspost.taxes.amount(), Decimal::new(286, 2));
        assert_eq!(xpresspost.total_price.currency(), "CAD");
        assert!(xpresspost.guaranteed);
        assert!(resp.rates.iter().all(|r| r.is_consistent()));
    }

    #[tokio::test]
    async fn messages_body_becomes_carrier_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rs/ship/price"))
            .respond_with(ResponseTemplate::new(400).set_body_string(MESSAGES))
            .mount(&server)
            .await;

        let err = carrier(&server)
            .get_quote(
                &RequestContext::new(),
                &QuoteRequest {
                    origin: toronto(),
                    destination: ottawa(),
                    packages: vec![Package::new(30.0, 20.0, 10.0, 2.0)],
                    ..QuoteRequest::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.carrier(), "canadapost");
        assert_eq!(err.code(), "E1002");
        assert_eq!(err.message(), "Postal code is invalid.");
        assert_eq!(err.status_code(), Some(400));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PRICE_QUOTES))
            .expect(0)
            .mount(&server)
            .await;

        let err = carrier(&server)
            .get_quote(
                &RequestContext::new(),
                &QuoteRequest {
                    origin: toronto(),
                    destination: ottawa(),
                    ..QuoteRequest::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), codes::INVALID_PACKAGE);
    }
}

mod shipments {
    use super::*;

    #[tokio::test]
    async fn shipment_is_created_under_the_account() {
        let server = MockServer::start().await;
        let label_href = format!("{}/rs/{ACCOUNT}/artifact/340531309186521749", server.uri());
        let body = format!(
            r#"<shipment-info xmlns="http://www.canadapost.ca/ws/shipment-v8">
  <shipment-id>340531309186521749</shipment-id>
  <shipment-status>created</shipment-status>
  <tracking-pin>1234567890123456</tracking-pin>
  <links>
    <link rel="self" href="https://x/self" media-type="application/vnd.cpc.shipment-v8+xml"/>
    <link rel="label" href="{label_href}" media-type="application/pdf"/>
  </links>
</shipment-info>"#
        );
        Mock::given(method("POST"))
            .and(path(format!("/rs/{ACCOUNT}/default/shipment")))
            .and(body_string_contains("<service-code>DOM.XP</service-code>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let order = carrier(&server)
            .create_order(
                &RequestContext::new(),
                &CreateOrderRequest {
                    rate_id: "cp-DOM.XP-20261016120000".to_string(),
                    sender: Contact {
                        name: "Shipper".into(),
                        ..Contact::default()
                    },
                    sender_address: toronto(),
                    recipient: Contact {
                        name: "Receiver".into(),
                        ..Contact::default()
                    },
                    recipient_address: ottawa(),
                    packages: vec![Package::new(30.0, 20.0, 10.0, 2.0)],
                    ..CreateOrderRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(order.order_id, "cp-340531309186521749");
        assert_eq!(order.tracking_number, "1234567890123456");
        assert_eq!(order.status, ShipmentStatus::Confirmed);
        assert_eq!(order.label_url, Some(label_href));
    }

    #[tokio::test]
    async fn raw_label_is_base64_encoded() {
        let server = MockServer::start().await;
        let pdf = b"%PDF-1.4 label bytes".to_vec();
        Mock::given(method("GET"))
            .and(path(format!("/rs/{ACCOUNT}/artifact/340531309186521749")))
            .and(header("Accept", "application/pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf.clone()))
            .mount(&server)
            .await;

        let resp = carrier(&server)
            .get_label(
                &RequestContext::new(),
                &GetLabelRequest {
                    order_id: "cp-340531309186521749".to_string(),
                    format: LabelFormat::Pdf,
                },
            )
            .await
            .unwrap();

        assert_eq!(resp.label.format, LabelFormat::Pdf);
        assert_eq!(resp.label.data, Some(BASE64.encode(&pdf)));
        assert!(resp.label.url.is_none());
    }

    #[tokio::test]
    async fn void_reports_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("/rs/{ACCOUNT}/shipment/340531309186521749")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let resp = carrier(&server)
            .cancel_order(
                &RequestContext::new(),
                &CancelOrderRequest {
                    order_id: "cp-340531309186521749".to_string(),
                    reason: Some("customer request".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(resp.status, ShipmentStatus::Cancelled);
        assert_eq!(resp.confirmation_number, "340531309186521749-VOID");
    }

    #[tokio::test]
    async fn tracking_prefers_the_tracking_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vis/track/pin/1234567890123456/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<tracking-summary xmlns="http://www.canadapost.ca/ws/track">
  <pin-summary>
    <pin>1234567890123456</pin>
    <event-date-time>2026-10-15T09:30:00</event-date-time>
    <event-description>Item in transit</event-description>
    <event-type>in_transit</event-type>
    <event-location>MISSISSAUGA, ON</event-location>
  </pin-summary>
</tracking-summary>"#,
            ))
            .mount(&server)
            .await;

        let resp = carrier(&server)
            .get_tracking(
                &RequestContext::new(),
                &GetTrackingRequest {
                    order_id: "cp-340531309186521749".to_string(),
                    tracking_number: Some("1234567890123456".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(resp.tracking_number, "1234567890123456");
        assert_eq!(resp.status, ShipmentStatus::InTransit);
        assert_eq!(resp.events.len(), 1);
        assert_eq!(resp.events.first().unwrap().location, "MISSISSAUGA, ON");
    }

    #[tokio::test]
    async fn server_errors_are_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = carrier(&server)
            .get_label(
                &RequestContext::new(),
                &GetLabelRequest {
                    order_id: "cp-1".to_string(),
                    format: LabelFormat::Zpl,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "HTTP_503");
        assert!(err.is_retryable());
    }
}

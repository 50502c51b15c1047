//! # Canada Post Adapter
//!
//! Maps the domain contract onto [`CanadaPostApi`].
//!
//! Canada Post rates a single parcel, so quotes and shipments use the first
//! package only. Rate ids carry the service code and the quote time:
//! `cp-{service_code}-{YYYYMMDDhhmmss}`. All amounts are CAD.

use super::api::{
    Address as WireAddress, CanadaPostApi, Destination, Dimensions, Rate, RatesRequest,
    ShipmentRequest,
};
use super::http::HttpCanadaPostApi;
use super::mock::MockCanadaPostApi;
use crate::domain::entities::{Address, Contact, Label, Order, Package, RateOption, TrackingEvent};
use crate::domain::error::{CarrierError, CarrierResult, Sentinel};
use crate::domain::messages::{
    CancelOrderRequest, CancelOrderResponse, CreateOrderRequest, CreateOrderResponse,
    GetLabelRequest, GetLabelResponse, GetTrackingRequest, GetTrackingResponse, QuoteRequest,
    QuoteResponse,
};
use crate::domain::value_objects::ids::{CANADAPOST, CarrierTag};
use crate::domain::value_objects::{
    LabelFormat, Money, RequestContext, ServiceType, ShipmentStatus, Timestamp,
};
use crate::infrastructure::carriers::traits::Carrier;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Live API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://soa-gw.canadapost.ca";

/// Service booked when a rate id does not carry one.
pub const DEFAULT_SERVICE_CODE: &str = "DOM.RP";

/// Shipment group used for every order.
pub const DEFAULT_GROUP_ID: &str = "default";

const TAG: CarrierTag = CarrierTag::CanadaPost;

/// Canada Post settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanadaPostConfig {
    /// API user name.
    pub api_key: String,
    /// API password; may be empty for key-only credentials.
    pub api_secret: String,
    /// Customer (mailed-by) number.
    pub account_id: String,
    /// API root.
    pub base_url: String,
    /// Bind the canned transport instead of HTTP.
    pub use_mock: bool,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl Default for CanadaPostConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            account_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            use_mock: false,
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Canada Post carrier adapter.
#[derive(Debug, Clone)]
pub struct CanadaPostCarrier {
    config: CanadaPostConfig,
    api: Arc<dyn CanadaPostApi>,
}

impl CanadaPostCarrier {
    /// Creates the adapter, binding the mock or HTTP transport per
    /// `config.use_mock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be built.
    pub fn new(config: CanadaPostConfig) -> CarrierResult<Self> {
        let api: Arc<dyn CanadaPostApi> = if config.use_mock {
            Arc::new(MockCanadaPostApi::new())
        } else {
            Arc::new(HttpCanadaPostApi::new(&config)?)
        };
        Ok(Self { config, api })
    }

    /// Creates the adapter over an existing transport.
    #[must_use]
    pub fn with_api(config: CanadaPostConfig, api: Arc<dyn CanadaPostApi>) -> Self {
        Self { config, api }
    }

    /// Returns the settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CanadaPostConfig {
        &self.config
    }
}

#[async_trait]
impl Carrier for CanadaPostCarrier {
    fn name(&self) -> &str {
        CANADAPOST
    }

    async fn get_quote(
        &self,
        ctx: &RequestContext,
        req: &QuoteRequest,
    ) -> CarrierResult<QuoteResponse> {
        req.validate(CANADAPOST)?;
        tracing::info!(
            carrier = CANADAPOST,
            origin = %req.origin.postal_code,
            destination = %req.destination.postal_code,
            packages = req.packages.len(),
            "Getting quote"
        );

        let (weight_kg, dimensions) = parcel(&req.packages);
        let wire = RatesRequest {
            customer_number: self.config.account_id.clone(),
            weight_kg,
            dimensions,
            origin_postal_code: req.origin.normalized_postal_code(),
            destination: destination(&req.destination),
        };
        let resp = self
            .api
            .get_rates(ctx, &wire)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Canada Post rate request failed"))?;

        let now = Timestamp::now();
        let expires_at = now.add_mins(30);
        let rates = resp
            .rates
            .iter()
            .map(|r| to_rate_option(r, now, expires_at))
            .collect::<CarrierResult<Vec<_>>>()?;

        Ok(QuoteResponse {
            quote_id: TAG.tag(&resp.quote_id),
            rates,
            expires_at,
        })
    }

    async fn create_order(
        &self,
        ctx: &RequestContext,
        req: &CreateOrderRequest,
    ) -> CarrierResult<CreateOrderResponse> {
        let service_code = extract_service_code(&req.rate_id);
        tracing::info!(
            carrier = CANADAPOST,
            rate_id = %req.rate_id,
            service_code,
            "Creating order"
        );

        let (weight_kg, dimensions) = parcel(&req.packages);
        let wire = ShipmentRequest {
            group_id: DEFAULT_GROUP_ID.to_string(),
            service_code: service_code.to_string(),
            sender: address(&req.sender, &req.sender_address),
            destination: address(&req.recipient, &req.recipient_address),
            weight_kg,
            dimensions,
        };
        let ship = self
            .api
            .create_shipment(ctx, &wire)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Canada Post shipment creation failed"))?;

        Ok(Order {
            order_id: TAG.tag(&ship.shipment_id),
            tracking_url: ship.link("tracking").unwrap_or_default().to_string(),
            label_url: ship.link("label").map(str::to_string),
            tracking_number: ship.tracking_pin,
            status: map_status(&ship.status),
            carrier: CANADAPOST.to_string(),
            service_name: ship.service_name,
            total_charged: cad(ship.total_charged)?,
            estimated_delivery: Timestamp::parse_date(&ship.expected_delivery),
        })
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        req: &GetLabelRequest,
    ) -> CarrierResult<GetLabelResponse> {
        let shipment_id = TAG.strip(&req.order_id);
        tracing::info!(carrier = CANADAPOST, shipment_id, format = %req.format, "Getting label");

        let (format, media_type) = match req.format {
            LabelFormat::Zpl => (LabelFormat::Zpl, "application/zpl"),
            LabelFormat::Pdf | LabelFormat::Png => (LabelFormat::Pdf, "application/pdf"),
        };
        let resp = self
            .api
            .get_label(ctx, shipment_id, media_type)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Canada Post label request failed"))?;
        if resp.data.is_empty() {
            return Err(CarrierError::from_sentinel(CANADAPOST, Sentinel::LabelNotAvailable));
        }

        Ok(GetLabelResponse {
            order_id: req.order_id.clone(),
            label: Label::inline(format, BASE64.encode(&resp.data)),
            additional_labels: Vec::new(),
        })
    }

    async fn cancel_order(
        &self,
        ctx: &RequestContext,
        req: &CancelOrderRequest,
    ) -> CarrierResult<CancelOrderResponse> {
        let shipment_id = TAG.strip(&req.order_id);
        tracing::info!(carrier = CANADAPOST, shipment_id, "Cancelling order");

        let resp = self
            .api
            .void_shipment(ctx, shipment_id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Canada Post void failed"))?;

        Ok(CancelOrderResponse {
            order_id: req.order_id.clone(),
            status: map_status(&resp.status),
            refund_amount: None,
            confirmation_number: format!("{}-VOID", resp.shipment_id),
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        req: &GetTrackingRequest,
    ) -> CarrierResult<GetTrackingResponse> {
        let pin = req
            .tracking_number
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| TAG.strip(&req.order_id));
        tracing::info!(carrier = CANADAPOST, pin, "Getting tracking");

        let resp = self
            .api
            .get_tracking(ctx, pin)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Canada Post tracking request failed"))?;

        Ok(GetTrackingResponse {
            order_id: req.order_id.clone(),
            tracking_number: if resp.tracking_pin.is_empty() {
                pin.to_string()
            } else {
                resp.tracking_pin
            },
            status: map_status(&resp.status),
            events: resp
                .events
                .into_iter()
                .map(|e| TrackingEvent {
                    timestamp: Timestamp::parse_lenient(&e.timestamp).unwrap_or_else(Timestamp::now),
                    description: e.description,
                    location: e.location,
                    status: map_status(&e.kind),
                    carrier_code: e.kind,
                })
                .collect(),
        })
    }
}

/// Weight and size of the first package, in kg and cm.
fn parcel(packages: &[Package]) -> (f64, Dimensions) {
    packages.first().map_or((0.0, Dimensions::default()), |pkg| {
        let (length, width, height) = pkg.dimensions_cm();
        (
            pkg.weight_kg(),
            Dimensions {
                length,
                width,
                height,
            },
        )
    })
}

fn destination(addr: &Address) -> Destination {
    match addr.country_code.trim().to_uppercase().as_str() {
        "" | "CA" => Destination::Domestic {
            postal_code: addr.normalized_postal_code(),
        },
        "US" => Destination::UnitedStates {
            zip_code: addr.normalized_postal_code(),
        },
        other => Destination::International {
            country_code: other.to_string(),
        },
    }
}

fn address(contact: &Contact, addr: &Address) -> WireAddress {
    WireAddress {
        name: contact.name.clone(),
        company: contact
            .company
            .clone()
            .or_else(|| addr.company.clone())
            .unwrap_or_default(),
        address_line_1: addr.line1.clone(),
        address_line_2: addr.line2.clone(),
        city: addr.city.clone(),
        province: addr.province_code.clone(),
        postal_code: addr.normalized_postal_code(),
        country_code: addr.country().to_uppercase(),
        phone: contact.phone.clone().unwrap_or_else(|| addr.phone.clone()),
    }
}

fn cad(amount: Decimal) -> CarrierResult<Money> {
    Money::cad(amount).map_err(|e| {
        CarrierError::parse(CANADAPOST, format!("Invalid amount in response: {e}")).with_cause(e)
    })
}

fn to_rate_option(rate: &Rate, now: Timestamp, expires_at: Timestamp) -> CarrierResult<RateOption> {
    let option = RateOption {
        rate_id: TAG.tag(&format!("{}-{}", rate.service_code, now.to_compact())),
        carrier: CANADAPOST.to_string(),
        service_code: rate.service_code.clone(),
        service_name: rate.service_name.clone(),
        service_type: map_service_type(&rate.service_code),
        base_rate: cad(rate.base_rate)?,
        fuel_surcharge: cad(rate.fuel_surcharge)?,
        taxes: cad(rate.taxes)?,
        total_price: cad(rate.total_price)?,
        transit_days: rate.expected_transit,
        estimated_delivery: Timestamp::parse_date(&rate.expected_delivery),
        expires_at,
        signature_required: false,
        guaranteed: rate.guaranteed,
    };
    if !option.is_consistent() {
        tracing::warn!(
            rate_id = %option.rate_id,
            total = %option.total_price,
            "Rate components do not sum to total"
        );
    }
    Ok(option)
}

/// Recovers the service code from `cp-{service_code}-{timestamp}`.
#[must_use]
pub fn extract_service_code(rate_id: &str) -> &str {
    TAG.strip(rate_id)
        .rsplit_once('-')
        .map(|(code, _)| code)
        .filter(|code| !code.is_empty())
        .unwrap_or(DEFAULT_SERVICE_CODE)
}

/// Classifies a Canada Post service code.
#[must_use]
pub fn map_service_type(code: &str) -> ServiceType {
    match code {
        "DOM.XP" | "DOM.EP" => ServiceType::Express,
        "DOM.PC" => ServiceType::Priority,
        _ => ServiceType::Standard,
    }
}

/// Maps a Canada Post shipment or tracking status.
#[must_use]
pub fn map_status(status: &str) -> ShipmentStatus {
    match status {
        "created" | "transmitted" => ShipmentStatus::Confirmed,
        "voided" => ShipmentStatus::Cancelled,
        "in_transit" => ShipmentStatus::InTransit,
        "delivered" => ShipmentStatus::Delivered,
        _ => ShipmentStatus::Pending,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::error::codes;
    use crate::domain::value_objects::carrier_from_id;
    use crate::infrastructure::carriers::canadapost::api::{LabelResponse, RatesResponse};
    use bytes::Bytes;
    use std::sync::Mutex;

    fn mock_carrier() -> CanadaPostCarrier {
        CanadaPostCarrier::new(CanadaPostConfig {
            use_mock: true,
            ..CanadaPostConfig::default()
        })
        .unwrap()
    }

    fn quote_request(country: &str, postal: &str) -> QuoteRequest {
        QuoteRequest {
            origin: Address {
                postal_code: "M5V 3L9".into(),
                ..Address::default()
            },
            destination: Address {
                postal_code: postal.into(),
                country_code: country.into(),
                ..Address::default()
            },
            packages: vec![
                Package::new(30.0, 20.0, 10.0, 2.5),
                Package::new(99.0, 99.0, 99.0, 50.0),
            ],
            ..QuoteRequest::default()
        }
    }

    mod mapping {
        use super::*;

        #[test]
        fn service_code_recovered_from_rate_id() {
            assert_eq!(extract_service_code("cp-DOM.XP-20240601120000"), "DOM.XP");
            assert_eq!(extract_service_code("cp-DOM.RP"), DEFAULT_SERVICE_CODE);
            assert_eq!(extract_service_code("cp--20240601120000"), DEFAULT_SERVICE_CODE);
        }

        #[test]
        fn destination_variants() {
            let dest = |country: &str| {
                destination(&Address {
                    postal_code: "h2x 1y4".into(),
                    country_code: country.into(),
                    ..Address::default()
                })
            };
            assert_eq!(
                dest(""),
                Destination::Domestic {
                    postal_code: "H2X1Y4".into()
                }
            );
            assert_eq!(
                dest("us"),
                Destination::UnitedStates {
                    zip_code: "H2X1Y4".into()
                }
            );
            assert_eq!(
                dest("FR"),
                Destination::International {
                    country_code: "FR".into()
                }
            );
        }

        #[test]
        fn service_types_and_statuses() {
            assert_eq!(map_service_type("DOM.EP"), ServiceType::Express);
            assert_eq!(map_service_type("DOM.PC"), ServiceType::Priority);
            assert_eq!(map_service_type("USA.EP"), ServiceType::Standard);
            assert_eq!(map_status("transmitted"), ShipmentStatus::Confirmed);
            assert_eq!(map_status("voided"), ShipmentStatus::Cancelled);
            assert_eq!(map_status("accepted"), ShipmentStatus::Pending);
        }
    }

    mod operations {
        use super::*;

        #[tokio::test]
        async fn quote_uses_first_package_and_cad() {
            let seen = Arc::new(Mutex::new(None));
            let captured = Arc::clone(&seen);
            let api = MockCanadaPostApi {
                on_get_rates: Some(Arc::new(move |_: &RequestContext, req: &RatesRequest| {
                    *captured.lock().unwrap() = Some(req.clone());
                    Ok(RatesResponse {
                        quote_id: "q1".into(),
                        rates: Vec::new(),
                    })
                })),
                ..MockCanadaPostApi::default()
            };
            let config = CanadaPostConfig {
                account_id: "0001234567".into(),
                ..CanadaPostConfig::default()
            };
            let carrier = CanadaPostCarrier::with_api(config, Arc::new(api));
            let quote = carrier
                .get_quote(&RequestContext::new(), &quote_request("CA", "H2X 1Y4"))
                .await
                .unwrap();
            assert_eq!(quote.quote_id, "cp-q1");

            let wire = seen.lock().unwrap().clone().unwrap();
            assert!((wire.weight_kg - 2.5).abs() < f64::EPSILON);
            assert!((wire.dimensions.length - 30.0).abs() < f64::EPSILON);
            assert_eq!(wire.customer_number, "0001234567");
            assert_eq!(wire.origin_postal_code, "M5V3L9");
        }

        #[tokio::test]
        async fn international_quote_without_postal_code() {
            let seen = Arc::new(Mutex::new(None));
            let captured = Arc::clone(&seen);
            let api = MockCanadaPostApi {
                on_get_rates: Some(Arc::new(move |_: &RequestContext, req: &RatesRequest| {
                    *captured.lock().unwrap() = Some(req.destination.clone());
                    Ok(RatesResponse {
                        quote_id: "q2".into(),
                        rates: Vec::new(),
                    })
                })),
                ..MockCanadaPostApi::default()
            };
            let carrier = CanadaPostCarrier::with_api(CanadaPostConfig::default(), Arc::new(api));

            carrier
                .get_quote(&RequestContext::new(), &quote_request("HK", ""))
                .await
                .unwrap();

            assert_eq!(
                seen.lock().unwrap().clone().unwrap(),
                Destination::International {
                    country_code: "HK".into()
                }
            );
        }

        #[tokio::test]
        async fn canned_international_quote() {
            let quote = mock_carrier()
                .get_quote(&RequestContext::new(), &quote_request("HK", ""))
                .await
                .unwrap();
            assert!(!quote.rates.is_empty());
        }

        #[tokio::test]
        async fn canned_quote_rates() {
            let quote = mock_carrier()
                .get_quote(&RequestContext::new(), &quote_request("", "H2X1Y4"))
                .await
                .unwrap();
            assert_eq!(quote.rates.len(), 3);
            for rate in &quote.rates {
                assert_eq!(carrier_from_id(&rate.rate_id), CANADAPOST);
                assert_eq!(extract_service_code(&rate.rate_id), rate.service_code);
                assert_eq!(rate.total_price.currency(), "CAD");
                assert_eq!(rate.expires_at, quote.expires_at);
            }
            let priority = quote.rates.last().unwrap();
            assert_eq!(priority.service_type, ServiceType::Priority);
            assert!(priority.guaranteed);
        }

        #[tokio::test]
        async fn order_label_cancel_and_tracking() {
            let carrier = mock_carrier();
            let ctx = RequestContext::new();
            let order = carrier
                .create_order(
                    &ctx,
                    &CreateOrderRequest {
                        rate_id: "cp-DOM.XP-20240601120000".into(),
                        ..CreateOrderRequest::default()
                    },
                )
                .await
                .unwrap();
            assert!(order.order_id.starts_with("cp-ship-"));
            assert_eq!(order.status, ShipmentStatus::Confirmed);
            assert!(order.tracking_url.ends_with(&order.tracking_number));
            assert_eq!(order.total_charged.amount(), Decimal::new(1265, 2));

            let label = carrier
                .get_label(
                    &ctx,
                    &GetLabelRequest {
                        order_id: order.order_id.clone(),
                        format: LabelFormat::Pdf,
                    },
                )
                .await
                .unwrap();
            assert!(label.label.is_inline());
            let pdf = BASE64.decode(label.label.data.unwrap()).unwrap();
            assert!(pdf.starts_with(b"%PDF"));

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
            assert!(cancel.refund_amount.is_none());
            assert_eq!(
                cancel.confirmation_number,
                format!("{}-VOID", TAG.strip(&order.order_id))
            );

            let tracking = carrier
                .get_tracking(
                    &ctx,
                    &GetTrackingRequest {
                        order_id: order.order_id.clone(),
                        tracking_number: Some(order.tracking_number.clone()),
                    },
                )
                .await
                .unwrap();
            assert_eq!(tracking.tracking_number, order.tracking_number);
            assert_eq!(tracking.status, ShipmentStatus::InTransit);
            assert_eq!(tracking.events.len(), 2);
        }

        #[tokio::test]
        async fn zpl_is_requested_by_media_type() {
            let api = MockCanadaPostApi {
                on_get_label: Some(Arc::new(|_: &RequestContext, args: &(String, String)| {
                    assert_eq!(args.1, "application/zpl");
                    Ok(LabelResponse {
                        shipment_id: args.0.clone(),
                        media_type: args.1.clone(),
                        data: Bytes::from_static(b"^XA^XZ"),
                    })
                })),
                ..MockCanadaPostApi::default()
            };
            let carrier = CanadaPostCarrier::with_api(CanadaPostConfig::default(), Arc::new(api));
            let label = carrier
                .get_label(
                    &RequestContext::new(),
                    &GetLabelRequest {
                        order_id: "cp-1".into(),
                        format: LabelFormat::Zpl,
                    },
                )
                .await
                .unwrap();
            assert_eq!(label.label.format, LabelFormat::Zpl);
        }

        #[tokio::test]
        async fn empty_label_is_not_available() {
            let api = MockCanadaPostApi {
                on_get_label: Some(Arc::new(|_: &RequestContext, args: &(String, String)| {
                    Ok(LabelResponse {
                        shipment_id: args.0.clone(),
                        ..LabelResponse::default()
                    })
                })),
                ..MockCanadaPostApi::default()
            };
            let carrier = CanadaPostCarrier::with_api(CanadaPostConfig::default(), Arc::new(api));
            let err = carrier
                .get_label(
                    &RequestContext::new(),
                    &GetLabelRequest {
                        order_id: "cp-1".into(),
                        format: LabelFormat::Pdf,
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.code(), codes::LABEL_NOT_AVAILABLE);
        }

        #[tokio::test]
        async fn tracking_falls_back_to_order_id() {
            let api = MockCanadaPostApi {
                on_get_tracking: Some(Arc::new(|_: &RequestContext, pin: &String| {
                    assert_eq!(pin, "ship-9");
                    Ok(Default::default())
                })),
                ..MockCanadaPostApi::default()
            };
            let carrier = CanadaPostCarrier::with_api(CanadaPostConfig::default(), Arc::new(api));
            let tracking = carrier
                .get_tracking(
                    &RequestContext::new(),
                    &GetTrackingRequest {
                        order_id: "cp-ship-9".into(),
                        tracking_number: None,
                    },
                )
                .await
                .unwrap();
            assert_eq!(tracking.tracking_number, "ship-9");
            assert!(tracking.events.is_empty());
        }
    }
}

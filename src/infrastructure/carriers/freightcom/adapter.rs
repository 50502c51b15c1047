//! # Freightcom Adapter
//!
//! Maps the domain contract onto [`FreightcomApi`].
//!
//! Rate ids carry the Freightcom service id so an order can be booked from
//! the rate id alone: `fc-{service_id}-{carrier_rate_id}`. Order ids are the
//! tagged shipment id.

use super::api::{
    Contact as WireContact, FreightcomApi, Location, Package as WirePackage, PackagingInfo, Rate,
    RatesRequest, ShipmentRequest, ShippingDetails,
};
use super::http::HttpFreightcomApi;
use super::mock::MockFreightcomApi;
use crate::domain::entities::{Address, Contact, Label, Order, Package, RateOption, TrackingEvent};
use crate::domain::error::{CarrierError, CarrierResult, Sentinel};
use crate::domain::messages::{
    CancelOrderRequest, CancelOrderResponse, CreateOrderRequest, CreateOrderResponse,
    GetLabelRequest, GetLabelResponse, GetTrackingRequest, GetTrackingResponse, QuoteRequest,
    QuoteResponse,
};
use crate::domain::value_objects::ids::{CarrierTag, FREIGHTCOM};
use crate::domain::value_objects::{
    LabelFormat, Money, RequestContext, ServiceType, ShipmentStatus, Timestamp,
};
use crate::infrastructure::carriers::traits::Carrier;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Live API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.freightcom.com/v1";

/// Service booked when a rate id does not carry one.
pub const DEFAULT_SERVICE_ID: i64 = 101;

const TAG: CarrierTag = CarrierTag::Freightcom;

/// Freightcom settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreightcomConfig {
    /// Value of the `X-API-Key` header.
    pub api_key: String,
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Payment method charged for shipments.
    pub payment_method_id: i64,
    /// Bind the canned transport instead of HTTP.
    pub use_mock: bool,
    /// Fixed delay between poll attempts.
    pub poll_interval: Duration,
    /// Wall-clock limit for one poll loop.
    pub poll_timeout: Duration,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl Default for FreightcomConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            payment_method_id: 0,
            use_mock: false,
            poll_interval: Duration::from_millis(500),
            poll_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Freightcom carrier adapter.
#[derive(Debug, Clone)]
pub struct FreightcomCarrier {
    config: FreightcomConfig,
    api: Arc<dyn FreightcomApi>,
}

impl FreightcomCarrier {
    /// Creates the adapter, binding the mock or HTTP transport per
    /// `config.use_mock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be built.
    pub fn new(config: FreightcomConfig) -> CarrierResult<Self> {
        let api: Arc<dyn FreightcomApi> = if config.use_mock {
            Arc::new(MockFreightcomApi::new())
        } else {
            Arc::new(HttpFreightcomApi::new(&config)?)
        };
        Ok(Self { config, api })
    }

    /// Creates the adapter over an existing transport.
    #[must_use]
    pub fn with_api(config: FreightcomConfig, api: Arc<dyn FreightcomApi>) -> Self {
        Self { config, api }
    }

    /// Returns the settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FreightcomConfig {
        &self.config
    }
}

#[async_trait]
impl Carrier for FreightcomCarrier {
    fn name(&self) -> &str {
        FREIGHTCOM
    }

    async fn get_quote(
        &self,
        ctx: &RequestContext,
        req: &QuoteRequest,
    ) -> CarrierResult<QuoteResponse> {
        req.validate(FREIGHTCOM)?;
        tracing::info!(
            carrier = FREIGHTCOM,
            origin = %req.origin.postal_code,
            destination = %req.destination.postal_code,
            packages = req.packages.len(),
            "Getting quote"
        );

        let wire = RatesRequest {
            details: details(&req.origin, &req.destination, &req.packages),
            ..RatesRequest::default()
        };
        let resp = self
            .api
            .get_rates(ctx, &wire)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Freightcom rate request failed"))?;

        let rates = resp
            .rates
            .iter()
            .map(to_rate_option)
            .collect::<CarrierResult<Vec<_>>>()?;
        let expires_at = rates
            .first()
            .map_or_else(|| Timestamp::now().add_mins(30), |r| r.expires_at);

        Ok(QuoteResponse {
            quote_id: TAG.tag(&resp.request_id),
            rates,
            expires_at,
        })
    }

    async fn create_order(
        &self,
        ctx: &RequestContext,
        req: &CreateOrderRequest,
    ) -> CarrierResult<CreateOrderResponse> {
        let service_id = extract_service_id(&req.rate_id);
        tracing::info!(
            carrier = FREIGHTCOM,
            rate_id = %req.rate_id,
            service_id,
            "Creating order"
        );

        let wire = ShipmentRequest {
            unique_id: req
                .reference
                .clone()
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            payment_method_id: self.config.payment_method_id,
            service_id,
            details: details(&req.sender_address, &req.recipient_address, &req.packages),
            sender: contact(&req.sender),
            recipient: contact(&req.recipient),
            reference: req.reference.clone().unwrap_or_default(),
            po_number: req.po_number.clone().unwrap_or_default(),
            instructions: req.instructions.clone().unwrap_or_default(),
        };
        let ship = self
            .api
            .create_shipment(ctx, &wire)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Freightcom shipment creation failed"))?;

        Ok(Order {
            order_id: TAG.tag(&ship.id),
            tracking_number: ship.tracking_numbers.first().cloned().unwrap_or_default(),
            tracking_url: ship.tracking_url,
            status: map_status(&ship.status),
            carrier: FREIGHTCOM.to_string(),
            service_name: ship.service_name,
            total_charged: money(ship.total_charged, &ship.currency)?,
            estimated_delivery: Timestamp::parse_date(&ship.estimated_delivery),
            label_url: ship.labels.into_iter().next().map(|l| l.url),
        })
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        req: &GetLabelRequest,
    ) -> CarrierResult<GetLabelResponse> {
        let shipment_id = TAG.strip(&req.order_id);
        tracing::info!(carrier = FREIGHTCOM, shipment_id, format = %req.format, "Getting label");

        let resp = self
            .api
            .get_label(ctx, shipment_id, req.format.as_str())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Freightcom label request failed"))?;

        let mut labels = resp
            .labels
            .into_iter()
            .map(|l| Label::hosted(LabelFormat::parse_or_default(&l.format), l.url));
        let label = labels
            .next()
            .ok_or_else(|| CarrierError::from_sentinel(FREIGHTCOM, Sentinel::LabelNotAvailable))?;

        Ok(GetLabelResponse {
            order_id: req.order_id.clone(),
            label,
            additional_labels: labels.collect(),
        })
    }

    async fn cancel_order(
        &self,
        ctx: &RequestContext,
        req: &CancelOrderRequest,
    ) -> CarrierResult<CancelOrderResponse> {
        let shipment_id = TAG.strip(&req.order_id);
        tracing::info!(carrier = FREIGHTCOM, shipment_id, "Cancelling order");

        let resp = self
            .api
            .cancel_shipment(ctx, shipment_id, req.reason.as_deref())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Freightcom cancellation failed"))?;

        let refund_amount = if resp.refund_amount > Decimal::ZERO {
            Some(money(resp.refund_amount, &resp.currency)?)
        } else {
            None
        };
        Ok(CancelOrderResponse {
            order_id: req.order_id.clone(),
            status: map_status(&resp.status),
            refund_amount,
            confirmation_number: resp.confirmation_number,
        })
    }

    async fn get_tracking(
        &self,
        ctx: &RequestContext,
        req: &GetTrackingRequest,
    ) -> CarrierResult<GetTrackingResponse> {
        let shipment_id = TAG.strip(&req.order_id);
        tracing::info!(carrier = FREIGHTCOM, shipment_id, "Getting tracking");

        let resp = self
            .api
            .get_tracking(ctx, shipment_id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Freightcom tracking request failed"))?;

        let tracking_number = if resp.tracking_number.is_empty() {
            req.tracking_number.clone().unwrap_or_default()
        } else {
            resp.tracking_number
        };
        Ok(GetTrackingResponse {
            order_id: req.order_id.clone(),
            tracking_number,
            status: map_status(&resp.status),
            events: resp
                .events
                .into_iter()
                .map(|e| TrackingEvent {
                    timestamp: Timestamp::parse_lenient(&e.timestamp).unwrap_or_else(Timestamp::now),
                    description: e.description,
                    location: e.location,
                    status: map_status(&e.status),
                    carrier_code: e.code,
                })
                .collect(),
        })
    }
}

fn details(origin: &Address, destination: &Address, packages: &[Package]) -> ShippingDetails {
    ShippingDetails {
        origin: location(origin),
        destination: location(destination),
        packaging: PackagingInfo {
            kind: "package".to_string(),
            packages: packages.iter().map(package).collect(),
        },
    }
}

fn location(addr: &Address) -> Location {
    Location {
        name: addr.name.clone(),
        company: addr.company.clone().unwrap_or_default(),
        address_1: addr.line1.clone(),
        address_2: addr.line2.clone(),
        city: addr.city.clone(),
        province: addr.province_code.clone(),
        postal_code: addr.normalized_postal_code(),
        country: addr.country().to_uppercase(),
        phone: addr.phone.clone(),
        email: addr.email.clone().unwrap_or_default(),
        residential: addr.is_residential,
    }
}

fn package(pkg: &Package) -> WirePackage {
    let (length, width, height) = pkg.dimensions_cm();
    WirePackage {
        length,
        width,
        height,
        weight: pkg.weight_kg(),
        description: pkg.description.clone().unwrap_or_default(),
        quantity: 1,
    }
}

fn contact(c: &Contact) -> WireContact {
    WireContact {
        name: c.name.clone(),
        company: c.company.clone().unwrap_or_default(),
        phone: c.phone.clone().unwrap_or_default(),
        email: c.email.clone().unwrap_or_default(),
    }
}

fn money(amount: Decimal, currency: &str) -> CarrierResult<Money> {
    Money::new(amount, currency).map_err(|e| {
        CarrierError::parse(FREIGHTCOM, format!("Invalid amount in response: {e}")).with_cause(e)
    })
}

fn to_rate_option(rate: &Rate) -> CarrierResult<RateOption> {
    let option = RateOption {
        rate_id: TAG.tag(&format!("{}-{}", rate.service_id, rate.id)),
        carrier: FREIGHTCOM.to_string(),
        service_code: rate.service_code.clone(),
        service_name: rate.service_name.clone(),
        service_type: map_service_type(&rate.service_code),
        base_rate: money(rate.base_rate, &rate.currency)?,
        fuel_surcharge: money(rate.fuel_surcharge, &rate.currency)?,
        taxes: money(rate.total_tax, &rate.currency)?,
        total_price: money(rate.total_price, &rate.currency)?,
        transit_days: rate.transit_days,
        estimated_delivery: Timestamp::parse_date(&rate.estimated_delivery),
        expires_at: Timestamp::parse_rfc3339(&rate.expires_at)
            .unwrap_or_else(|| Timestamp::now().add_mins(30)),
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

/// Recovers the Freightcom service id from `fc-{service_id}-{rate}`.
#[must_use]
pub fn extract_service_id(rate_id: &str) -> i64 {
    TAG.strip(rate_id)
        .split_once('-')
        .and_then(|(id, _)| id.parse().ok())
        .unwrap_or(DEFAULT_SERVICE_ID)
}

/// Classifies a Freightcom service code.
#[must_use]
pub fn map_service_type(code: &str) -> ServiceType {
    match code {
        "EXPRESS" | "FEDEX_EXPRESS_SAVER" | "UPS_EXPRESS_SAVER" => ServiceType::Express,
        "PRIORITY" | "FEDEX_PRIORITY_OVERNIGHT" | "UPS_NEXT_DAY_AIR" => ServiceType::Priority,
        "OVERNIGHT" | "FEDEX_STANDARD_OVERNIGHT" => ServiceType::Overnight,
        "ECONOMY" | "FEDEX_ECONOMY" => ServiceType::Economy,
        "FREIGHT" | "LTL" => ServiceType::Freight,
        _ => ServiceType::Standard,
    }
}

/// Maps a Freightcom shipment status.
#[must_use]
pub fn map_status(status: &str) -> ShipmentStatus {
    match status {
        "quoted" => ShipmentStatus::Quoted,
        "confirmed" | "booked" | "complete" => ShipmentStatus::Confirmed,
        "assigned" => ShipmentStatus::Assigned,
        "picked_up" => ShipmentStatus::PickedUp,
        "in_transit" => ShipmentStatus::InTransit,
        "out_for_delivery" => ShipmentStatus::OutForDelivery,
        "delivered" => ShipmentStatus::Delivered,
        "cancelled" => ShipmentStatus::Cancelled,
        "exception" | "error" | "failed" => ShipmentStatus::Exception,
        _ => ShipmentStatus::Pending,
    }
}

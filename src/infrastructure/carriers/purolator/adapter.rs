//! # Purolator Adapter
//!
//! Maps the domain contract onto [`PurolatorApi`].
//!
//! Purolator estimates a whole shipment, so the wire request carries the
//! total weight of every package and the piece count. Rate ids are
//! `puro-{service_id}-{YYYYMMDDhhmmss}`; the shipment PIN doubles as the
//! order id (tagged) and the tracking number.

use super::api::{
    Address as WireAddress, PackageInformation, PurolatorApi, Rate, RatesRequest,
    ShipmentRequest, scan_display, service_name,
};
use super::mock::MockPurolatorApi;
use super::soap::SoapPurolatorApi;
use crate::domain::entities::{Address, Contact, Label, Order, Package, RateOption, TrackingEvent};
use crate::domain::error::{CarrierError, CarrierResult, Sentinel};
use crate::domain::messages::{
    CancelOrderRequest, CancelOrderResponse, CreateOrderRequest, CreateOrderResponse,
    GetLabelRequest, GetLabelResponse, GetTrackingRequest, GetTrackingResponse, QuoteRequest,
    QuoteResponse,
};
use crate::domain::value_objects::ids::{CarrierTag, PUROLATOR};
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

/// Live web services root.
pub const DEFAULT_BASE_URL: &str = "https://webservices.purolator.com";

/// Service booked when a rate id does not carry one.
pub const DEFAULT_SERVICE_ID: &str = "PurolatorGround";

/// Printer type requested for every shipment.
pub const PRINTER_TYPE: &str = "Regular";

const TAG: CarrierTag = CarrierTag::Purolator;

/// Purolator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurolatorConfig {
    /// Web services key.
    pub username: String,
    /// Web services password.
    pub password: String,
    /// Registered billing account.
    pub account_number: String,
    /// Web services root.
    pub base_url: String,
    /// Bind the canned transport instead of SOAP.
    pub use_mock: bool,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl Default for PurolatorConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            account_number: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            use_mock: false,
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Purolator carrier adapter.
#[derive(Debug, Clone)]
pub struct PurolatorCarrier {
    config: PurolatorConfig,
    api: Arc<dyn PurolatorApi>,
}

impl PurolatorCarrier {
    /// Creates the adapter, binding the mock or SOAP transport per
    /// `config.use_mock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the SOAP transport cannot be built.
    pub fn new(config: PurolatorConfig) -> CarrierResult<Self> {
        let api: Arc<dyn PurolatorApi> = if config.use_mock {
            Arc::new(MockPurolatorApi::new())
        } else {
            Arc::new(SoapPurolatorApi::new(&config)?)
        };
        Ok(Self { config, api })
    }

    /// Creates the adapter over an existing transport.
    #[must_use]
    pub fn with_api(config: PurolatorConfig, api: Arc<dyn PurolatorApi>) -> Self {
        Self { config, api }
    }

    /// Returns the settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PurolatorConfig {
        &self.config
    }
}

#[async_trait]
impl Carrier for PurolatorCarrier {
    fn name(&self) -> &str {
        PUROLATOR
    }

    async fn get_quote(
        &self,
        ctx: &RequestContext,
        req: &QuoteRequest,
    ) -> CarrierResult<QuoteResponse> {
        req.validate(PUROLATOR)?;
        tracing::info!(
            carrier = PUROLATOR,
            origin = %req.origin.postal_code,
            destination = %req.destination.postal_code,
            packages = req.packages.len(),
            "Getting quote"
        );

        let wire = RatesRequest {
            billing_account: self.config.account_number.clone(),
            sender_postal_code: req.origin.normalized_postal_code(),
            receiver: WireAddress {
                city: req.destination.city.clone(),
                province: req.destination.province_code.clone(),
                postal_code: req.destination.normalized_postal_code(),
                country: req.destination.country().to_uppercase(),
                ..WireAddress::default()
            },
            packages: package_information(&req.packages),
        };
        let resp = self
            .api
            .get_rates(ctx, &wire)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Purolator estimate failed"))?;

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
        let service_id = extract_service_code(&req.rate_id);
        tracing::info!(
            carrier = PUROLATOR,
            rate_id = %req.rate_id,
            service_id,
            "Creating order"
        );

        let wire = ShipmentRequest {
            billing_account: self.config.account_number.clone(),
            service_id: service_id.to_string(),
            sender: address(&req.sender, &req.sender_address),
            receiver: address(&req.recipient, &req.recipient_address),
            packages: package_information(&req.packages),
            printer_type: PRINTER_TYPE.to_string(),
        };
        let ship = self
            .api
            .create_shipment(ctx, &wire)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Purolator shipment creation failed"))?;

        Ok(Order {
            order_id: TAG.tag(&ship.shipment_pin),
            tracking_url: format!(
                "https://www.purolator.com/en/shipping/tracker?pin={}",
                ship.shipment_pin
            ),
            label_url: Some(ship.label_url).filter(|u| !u.is_empty()),
            tracking_number: ship.shipment_pin,
            status: ShipmentStatus::Confirmed,
            carrier: PUROLATOR.to_string(),
            service_name: service_name(service_id).to_string(),
            total_charged: cad(ship.total_price)?,
            estimated_delivery: Timestamp::parse_date(&ship.expected_delivery),
        })
    }

    async fn get_label(
        &self,
        ctx: &RequestContext,
        req: &GetLabelRequest,
    ) -> CarrierResult<GetLabelResponse> {
        let pin = TAG.strip(&req.order_id);
        tracing::info!(carrier = PUROLATOR, pin, format = %req.format, "Getting label");

        let (format, media_type) = match req.format {
            LabelFormat::Zpl => (LabelFormat::Zpl, "application/zpl"),
            LabelFormat::Pdf | LabelFormat::Png => (LabelFormat::Pdf, "application/pdf"),
        };
        let resp = self
            .api
            .get_label(ctx, pin, media_type)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Purolator document request failed"))?;
        if resp.data.is_empty() {
            return Err(CarrierError::from_sentinel(PUROLATOR, Sentinel::LabelNotAvailable));
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
        let pin = TAG.strip(&req.order_id);
        tracing::info!(carrier = PUROLATOR, pin, "Cancelling order");

        let resp = self
            .api
            .void_shipment(ctx, pin)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Purolator void failed"))?;

        Ok(CancelOrderResponse {
            order_id: req.order_id.clone(),
            status: map_status(&resp.status),
            refund_amount: None,
            confirmation_number: format!("{}-VOID", resp.shipment_pin),
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
        tracing::info!(carrier = PUROLATOR, pin, "Getting tracking");

        let resp = self
            .api
            .get_tracking(ctx, pin)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Purolator tracking request failed"))?;

        Ok(GetTrackingResponse {
            order_id: req.order_id.clone(),
            tracking_number: pin.to_string(),
            status: map_status(&resp.status),
            events: resp
                .events
                .into_iter()
                .map(|scan| TrackingEvent {
                    timestamp: Timestamp::parse_lenient(&scan.timestamp)
                        .unwrap_or_else(Timestamp::now),
                    description: if scan.description.is_empty() {
                        scan_display(&scan.scan_type).to_string()
                    } else {
                        scan.description
                    },
                    location: scan.location,
                    status: map_status(&scan.scan_type),
                    carrier_code: scan.scan_type,
                })
                .collect(),
        })
    }
}

/// Total weight in kg and piece count across all packages.
fn package_information(packages: &[Package]) -> PackageInformation {
    PackageInformation {
        total_weight_kg: packages.iter().map(Package::weight_kg).sum(),
        total_pieces: u32::try_from(packages.len()).unwrap_or(u32::MAX),
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
        street_address: addr.line1.clone(),
        city: addr.city.clone(),
        province: addr.province_code.clone(),
        postal_code: addr.normalized_postal_code(),
        country: addr.country().to_uppercase(),
        phone: contact.phone.clone().unwrap_or_else(|| addr.phone.clone()),
    }
}

fn cad(amount: Decimal) -> CarrierResult<Money> {
    Money::cad(amount).map_err(|e| {
        CarrierError::parse(PUROLATOR, format!("Invalid amount in response: {e}")).with_cause(e)
    })
}

fn to_rate_option(rate: &Rate, now: Timestamp, expires_at: Timestamp) -> CarrierResult<RateOption> {
    let option = RateOption {
        rate_id: TAG.tag(&format!("{}-{}", rate.service_id, now.to_compact())),
        carrier: PUROLATOR.to_string(),
        service_code: rate.service_id.clone(),
        service_name: rate.service_name.clone(),
        service_type: map_service_type(&rate.service_id),
        base_rate: cad(rate.base_price)?,
        fuel_surcharge: cad(rate.fuel_surcharge)?,
        taxes: cad(rate.taxes)?,
        total_price: cad(rate.total_price)?,
        transit_days: rate.transit_days,
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

/// Recovers the service id from `puro-{service_id}-{timestamp}`.
#[must_use]
pub fn extract_service_code(rate_id: &str) -> &str {
    TAG.strip(rate_id)
        .rsplit_once('-')
        .map(|(code, _)| code)
        .filter(|code| !code.is_empty())
        .unwrap_or(DEFAULT_SERVICE_ID)
}

/// Classifies a Purolator service id.
#[must_use]
pub fn map_service_type(service_id: &str) -> ServiceType {
    match service_id {
        "PurolatorExpress" => ServiceType::Express,
        "PurolatorExpress9AM" | "PurolatorExpress10:30AM" => ServiceType::Overnight,
        _ => ServiceType::Standard,
    }
}

/// Maps a Purolator scan type or void status.
#[must_use]
pub fn map_status(status: &str) -> ShipmentStatus {
    match status {
        "PickedUp" => ShipmentStatus::PickedUp,
        "InTransit" => ShipmentStatus::InTransit,
        "OutForDelivery" => ShipmentStatus::OutForDelivery,
        "Delivered" => ShipmentStatus::Delivered,
        "Exception" | "ReturnToSender" => ShipmentStatus::Exception,
        "voided" => ShipmentStatus::Cancelled,
        _ => ShipmentStatus::Pending,
    }
}

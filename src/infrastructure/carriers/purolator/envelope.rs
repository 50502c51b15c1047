//! # Purolator SOAP Envelopes
//!
//! Request envelopes are assembled with [`XmlElement`] because every element
//! carries a fixed `v2:` (or `v1:` for tracking) prefix. Response envelopes
//! are decoded through serde after namespace stripping; the body holds at
//! most one of the `*Response` elements, or a `Fault`.

use super::api::{
    Address, PackageInformation, Rate, RatesRequest, ShipmentRequest, ShipmentResponse,
    TrackingEvent, TrackingResponse, is_guaranteed, service_name,
};
use crate::infrastructure::carriers::xml::{XmlElement, parse_amount};
use rust_decimal::Decimal;
use serde::Deserialize;

/// SOAP 1.1 envelope namespace.
pub const SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// Estimating, shipping and documents datatypes.
pub const V2_NAMESPACE: &str = "http://purolator.com/pws/datatypes/v2";
/// Tracking datatypes.
pub const V1_NAMESPACE: &str = "http://purolator.com/pws/datatypes/v1";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn envelope(body: XmlElement, request_reference: &str) -> XmlElement {
    let context = XmlElement::new("v2:RequestContext")
        .leaf("v2:Version", "2.2")
        .leaf("v2:Language", "en")
        .leaf("v2:GroupID", "xxx")
        .leaf("v2:RequestReference", request_reference);
    XmlElement::new("soap:Envelope")
        .attr("xmlns:soap", SOAP_NAMESPACE)
        .attr("xmlns:v2", V2_NAMESPACE)
        .child(XmlElement::new("soap:Header").child(context))
        .child(XmlElement::new("soap:Body").child(body))
}

fn pin(prefix: &str, value: &str) -> XmlElement {
    XmlElement::new(format!("{prefix}:PIN")).leaf(format!("{prefix}:Value"), value)
}

/// Splits `"123 Main St"` into `("123", "Main St")`; a street without a
/// leading number goes entirely into the name.
fn split_street(street: &str) -> (&str, &str) {
    let street = street.trim();
    match street.split_once(char::is_whitespace) {
        Some((number, name))
            if number.starts_with(|c: char| c.is_ascii_digit())
                && number.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (number, name.trim_start())
        }
        _ => ("", street),
    }
}

/// Splits a North American number into `(country, area, local)`. Anything
/// that is not 10 digits (11 with a leading 1) is sent whole as the local
/// part.
fn split_phone(phone: &str) -> (String, String, String) {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let national = match digits.len() {
        10 => Some(digits.as_str()),
        11 => digits.strip_prefix('1'),
        _ => None,
    };
    match national {
        Some(n) if n.len() == 10 => {
            let (area, local) = n.split_at(3);
            ("1".to_string(), area.to_string(), local.to_string())
        }
        _ => (String::new(), String::new(), phone.trim().to_string()),
    }
}

fn full_address(addr: &Address) -> XmlElement {
    let (number, name) = split_street(&addr.street_address);
    let (country_code, area_code, phone) = split_phone(&addr.phone);
    XmlElement::new("v2:Address")
        .leaf("v2:Name", addr.name.as_str())
        .leaf("v2:Company", addr.company.as_str())
        .leaf("v2:StreetNumber", number)
        .leaf("v2:StreetName", name)
        .leaf("v2:City", addr.city.as_str())
        .leaf("v2:Province", addr.province.as_str())
        .leaf("v2:Country", addr.country.as_str())
        .leaf("v2:PostalCode", addr.postal_code.as_str())
        .child(
            XmlElement::new("v2:PhoneNumber")
                .leaf("v2:CountryCode", country_code)
                .leaf("v2:AreaCode", area_code)
                .leaf("v2:Phone", phone),
        )
}

fn package_information(service_id: Option<&str>, packages: PackageInformation) -> XmlElement {
    let mut info = XmlElement::new("v2:PackageInformation");
    if let Some(service_id) = service_id {
        info = info.leaf("v2:ServiceID", service_id);
    }
    info.child(
        XmlElement::new("v2:TotalWeight")
            .leaf("v2:Value", packages.total_weight_kg.to_string())
            .leaf("v2:WeightUnit", "kg"),
    )
    .leaf("v2:TotalPieces", packages.total_pieces.to_string())
}

fn payment_information(account: &str) -> XmlElement {
    XmlElement::new("v2:PaymentInformation")
        .leaf("v2:PaymentType", "Sender")
        .leaf("v2:RegisteredAccountNumber", account)
}

/// `GetFullEstimate` envelope.
#[must_use]
pub fn rates_envelope(req: &RatesRequest, request_reference: &str) -> XmlElement {
    let shipment = XmlElement::new("v2:Shipment")
        .child(
            XmlElement::new("v2:SenderInformation").child(
                XmlElement::new("v2:Address")
                    .leaf("v2:PostalCode", req.sender_postal_code.as_str())
                    .leaf("v2:Country", "CA"),
            ),
        )
        .child(
            XmlElement::new("v2:ReceiverInformation").child(
                XmlElement::new("v2:Address")
                    .leaf("v2:City", req.receiver.city.as_str())
                    .leaf("v2:Province", req.receiver.province.as_str())
                    .leaf("v2:PostalCode", req.receiver.postal_code.as_str())
                    .leaf("v2:Country", req.receiver.country.as_str()),
            ),
        )
        .child(package_information(None, req.packages))
        .child(payment_information(&req.billing_account));
    let body = XmlElement::new("v2:GetFullEstimateRequest")
        .child(shipment)
        .leaf("v2:ShowAlternativeServicesIndicator", "true");
    envelope(body, request_reference)
}

/// `CreateShipment` envelope.
#[must_use]
pub fn shipment_envelope(req: &ShipmentRequest, request_reference: &str) -> XmlElement {
    let shipment = XmlElement::new("v2:Shipment")
        .child(XmlElement::new("v2:SenderInformation").child(full_address(&req.sender)))
        .child(XmlElement::new("v2:ReceiverInformation").child(full_address(&req.receiver)))
        .child(package_information(Some(&req.service_id), req.packages))
        .child(payment_information(&req.billing_account));
    let body = XmlElement::new("v2:CreateShipmentRequest")
        .child(shipment)
        .leaf("v2:PrinterType", req.printer_type.as_str());
    envelope(body, request_reference)
}

/// `GetDocuments` envelope.
#[must_use]
pub fn documents_envelope(shipment_pin: &str, request_reference: &str) -> XmlElement {
    let body = XmlElement::new("v2:GetDocumentsRequest")
        .child(XmlElement::new("v2:DocumentCriteria").child(pin("v2", shipment_pin)));
    envelope(body, request_reference)
}

/// `VoidShipment` envelope.
#[must_use]
pub fn void_envelope(shipment_pin: &str, request_reference: &str) -> XmlElement {
    let body = XmlElement::new("v2:VoidShipmentRequest").child(pin("v2", shipment_pin));
    envelope(body, request_reference)
}

/// `TrackPackagesByPin` envelope, on the v1 namespace.
#[must_use]
pub fn tracking_envelope(tracking_pin: &str, request_reference: &str) -> XmlElement {
    let body = XmlElement::new("v1:TrackPackagesByPinRequest")
        .attr("xmlns:v1", V1_NAMESPACE)
        .child(XmlElement::new("v1:PINs").child(pin("v1", tracking_pin)));
    envelope(body, request_reference)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A decoded response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// `soap:Body`.
    #[serde(rename = "Body")]
    pub body: Body,
}

/// Contents of `soap:Body`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
#[allow(missing_docs)]
pub struct Body {
    pub fault: Option<Fault>,
    pub get_full_estimate_response: Option<EstimateResponse>,
    pub create_shipment_response: Option<CreateShipmentResponse>,
    pub get_documents_response: Option<DocumentsResponse>,
    pub void_shipment_response: Option<VoidShipmentResponse>,
    pub track_packages_by_pin_response: Option<TrackingPinResponse>,
}

/// A SOAP fault.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fault {
    /// `faultcode`, e.g. `soap:Client`.
    #[serde(rename = "faultcode")]
    pub code: String,
    /// `faultstring`.
    #[serde(rename = "faultstring")]
    pub message: String,
}

/// `ResponseInformation`, present in every response element.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResponseInformation {
    errors: Errors,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Errors {
    error: Vec<ResponseError>,
}

/// One entry of `ResponseInformation/Errors`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResponseError {
    /// Purolator error code.
    pub code: String,
    /// Description.
    pub description: String,
}

impl ResponseInformation {
    /// First reported error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&ResponseError> {
        self.errors.error.first()
    }
}

/// Response elements that carry `ResponseInformation`.
pub trait Responded {
    /// The response's `ResponseInformation`.
    fn information(&self) -> &ResponseInformation;
}

macro_rules! responded {
    ($($ty:ty),* $(,)?) => {
        $(impl Responded for $ty {
            fn information(&self) -> &ResponseInformation {
                &self.response_information
            }
        })*
    };
}

responded!(
    EstimateResponse,
    CreateShipmentResponse,
    DocumentsResponse,
    VoidShipmentResponse,
    TrackingPinResponse,
);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct PinValue {
    value: String,
}

/// `GetFullEstimateResponse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EstimateResponse {
    response_information: ResponseInformation,
    shipment_estimates: ShipmentEstimates,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ShipmentEstimates {
    shipment_estimate: Vec<ShipmentEstimate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ShipmentEstimate {
    #[serde(rename = "ServiceID")]
    service_id: String,
    expected_delivery_date: String,
    estimated_transit_days: String,
    base_price: String,
    surcharges: Surcharges,
    taxes: Taxes,
    total_price: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Surcharges {
    surcharge: Vec<Charge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Taxes {
    tax: Vec<Charge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Charge {
    amount: String,
    #[serde(rename = "Type")]
    kind: String,
}

impl EstimateResponse {
    /// Converts the estimates to transport rates.
    #[must_use]
    pub fn into_rates(self) -> Vec<Rate> {
        self.shipment_estimates
            .shipment_estimate
            .into_iter()
            .map(|est| {
                let fuel_surcharge = est
                    .surcharges
                    .surcharge
                    .iter()
                    .rev()
                    .find(|s| matches!(s.kind.as_str(), "Fuel" | "FuelSurcharge"))
                    .map_or(Decimal::ZERO, |s| parse_amount(&s.amount));
                let taxes = est.taxes.tax.iter().map(|t| parse_amount(&t.amount)).sum();
                Rate {
                    service_name: service_name(&est.service_id).to_string(),
                    guaranteed: is_guaranteed(&est.service_id),
                    base_price: parse_amount(&est.base_price),
                    fuel_surcharge,
                    taxes,
                    total_price: parse_amount(&est.total_price),
                    expected_delivery: est.expected_delivery_date,
                    transit_days: est.estimated_transit_days.trim().parse().unwrap_or_default(),
                    service_id: est.service_id,
                }
            })
            .collect()
    }
}

/// `CreateShipmentResponse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateShipmentResponse {
    response_information: ResponseInformation,
    #[serde(rename = "ShipmentPIN")]
    shipment_pin: PinValue,
    #[serde(rename = "PiecePINs")]
    piece_pins: PiecePins,
    expected_delivery_date: String,
    total_price: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PiecePins {
    #[serde(rename = "PIN")]
    pin: Vec<PinValue>,
}

impl From<CreateShipmentResponse> for ShipmentResponse {
    fn from(resp: CreateShipmentResponse) -> Self {
        Self {
            shipment_pin: resp.shipment_pin.value,
            piece_pins: resp.piece_pins.pin.into_iter().map(|p| p.value).collect(),
            total_price: parse_amount(&resp.total_price),
            expected_delivery: resp.expected_delivery_date,
            label_url: String::new(),
        }
    }
}

/// `GetDocumentsResponse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DocumentsResponse {
    response_information: ResponseInformation,
    documents: Documents,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Documents {
    document: Vec<Document>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Document {
    document_details: DocumentDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DocumentDetails {
    document_detail: Vec<DocumentDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DocumentDetail {
    document_status: String,
    data: String,
}

impl DocumentsResponse {
    /// Base64 payload of the first completed document.
    #[must_use]
    pub fn completed_data(&self) -> Option<&str> {
        self.documents
            .document
            .iter()
            .flat_map(|d| &d.document_details.document_detail)
            .find(|d| d.document_status == "Completed")
            .map(|d| d.data.trim())
    }
}

/// `VoidShipmentResponse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VoidShipmentResponse {
    response_information: ResponseInformation,
    shipment_voided: String,
}

impl VoidShipmentResponse {
    /// Whether the carrier confirmed the void.
    #[must_use]
    pub fn voided(&self) -> bool {
        self.shipment_voided.trim().eq_ignore_ascii_case("true")
    }
}

/// `TrackPackagesByPinResponse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TrackingPinResponse {
    response_information: ResponseInformation,
    tracking_information_list: TrackingInformationList,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct TrackingInformationList {
    tracking_information: Vec<TrackingInformation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct TrackingInformation {
    #[serde(rename = "PIN")]
    pin: PinValue,
    scans: Scans,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Scans {
    scan: Vec<Scan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Scan {
    scan_type: String,
    scan_date: String,
    scan_time: String,
    description: String,
    depot: Depot,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Depot {
    address: DepotAddress,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DepotAddress {
    city: String,
    province: String,
}

impl TrackingPinResponse {
    /// Scans of `tracking_pin`, or `None` when the PIN is not listed.
    #[must_use]
    pub fn into_tracking(self, tracking_pin: &str) -> Option<TrackingResponse> {
        let info = self
            .tracking_information_list
            .tracking_information
            .into_iter()
            .find(|i| i.pin.value == tracking_pin)?;
        let events: Vec<TrackingEvent> = info
            .scans
            .scan
            .into_iter()
            .map(|scan| {
                let address = scan.depot.address;
                let location = if address.province.is_empty() {
                    address.city
                } else {
                    format!("{}, {}", address.city, address.province)
                };
                TrackingEvent {
                    timestamp: format!("{}T{}", scan.scan_date, scan.scan_time),
                    description: scan.description,
                    location,
                    scan_type: scan.scan_type,
                }
            })
            .collect();
        Some(TrackingResponse {
            tracking_pin: tracking_pin.to_string(),
            status: events.first().map(|e| e.scan_type.clone()).unwrap_or_default(),
            events,
        })
    }
}

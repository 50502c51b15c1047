//! # Canada Post XML Documents
//!
//! serde shapes of the Canada Post XML payloads and their conversions to and
//! from the transport types in [`api`](super::api).
//!
//! Requests are serialized with a default namespace on the root element.
//! Responses are decoded after namespace stripping, so these structs use
//! local element names only. Leaf values are read as text and converted
//! afterwards; a missing or malformed amount reads as zero.

use super::api::{
    Address, Destination, Dimensions, Link, Rate, RatesRequest, ShipmentRequest, ShipmentResponse,
    TrackingEvent, TrackingResponse,
};
use crate::infrastructure::carriers::xml::parse_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Namespace of rate requests.
pub const RATE_NAMESPACE: &str = "http://www.canadapost.ca/ws/ship/rate-v4";
/// Namespace of shipment requests.
pub const SHIPMENT_NAMESPACE: &str = "http://www.canadapost.ca/ws/shipment-v8";
/// Adjustment code of the fuel surcharge.
pub const FUEL_ADJUSTMENT: &str = "FUELSC";

fn measure(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

fn flag(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `<mailing-scenario>`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename = "mailing-scenario", rename_all = "kebab-case")]
pub struct MailingScenario {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_number: Option<String>,
    parcel_characteristics: ParcelCharacteristics,
    origin_postal_code: String,
    destination: XmlDestination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct ParcelCharacteristics {
    weight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<XmlDimensions>,
}

impl ParcelCharacteristics {
    fn new(weight_kg: f64, dims: Dimensions) -> Self {
        Self {
            weight: measure(weight_kg, 3),
            dimensions: (dims.length > 0.0).then(|| XmlDimensions {
                length: measure(dims.length, 1),
                width: measure(dims.width, 1),
                height: measure(dims.height, 1),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct XmlDimensions {
    length: String,
    width: String,
    height: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
struct XmlDestination {
    #[serde(skip_serializing_if = "Option::is_none")]
    domestic: Option<PostalCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    united_states: Option<ZipCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    international: Option<CountryCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct PostalCode {
    postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct ZipCode {
    zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct CountryCode {
    country_code: String,
}

impl From<&RatesRequest> for MailingScenario {
    fn from(req: &RatesRequest) -> Self {
        let destination = match &req.destination {
            Destination::Domestic { postal_code } => XmlDestination {
                domestic: Some(PostalCode {
                    postal_code: postal_code.clone(),
                }),
                ..XmlDestination::default()
            },
            Destination::UnitedStates { zip_code } => XmlDestination {
                united_states: Some(ZipCode {
                    zip_code: zip_code.clone(),
                }),
                ..XmlDestination::default()
            },
            Destination::International { country_code } => XmlDestination {
                international: Some(CountryCode {
                    country_code: country_code.clone(),
                }),
                ..XmlDestination::default()
            },
        };
        Self {
            xmlns: RATE_NAMESPACE,
            customer_number: Some(req.customer_number.clone()).filter(|c| !c.is_empty()),
            parcel_characteristics: ParcelCharacteristics::new(req.weight_kg, req.dimensions),
            origin_postal_code: req.origin_postal_code.clone(),
            destination,
        }
    }
}

/// `<shipment>`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename = "shipment", rename_all = "kebab-case")]
pub struct ShipmentDocument {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    group_id: String,
    cpc_pickup_indicator: bool,
    delivery_spec: DeliverySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct DeliverySpec {
    service_code: String,
    sender: Sender,
    destination: Recipient,
    parcel_characteristics: ParcelCharacteristics,
    print_preferences: PrintPreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Sender {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    contact_phone: String,
    address_details: AddressDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Recipient {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    address_details: AddressDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct AddressDetails {
    address_line_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_line_2: Option<String>,
    city: String,
    prov_state: String,
    postal_zip_code: String,
    country_code: String,
}

impl From<&Address> for AddressDetails {
    fn from(a: &Address) -> Self {
        Self {
            address_line_1: a.address_line_1.clone(),
            address_line_2: Some(a.address_line_2.clone()).filter(|l| !l.is_empty()),
            city: a.city.clone(),
            prov_state: a.province.clone(),
            postal_zip_code: a.postal_code.clone(),
            country_code: a.country_code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct PrintPreferences {
    output_format: &'static str,
    encoding: &'static str,
}

impl From<&ShipmentRequest> for ShipmentDocument {
    fn from(req: &ShipmentRequest) -> Self {
        let company = |a: &Address| Some(a.company.clone()).filter(|c| !c.is_empty());
        Self {
            xmlns: SHIPMENT_NAMESPACE,
            group_id: req.group_id.clone(),
            cpc_pickup_indicator: true,
            delivery_spec: DeliverySpec {
                service_code: req.service_code.clone(),
                sender: Sender {
                    name: req.sender.name.clone(),
                    company: company(&req.sender),
                    contact_phone: req.sender.phone.clone(),
                    address_details: AddressDetails::from(&req.sender),
                },
                destination: Recipient {
                    name: req.destination.name.clone(),
                    company: company(&req.destination),
                    address_details: AddressDetails::from(&req.destination),
                },
                parcel_characteristics: ParcelCharacteristics::new(req.weight_kg, req.dimensions),
                print_preferences: PrintPreferences {
                    output_format: "4x6",
                    encoding: "PDF",
                },
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// `<price-quotes>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PriceQuotes {
    price_quote: Vec<PriceQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct PriceQuote {
    service_code: String,
    service_name: String,
    service_link: ServiceLink,
    price_details: PriceDetails,
    service_standard: ServiceStandard,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct ServiceLink {
    service_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct PriceDetails {
    base: String,
    taxes: Taxes,
    due: String,
    adjustments: Adjustments,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Taxes {
    gst: TaxAmount,
    pst: TaxAmount,
    hst: TaxAmount,
}

/// Tax elements carry a `percent` attribute next to the amount.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TaxAmount {
    #[serde(rename = "$text")]
    amount: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Adjustments {
    adjustment: Vec<Adjustment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct Adjustment {
    adjustment_code: String,
    adjustment_cost: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct ServiceStandard {
    guaranteed_delivery: String,
    expected_transit_time: String,
    expected_delivery_date: String,
}

impl PriceQuotes {
    /// Converts to transport rates, summing taxes and picking the fuel
    /// adjustment.
    #[must_use]
    pub fn into_rates(self) -> Vec<Rate> {
        self.price_quote.into_iter().map(PriceQuote::into_rate).collect()
    }
}

impl PriceQuote {
    fn into_rate(self) -> Rate {
        let details = self.price_details;
        let taxes: Decimal = [&details.taxes.gst, &details.taxes.pst, &details.taxes.hst]
            .into_iter()
            .map(|t| parse_amount(&t.amount))
            .sum();
        let fuel_surcharge = details
            .adjustments
            .adjustment
            .iter()
            .find(|a| a.adjustment_code == FUEL_ADJUSTMENT)
            .map_or(Decimal::ZERO, |a| parse_amount(&a.adjustment_cost));
        let service_name = if self.service_name.is_empty() {
            self.service_link.service_name
        } else {
            self.service_name
        };
        Rate {
            service_code: self.service_code,
            service_name,
            base_rate: parse_amount(&details.base),
            fuel_surcharge,
            taxes,
            total_price: parse_amount(&details.due),
            expected_transit: self
                .service_standard
                .expected_transit_time
                .trim()
                .parse()
                .unwrap_or_default(),
            expected_delivery: self.service_standard.expected_delivery_date,
            guaranteed: flag(&self.service_standard.guaranteed_delivery),
        }
    }
}

/// `<shipment-info>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ShipmentInfo {
    shipment_id: String,
    shipment_status: String,
    tracking_pin: String,
    links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Links {
    link: Vec<XmlLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct XmlLink {
    #[serde(rename = "@rel")]
    rel: String,
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@media-type")]
    media_type: String,
}

impl From<ShipmentInfo> for ShipmentResponse {
    fn from(info: ShipmentInfo) -> Self {
        Self {
            shipment_id: info.shipment_id,
            tracking_pin: info.tracking_pin,
            status: info.shipment_status,
            links: info
                .links
                .link
                .into_iter()
                .map(|l| Link {
                    rel: l.rel,
                    href: l.href,
                    media_type: l.media_type,
                })
                .collect(),
            ..Self::default()
        }
    }
}

/// `<tracking-summary>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TrackingSummary {
    pin_summary: PinSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct PinSummary {
    pin: String,
    event_description: String,
    event_date_time: String,
    event_type: String,
    event_location: String,
}

impl From<TrackingSummary> for TrackingResponse {
    fn from(summary: TrackingSummary) -> Self {
        let pin = summary.pin_summary;
        Self {
            tracking_pin: pin.pin,
            status: pin.event_type.clone(),
            events: vec![TrackingEvent {
                timestamp: pin.event_date_time,
                description: pin.event_description,
                location: pin.event_location,
                kind: pin.event_type,
            }],
        }
    }
}

/// `<messages>` error body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Messages {
    message: Vec<Message>,
}

/// One error message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    /// Carrier error code.
    pub code: String,
    /// Human description.
    pub description: String,
}

impl Messages {
    /// Returns the first message, if any.
    #[must_use]
    pub fn first(self) -> Option<Message> {
        self.message.into_iter().next()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::infrastructure::carriers::xml::{from_xml, to_xml};

    mod requests {
        use super::*;

        fn rates_request(destination: Destination) -> RatesRequest {
            RatesRequest {
                customer_number: String::new(),
                weight_kg: 2.5,
                dimensions: Dimensions::default(),
                origin_postal_code: "M5V3L9".into(),
                destination,
            }
        }

        #[test]
        fn domestic_scenario_omits_empty_fields() {
            let req = rates_request(Destination::Domestic {
                postal_code: "H2X1Y4".into(),
            });
            let xml = to_xml(&MailingScenario::from(&req)).unwrap();
            assert!(xml.contains(&format!(r#"<mailing-scenario xmlns="{RATE_NAMESPACE}">"#)));
            assert!(!xml.contains("customer-number"));
            assert!(!xml.contains("dimensions"));
            assert!(xml.contains("<weight>2.500</weight>"));
            assert!(xml.contains("<origin-postal-code>M5V3L9</origin-postal-code>"));
            assert!(xml.contains(
                "<destination><domestic><postal-code>H2X1Y4</postal-code></domestic></destination>"
            ));
        }

        #[test]
        fn us_scenario_sends_zip_and_dimensions() {
            let req = RatesRequest {
                customer_number: "0001234567".into(),
                dimensions: Dimensions {
                    length: 30.0,
                    width: 20.0,
                    height: 10.0,
                },
                ..rates_request(Destination::UnitedStates {
                    zip_code: "10001".into(),
                })
            };
            let xml = to_xml(&MailingScenario::from(&req)).unwrap();
            assert!(xml.contains("<customer-number>0001234567</customer-number>"));
            assert!(xml.contains("<length>30.0</length>"));
            assert!(xml.contains("<united-states><zip-code>10001</zip-code></united-states>"));
        }

        #[test]
        fn shipment_document_shape() {
            let req = ShipmentRequest {
                group_id: "default".into(),
                service_code: "DOM.XP".into(),
                sender: Address {
                    name: "Warehouse".into(),
                    phone: "416-555-0100".into(),
                    postal_code: "M5V3L9".into(),
                    country_code: "CA".into(),
                    ..Address::default()
                },
                destination: Address {
                    name: "Jane".into(),
                    company: "Acme".into(),
                    ..Address::default()
                },
                weight_kg: 1.0,
                dimensions: Dimensions::default(),
            };
            let xml = to_xml(&ShipmentDocument::from(&req)).unwrap();
            assert!(xml.contains(&format!(r#"<shipment xmlns="{SHIPMENT_NAMESPACE}">"#)));
            assert!(xml.contains("<group-id>default</group-id>"));
            assert!(xml.contains("<cpc-pickup-indicator>true</cpc-pickup-indicator>"));
            assert!(xml.contains("<service-code>DOM.XP</service-code>"));
            assert!(xml.contains("<contact-phone>416-555-0100</contact-phone>"));
            assert!(xml.contains("<company>Acme</company>"));
            assert!(xml.contains("<output-format>4x6</output-format><encoding>PDF</encoding>"));
        }
    }

    mod responses {
        use super::*;

        const PRICE_QUOTES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
            <price-quotes xmlns="http://www.canadapost.ca/ws/ship/rate-v4">
              <price-quote>
                <service-code>DOM.EP</service-code>
                <service-link rel="service" href="https://ct.soa-gw.canadapost.ca/rs/ship/service/DOM.EP" media-type="application/vnd.cpc.ship.rate-v4+xml"/>
                <service-name>Expedited Parcel</service-name>
                <price-details>
                  <base>9.59</base>
                  <taxes>
                    <gst percent="5.00">0.00</gst>
                    <pst>0.00</pst>
                    <hst percent="13.00">1.45</hst>
                  </taxes>
                  <due>11.20</due>
                  <adjustments>
                    <adjustment>
                      <adjustment-code>FUELSC</adjustment-code>
                      <adjustment-cost>0.16</adjustment-cost>
                    </adjustment>
                  </adjustments>
                </price-details>
                <service-standard>
                  <am-delivery>false</am-delivery>
                  <guaranteed-delivery>true</guaranteed-delivery>
                  <expected-transit-time>1</expected-transit-time>
                  <expected-delivery-date>2024-06-03</expected-delivery-date>
                </service-standard>
              </price-quote>
            </price-quotes>"#;

        #[test]
        fn price_quotes_sum_taxes_and_pick_fuel() {
            let quotes: PriceQuotes = from_xml(PRICE_QUOTES).unwrap();
            let rates = quotes.into_rates();
            assert_eq!(rates.len(), 1);
            let rate = rates.first().unwrap();
            assert_eq!(rate.service_code, "DOM.EP");
            assert_eq!(rate.service_name, "Expedited Parcel");
            assert_eq!(rate.base_rate, Decimal::new(959, 2));
            assert_eq!(rate.taxes, Decimal::new(145, 2));
            assert_eq!(rate.fuel_surcharge, Decimal::new(16, 2));
            assert_eq!(rate.total_price, Decimal::new(1120, 2));
            assert_eq!(rate.expected_transit, 1);
            assert_eq!(rate.expected_delivery, "2024-06-03");
            assert!(rate.guaranteed);
        }

        #[test]
        fn shipment_info_links() {
            let xml = r#"<shipment-info xmlns="http://www.canadapost.ca/ws/shipment-v8">
                <shipment-id>347881315405043891</shipment-id>
                <shipment-status>created</shipment-status>
                <tracking-pin>123456789012</tracking-pin>
                <links>
                  <link rel="self" href="https://x/rs/1/shipment/347881315405043891" media-type="application/vnd.cpc.shipment-v8+xml"/>
                  <link rel="label" href="https://x/rs/artifact/1/label" media-type="application/pdf"/>
                </links>
              </shipment-info>"#;
            let info: ShipmentInfo = from_xml(xml).unwrap();
            let resp = ShipmentResponse::from(info);
            assert_eq!(resp.shipment_id, "347881315405043891");
            assert_eq!(resp.status, "created");
            assert_eq!(resp.link("label"), Some("https://x/rs/artifact/1/label"));
            assert_eq!(resp.link("tracking"), None);
        }

        #[test]
        fn messages_first_entry() {
            let xml = r#"<messages xmlns="http://www.canadapost.ca/ws/messages">
                <message><code>AA004</code><description>You cannot mail on behalf of the requested customer.</description></message>
                <message><code>X</code><description>second</description></message>
              </messages>"#;
            let msgs: Messages = from_xml(xml).unwrap();
            let first = msgs.first().unwrap();
            assert_eq!(first.code, "AA004");
        }

        #[test]
        fn tracking_summary_becomes_one_event() {
            let xml = r#"<tracking-summary xmlns="http://www.canadapost.ca/ws/track">
                <pin-summary>
                  <pin>1371134583769923</pin>
                  <event-date-time>2024-06-01T10:15:00</event-date-time>
                  <event-description>Item out for delivery</event-description>
                  <event-type>in_transit</event-type>
                  <event-location>MONTREAL</event-location>
                </pin-summary>
              </tracking-summary>"#;
            let summary: TrackingSummary = from_xml(xml).unwrap();
            let tracking = TrackingResponse::from(summary);
            assert_eq!(tracking.tracking_pin, "1371134583769923");
            assert_eq!(tracking.status, "in_transit");
            assert_eq!(tracking.events.len(), 1);
        }
    }
}

//! # Domain Entities
//!
//! Per-request shipping data. Nothing here is persisted; values are built
//! for one request/response cycle and dropped.
//!
//! - [`Address`], [`Contact`]: who and where
//! - [`Package`]: what is shipped
//! - [`RateOption`]: one priced service from a quote
//! - [`Order`]: a booked shipment
//! - [`Label`]: a label document
//! - [`TrackingEvent`]: a scan in a shipment's history

pub mod address;
pub mod label;
pub mod order;
pub mod package;
pub mod rate;
pub mod tracking;

pub use address::{Address, Contact, normalize_postal_code};
pub use label::Label;
pub use order::Order;
pub use package::Package;
pub use rate::RateOption;
pub use tracking::TrackingEvent;

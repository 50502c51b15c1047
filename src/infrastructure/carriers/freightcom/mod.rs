//! # Freightcom
//!
//! Freightcom integration: JSON over HTTPS with an `X-API-Key` header.
//!
//! Rate and shipment requests are asynchronous on the carrier side. The
//! live transport submits them and polls until they settle, so the adapter
//! only ever sees terminal responses.
//!
//! - [`api`]: wire types and the [`FreightcomApi`] transport trait
//! - [`http`]: live transport
//! - [`mock`]: canned transport with per-operation hooks
//! - [`adapter`]: [`FreightcomCarrier`], the domain mapping

pub mod adapter;
pub mod api;
pub mod http;
pub mod mock;

pub use adapter::{FreightcomCarrier, FreightcomConfig};
pub use api::FreightcomApi;
pub use http::HttpFreightcomApi;
pub use mock::MockFreightcomApi;

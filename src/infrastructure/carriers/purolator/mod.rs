//! # Purolator
//!
//! Purolator integration: SOAP 1.1 envelopes over HTTPS with Basic
//! credentials.
//!
//! - [`api`]: transport types, lookup tables and the [`PurolatorApi`] trait
//! - [`envelope`]: request envelopes and response decoding
//! - [`soap`]: live transport
//! - [`mock`]: canned transport with per-operation hooks
//! - [`adapter`]: [`PurolatorCarrier`], the domain mapping

pub mod adapter;
pub mod api;
pub mod envelope;
pub mod mock;
pub mod soap;

pub use adapter::{PurolatorCarrier, PurolatorConfig};
pub use api::PurolatorApi;
pub use mock::MockPurolatorApi;
pub use soap::SoapPurolatorApi;

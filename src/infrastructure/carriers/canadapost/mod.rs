//! # Canada Post
//!
//! Canada Post integration: XML documents over HTTPS with Basic credentials.
//!
//! - [`api`]: transport types and the [`CanadaPostApi`] trait
//! - [`documents`]: the XML payloads
//! - [`http`]: live transport
//! - [`mock`]: canned transport with per-operation hooks
//! - [`adapter`]: [`CanadaPostCarrier`], the domain mapping

pub mod adapter;
pub mod api;
pub mod documents;
pub mod http;
pub mod mock;

pub use adapter::{CanadaPostCarrier, CanadaPostConfig};
pub use api::CanadaPostApi;
pub use http::HttpCanadaPostApi;
pub use mock::MockCanadaPostApi;

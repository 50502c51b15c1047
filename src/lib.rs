//! # Carrier Gateway
//!
//! A carrier-abstraction gateway that puts three structurally different
//! shipping-carrier APIs behind one domain contract:
//!
//! - **Freightcom**: JSON over HTTP with asynchronous submit-then-poll rates
//!   and shipments.
//! - **Canada Post**: XML over HTTP with basic authentication and raw binary
//!   label artifacts.
//! - **Purolator**: SOAP 1.1 envelopes with fault handling and base64
//!   embedded label documents.
//!
//! The [`application::services::registry::CarrierRegistry`] holds the
//! configured carriers and fans quote requests out to them concurrently,
//! isolating each carrier's failure from the others.
//!
//! # Layout
//!
//! - [`domain`]: carrier-agnostic types, messages and the error taxonomy
//! - [`infrastructure`]: the carrier capability trait and its adapters
//! - [`application`]: the registry and the configuration bootstrap
//! - [`config`] / [`telemetry`]: process plumbing
//!
//! # Examples
//!
//! ```no_run
//! use carrier_gateway::application::services::registry::CarrierRegistry;
//! use carrier_gateway::domain::messages::QuoteRequest;
//! use carrier_gateway::domain::value_objects::RequestContext;
//! use carrier_gateway::infrastructure::carriers::mock::MockCarrier;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let registry = CarrierRegistry::new();
//! registry.register(Arc::new(MockCarrier::new("alpha")));
//!
//! let outcome = registry
//!     .get_all_quotes(&RequestContext::new(), &QuoteRequest::default())
//!     .await;
//! assert_eq!(outcome.responses.len(), 1);
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

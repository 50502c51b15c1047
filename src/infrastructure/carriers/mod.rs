//! # Carrier Adapters
//!
//! Adapters that translate the domain contract into carrier wire protocols.
//!
//! ## Available Adapters
//!
//! - [`FreightcomCarrier`]: JSON over HTTP, asynchronous submit-then-poll
//! - [`CanadaPostCarrier`]: XML over HTTP, raw binary label artifacts
//! - [`PurolatorCarrier`]: SOAP 1.1 envelopes, base64 label documents
//! - [`MockCarrier`]: canned data under any name, for tests and demos
//!
//! Each carrier module splits into wire types plus a transport trait, a live
//! transport, a mock transport and the adapter itself. The adapter only maps
//! between domain and wire types; transports own the protocol mechanics.

pub mod canadapost;
pub mod freightcom;
pub mod http_client;
pub mod mock;
pub mod mock_support;
pub mod purolator;
pub mod traits;
pub mod xml;

pub use canadapost::CanadaPostCarrier;
pub use freightcom::FreightcomCarrier;
pub use mock::MockCarrier;
pub use purolator::PurolatorCarrier;
pub use traits::Carrier;

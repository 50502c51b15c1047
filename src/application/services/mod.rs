//! # Application Services
//!
//! - [`CarrierRegistry`]: carrier lookup, quote fan-out and routed operations

pub mod registry;

pub use registry::{CarrierFailure, CarrierRegistry, FanOutOutcome, RegistryConfig};

//! # Application Layer
//!
//! Orchestration over the carrier adapters.
//!
//! - [`services::registry`]: named carriers, concurrent quote fan-out and
//!   id-based routing
//! - [`bootstrap`]: builds a registry from [`GatewayConfig`](crate::config::GatewayConfig)

pub mod bootstrap;
pub mod services;

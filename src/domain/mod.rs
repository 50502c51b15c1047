//! # Domain Layer
//!
//! Carrier-agnostic shipping types.
//!
//! - [`value_objects`]: enums, money, timestamps, carrier-tagged ids and the
//!   request context
//! - [`entities`]: addresses, packages, rates, orders, labels and tracking
//! - [`messages`]: request/response pairs exchanged with every carrier
//! - [`error`]: the structured carrier error and its sentinel conditions

pub mod entities;
pub mod error;
pub mod messages;
pub mod value_objects;

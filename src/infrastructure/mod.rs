//! # Infrastructure Layer
//!
//! Outbound integrations. Every carrier adapter lives under [`carriers`] and
//! implements [`carriers::Carrier`].

pub mod carriers;

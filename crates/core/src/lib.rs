//! Proforma Core - invoice domain library.
//!
//! This crate provides the logic shared by the `proforma` service and CLI:
//! - `app` - HTTP service for the POS and admin extensions
//! - `cli` - Operator tools for signing links and checking orders
//!
//! # Architecture
//!
//! The core crate contains only types, rules and pure functions - no I/O,
//! no HTTP clients, no logging. Everything here is deterministic for fixed
//! inputs, which keeps it trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Shopify ids, shop domains and metafield annotations
//! - [`invoice`] - Field requirement rules, eligibility evaluation, request payloads
//! - [`signing`] - HMAC-signed print links
//! - [`proforma`] - Proforma document model and display formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod invoice;
pub mod proforma;
pub mod signing;
pub mod types;

pub use types::*;

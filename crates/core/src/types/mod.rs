//! Core types for the invoice domain.
//!
//! This module provides type-safe wrappers for Shopify identifiers and the
//! `invoice` metafield namespace.

pub mod annotations;
pub mod id;
pub mod shop;

pub use annotations::{Annotations, INVOICE_NAMESPACE, keys};
pub use id::*;
pub use shop::{ShopDomain, ShopDomainError};

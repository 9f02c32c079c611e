//! Custom Askama template filters for the proforma.
//!
//! Thin wrappers over `proforma_core::proforma` formatting so the template
//! and the core agree on every rendered string.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use proforma_core::proforma::{self, Address};

/// Formats an amount as euro with a decimal comma.
///
/// Usage in templates: `{{ doc.order.total_price|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    proforma::money(&value.to_string()).map_err(askama::Error::custom)
}

/// Formats an RFC 3339 timestamp or `YYYY-MM-DD` date.
///
/// Usage in templates: `{{ doc.order.created_at|date("%d/%m/%Y") }}`
#[askama::filter_fn]
pub fn date(value: impl Display, _env: &dyn askama::Values, format: &str) -> askama::Result<String> {
    Ok(proforma::format_date(&value.to_string(), format))
}

/// Italian name of a payment gateway.
///
/// Usage in templates: `{{ tx.gateway|payment_method }}`
#[askama::filter_fn]
pub fn payment_method(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(proforma::payment_method(&value.to_string()))
}

/// Values that can be printed as a one-line postal address.
pub trait FormatAddress {
    fn one_line(&self) -> String;
}

impl FormatAddress for Address {
    fn one_line(&self) -> String {
        proforma::format_address(self)
    }
}

impl<T: FormatAddress> FormatAddress for Option<T> {
    fn one_line(&self) -> String {
        self.as_ref().map(FormatAddress::one_line).unwrap_or_default()
    }
}

impl<T: FormatAddress + ?Sized> FormatAddress for &T {
    fn one_line(&self) -> String {
        (**self).one_line()
    }
}

/// One-line postal address, skipping blank parts.
///
/// Usage in templates: `{{ address|format_address }}`
#[askama::filter_fn]
pub fn format_address(value: impl FormatAddress, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.one_line())
}

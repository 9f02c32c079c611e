//! Display formatting for the proforma template.
//!
//! Italian conventions: comma decimal separator, day-first dates, Italian
//! payment method names.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::source::{Address, non_blank};

/// Value passed to the money filter is not a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a monetary amount: {0}")]
pub struct AmountError(pub String);

/// Round half away from zero to cents.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as `€1234,50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("€{:.2}", round_cents(amount)).replace('.', ",")
}

/// Format a number or numeric string as money.
///
/// # Errors
///
/// Returns an error when `value` is not a decimal number.
pub fn money(value: &str) -> Result<String, AmountError> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(format_money)
        .map_err(|_| AmountError(value.to_string()))
}

/// Pattern selecting the zero-padded `DD/MM/YYYY` form.
pub const ITALIAN_DATE_PATTERN: &str = "%d/%m/%Y";

/// Format a timestamp or date.
///
/// Accepts RFC 3339 timestamps (taken in UTC) and `YYYY-MM-DD` dates. A
/// `format` containing `%d/%m/%Y` yields `05/03/2024`; anything else the
/// Italian short form `5/3/2024`. Unparseable input is returned as is.
#[must_use]
pub fn format_date(value: &str, format: &str) -> String {
    let Some(date) = parse_date(value) else {
        return value.to_string();
    };

    if format.contains(ITALIAN_DATE_PATTERN) {
        format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
    } else {
        format!("{}/{}/{}", date.day(), date.month(), date.year())
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

const PAYMENT_METHODS: &[(&str, &str)] = &[
    ("cash", "Contanti"),
    ("manual", "Manuale"),
    ("bank_transfer", "Bonifico bancario"),
    ("shopify_payments", "Shopify Payments"),
    ("paypal", "PayPal"),
    ("stripe", "Carta di credito"),
    ("bogus", "Test (Bogus Gateway)"),
];

/// Label shown when the order has no gateway.
pub const PAYMENT_METHOD_UNSET: &str = "Da definire";

/// Italian name of a payment gateway; unknown gateways pass through.
#[must_use]
pub fn payment_method(gateway: &str) -> String {
    if gateway.is_empty() {
        return PAYMENT_METHOD_UNSET.to_string();
    }
    PAYMENT_METHODS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(gateway))
        .map_or_else(|| gateway.to_string(), |(_, label)| (*label).to_string())
}

/// One-line address: `address1, address2, zip city, province, country`.
#[must_use]
pub fn format_address(address: &Address) -> String {
    let zip_city = format!(
        "{} {}",
        address.zip.as_deref().unwrap_or_default(),
        address.city.as_deref().unwrap_or_default()
    );

    [
        address.address1.as_deref(),
        address.address2.as_deref(),
        Some(zip_city.as_str()),
        address.province.as_deref(),
        address.country.as_deref(),
    ]
    .into_iter()
    .filter_map(non_blank)
    .collect::<Vec<_>>()
    .join(", ")
}

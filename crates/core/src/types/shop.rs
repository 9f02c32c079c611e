//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input contains characters that cannot appear in a hostname.
    #[error("shop domain contains invalid characters: {0}")]
    InvalidCharacters(String),
    /// The input is not a fully qualified hostname.
    #[error("shop domain must contain a dot: {0}")]
    NotQualified(String),
}

/// A Shopify shop domain, e.g. `acme.myshopify.com`.
///
/// ## Constraints
///
/// - Stored lower-cased
/// - Only ASCII letters, digits, `-` and `.`
/// - At least one `.` (no bare hostnames)
///
/// ## Examples
///
/// ```
/// use proforma_core::ShopDomain;
///
/// assert!(ShopDomain::parse("acme.myshopify.com").is_ok());
/// assert_eq!(ShopDomain::parse("Acme.MyShopify.com").unwrap().as_str(), "acme.myshopify.com");
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("https://acme.myshopify.com").is_err());
/// assert!(ShopDomain::parse("localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters outside
    /// the hostname alphabet, or has no dot.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
        {
            return Err(ShopDomainError::InvalidCharacters(s.to_string()));
        }

        if !s.contains('.') || s.starts_with('.') || s.ends_with('.') {
            return Err(ShopDomainError::NotQualified(s.to_string()));
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Newtype IDs for Shopify resources.
//!
//! Use the `define_gid!` macro to create type-safe ID wrappers that accept
//! both bare numeric ids (`"123"`) and Shopify global ids
//! (`"gid://shopify/Order/123"`), and prevent accidentally mixing ids of
//! different resources.

use thiserror::Error;

/// Prefix shared by every Shopify global id.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a Shopify id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The global id names a different resource.
    #[error("expected a {expected} id, got a {found} id")]
    WrongResource {
        /// Resource the caller asked for.
        expected: &'static str,
        /// Resource found in the global id.
        found: String,
    },
    /// The numeric part is not a positive integer.
    #[error("invalid numeric id: {0}")]
    NotNumeric(String),
}

/// Parse the numeric part of a bare or global id for `resource`.
///
/// # Errors
///
/// Returns an error if the input is empty, names another resource, or the
/// numeric part does not fit in a `u64`.
pub fn parse_gid(input: &str, resource: &'static str) -> Result<u64, IdError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(IdError::Empty);
    }

    let numeric = match input.strip_prefix(GID_PREFIX) {
        Some(rest) => {
            let (found, id) = rest
                .split_once('/')
                .ok_or_else(|| IdError::NotNumeric(input.to_string()))?;
            if found != resource {
                return Err(IdError::WrongResource {
                    expected: resource,
                    found: found.to_string(),
                });
            }
            id
        }
        None => input,
    };

    if numeric.is_empty() || !numeric.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdError::NotNumeric(input.to_string()));
    }

    numeric
        .parse::<u64>()
        .map_err(|_| IdError::NotNumeric(input.to_string()))
}

/// Macro to define a type-safe Shopify id wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` accepting bare and global ids, `gid()` rendering the global id
/// - `FromStr`, `Display` (numeric part) and `From<u64>`
///
/// # Example
///
/// ```rust
/// # use proforma_core::define_gid;
/// define_gid!(ProductId, "Product");
///
/// let id = ProductId::parse("gid://shopify/Product/42").unwrap();
/// assert_eq!(id.as_u64(), 42);
/// assert_eq!(id.gid(), "gid://shopify/Product/42");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Shopify resource name used in global ids.
            pub const RESOURCE: &'static str = $resource;

            /// Create a new ID from its numeric value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying numeric value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            /// Render the Shopify global id (`gid://shopify/<Resource>/<id>`).
            #[must_use]
            pub fn gid(&self) -> String {
                format!("{}{}/{}", $crate::types::id::GID_PREFIX, $resource, self.0)
            }

            /// Parse a bare numeric id or a global id for this resource.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is not a valid id for this resource.
            pub fn parse(input: &str) -> Result<Self, $crate::types::id::IdError> {
                $crate::types::id::parse_gid(input, $resource).map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_gid!(OrderId, "Order");
define_gid!(CustomerId, "Customer");

//! HMAC-signed print links.
//!
//! The POS extension cannot carry a session into the browser that prints
//! the proforma, so the print URL itself carries a signature over the
//! order id and shop domain. Links do not expire: rotating the secret is
//! the only way to revoke them.
//!
//! The signed message is `"{order_id.len()}:{order_id}:{shop}"`. The length
//! prefix keeps `("1", "23")` and `("12", "3")` apart, as well as shops
//! that contain `:` themselves.

use core::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;
use url::Url;

use crate::types::{OrderId, ShopDomain};

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded SHA-256 MAC.
const SIGNATURE_HEX_LEN: usize = 64;

/// Errors constructing a [`LinkSigner`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The secret cannot key the MAC.
    #[error("invalid signing key")]
    InvalidKey,
    /// The print base URL does not parse or cannot carry a path.
    #[error("invalid print base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A signed, shareable print URL for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPrintLink {
    pub order_id: OrderId,
    pub shop: ShopDomain,
    /// Lowercase hex HMAC-SHA256.
    pub signature: String,
    pub url: String,
    pub issued_at: DateTime<Utc>,
}

/// Issues and verifies print link signatures.
#[derive(Clone)]
pub struct LinkSigner {
    mac: HmacSha256,
    base_url: Url,
}

impl fmt::Debug for LinkSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkSigner")
            .field("mac", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl LinkSigner {
    /// Create a signer keyed by `secret` that issues links under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is rejected or `base_url` is not an
    /// absolute URL that can carry a path.
    pub fn new(secret: &SecretString, base_url: &str) -> Result<Self, SigningError> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| SigningError::InvalidKey)?;

        let mut base_url =
            Url::parse(base_url).map_err(|_| SigningError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SigningError::InvalidBaseUrl(base_url.to_string()));
        }
        base_url.set_query(None);
        base_url.set_fragment(None);

        Ok(Self { mac, base_url })
    }

    /// Base URL links are issued under.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn mac_for(&self, order_id: &str, shop: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(order_id.len().to_string().as_bytes());
        mac.update(b":");
        mac.update(order_id.as_bytes());
        mac.update(b":");
        mac.update(shop.as_bytes());
        mac
    }

    /// Lowercase hex signature for an order and shop.
    #[must_use]
    pub fn sign(&self, order_id: &str, shop: &str) -> String {
        hex::encode(self.mac_for(order_id, shop).finalize().into_bytes())
    }

    /// Check a signature in constant time.
    ///
    /// Only the exact lowercase hex form produced by [`Self::sign`] is
    /// accepted.
    #[must_use]
    pub fn verify(&self, order_id: &str, shop: &str, signature: &str) -> bool {
        if signature.len() != SIGNATURE_HEX_LEN
            || !signature
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return false;
        }

        let Ok(bytes) = hex::decode(signature) else {
            return false;
        };

        self.mac_for(order_id, shop).verify_slice(&bytes).is_ok()
    }

    /// Issue a print link for an order, stamped with the current time.
    #[must_use]
    pub fn issue(&self, order_id: OrderId, shop: &ShopDomain) -> SignedPrintLink {
        self.issue_at(order_id, shop, Utc::now())
    }

    /// Issue a print link stamped with `issued_at`.
    #[must_use]
    pub fn issue_at(
        &self,
        order_id: OrderId,
        shop: &ShopDomain,
        issued_at: DateTime<Utc>,
    ) -> SignedPrintLink {
        let id = order_id.to_string();
        let signature = self.sign(&id, shop.as_str());

        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["print", "proforma", id.as_str()]);
        }
        url.query_pairs_mut()
            .append_pair("sig", &signature)
            .append_pair("shop", shop.as_str());

        SignedPrintLink {
            order_id,
            shop: shop.clone(),
            signature,
            url: url.into(),
            issued_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> LinkSigner {
        LinkSigner::new(
            &SecretString::from("k7Qw9zR2pL5mX8vN3bT6yH1cJ4fD0sGa"),
            "https://proforma.example.com",
        )
        .unwrap()
    }

    fn shop() -> ShopDomain {
        ShopDomain::parse("acme.myshopify.com").unwrap()
    }

    #[test]
    fn test_issue_round_trip() {
        let signer = signer();
        let link = signer.issue(OrderId::new(5_551_234), &shop());

        assert_eq!(link.signature.len(), 64);
        assert!(signer.verify("5551234", "acme.myshopify.com", &link.signature));
        assert_eq!(
            link.url,
            format!(
                "https://proforma.example.com/print/proforma/5551234?sig={}&shop=acme.myshopify.com",
                link.signature
            )
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = signer();
        assert_eq!(signer.sign("1", "a.b"), signer.sign("1", "a.b"));
        assert_ne!(signer.sign("1", "a.b"), signer.sign("2", "a.b"));
    }

    #[test]
    fn test_single_character_mutations_fail() {
        let signer = signer();
        let order = "5551234";
        let shop = "acme.myshopify.com";
        let sig = signer.sign(order, shop);

        for i in 0..order.len() {
            let mut mutated = order.as_bytes().to_vec();
            mutated[i] = if mutated[i] == b'9' { b'0' } else { mutated[i] + 1 };
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(!signer.verify(&mutated, shop, &sig), "order mutation at {i}");
        }

        for i in 0..shop.len() {
            let mut mutated = shop.as_bytes().to_vec();
            mutated[i] = if mutated[i] == b'z' { b'a' } else { mutated[i] + 1 };
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(!signer.verify(order, &mutated, &sig), "shop mutation at {i}");
        }

        for i in 0..sig.len() {
            let mut mutated = sig.as_bytes().to_vec();
            mutated[i] = if mutated[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(!signer.verify(order, shop, &mutated), "signature mutation at {i}");
        }
    }

    #[test]
    fn test_uppercase_signature_rejected() {
        let signer = signer();
        let sig = signer.sign("42", "acme.myshopify.com");
        assert!(!signer.verify("42", "acme.myshopify.com", &sig.to_uppercase()));
        assert!(!signer.verify("42", "acme.myshopify.com", ""));
        assert!(!signer.verify("42", "acme.myshopify.com", &sig[..62]));
    }

    #[test]
    fn test_concatenation_collision_is_fixed() {
        let signer = signer();
        assert_ne!(signer.sign("1", "23"), signer.sign("12", "3"));
        assert_ne!(signer.sign("1", "2:3"), signer.sign("1:2", "3"));
        assert!(!signer.verify("12", "3", &signer.sign("1", "23")));
    }

    #[test]
    fn test_different_secret_rejects() {
        let other = LinkSigner::new(
            &SecretString::from("another-secret-value-for-testing"),
            "https://proforma.example.com",
        )
        .unwrap();
        let sig = signer().sign("42", "acme.myshopify.com");
        assert!(!other.verify("42", "acme.myshopify.com", &sig));
    }

    #[test]
    fn test_base_url_with_path_and_trailing_slash() {
        let signer = LinkSigner::new(
            &SecretString::from("k7Qw9zR2pL5mX8vN3bT6yH1cJ4fD0sGa"),
            "https://apps.example.com/proforma/?x=1",
        )
        .unwrap();
        let link = signer.issue(OrderId::new(7), &shop());
        assert!(
            link.url
                .starts_with("https://apps.example.com/proforma/print/proforma/7?sig=")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let secret = SecretString::from("k7Qw9zR2pL5mX8vN3bT6yH1cJ4fD0sGa");
        assert!(matches!(
            LinkSigner::new(&secret, "not a url"),
            Err(SigningError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            LinkSigner::new(&secret, "mailto:someone@example.com"),
            Err(SigningError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", signer());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("k7Qw9z"));
    }
}

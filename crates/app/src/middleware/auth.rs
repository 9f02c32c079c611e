//! Shopify session token authentication for extension API routes.
//!
//! POS and admin extensions send `Authorization: Bearer <session token>`,
//! an HS256 JWT signed with the app's API secret whose audience is the API
//! key and whose `dest` is the shop the extension runs in.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use proforma_core::ShopDomain;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Claims of a Shopify session token.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    /// Shop admin URL, `https://{shop}/admin`.
    pub iss: String,
    /// Shop URL, `https://{shop}`.
    pub dest: String,
    pub aud: String,
    /// Staff member id.
    pub sub: Option<String>,
    pub exp: i64,
    pub nbf: Option<i64>,
}

/// Verifies session tokens for the configured store.
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
    store: ShopDomain,
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("key", &"[REDACTED]")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl SessionVerifier {
    #[must_use]
    pub fn new(api_secret: &SecretString, api_key: &str, store: ShopDomain) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[api_key]);
        validation.validate_nbf = true;

        Self {
            key: DecodingKey::from_secret(api_secret.expose_secret().as_bytes()),
            validation,
            store,
        }
    }

    /// Verify a token and check it was issued for the configured store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for a malformed, expired or
    /// mis-signed token, or one issued for another shop.
    pub fn verify(&self, token: &str) -> Result<ShopSession, AppError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::Unauthorized("Invalid session token".to_string())
        })?;

        let shop = data
            .claims
            .dest
            .strip_prefix("https://")
            .and_then(|host| ShopDomain::parse(host).ok())
            .filter(|shop| shop == &self.store)
            .ok_or_else(|| {
                tracing::warn!(dest = %data.claims.dest, "Session token for another shop");
                AppError::Unauthorized("Invalid session token".to_string())
            })?;

        Ok(ShopSession {
            shop,
            user_id: data.claims.sub,
        })
    }
}

/// An authenticated extension session.
#[derive(Debug, Clone)]
pub struct ShopSession {
    pub shop: ShopDomain,
    /// Staff member id, when the token carries one.
    pub user_id: Option<String>,
}

impl FromRequestParts<AppState> for ShopSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing session token".to_string()))?;

        state.sessions().verify(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    use super::*;

    const SECRET: &str = "kT9#mQ2$vL8@pX4!wR6^nZ1&bY3*cH5";
    const API_KEY: &str = "app-api-key";

    #[derive(Serialize)]
    struct Claims<'a> {
        iss: String,
        dest: String,
        aud: &'a str,
        sub: &'a str,
        exp: i64,
        nbf: i64,
    }

    fn token(shop: &str, aud: &str, secret: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                iss: format!("https://{shop}/admin"),
                dest: format!("https://{shop}"),
                aud,
                sub: "42",
                exp: now + exp_offset,
                nbf: now - 10,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> SessionVerifier {
        SessionVerifier::new(
            &SecretString::from(SECRET),
            API_KEY,
            ShopDomain::parse("negozio.myshopify.com").unwrap(),
        )
    }

    #[test]
    fn test_valid_token() {
        let session = verifier()
            .verify(&token("negozio.myshopify.com", API_KEY, SECRET, 60))
            .unwrap();
        assert_eq!(session.shop.as_str(), "negozio.myshopify.com");
        assert_eq!(session.user_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_rejects_other_shop() {
        assert!(
            verifier()
                .verify(&token("altro.myshopify.com", API_KEY, SECRET, 60))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_wrong_audience() {
        assert!(
            verifier()
                .verify(&token("negozio.myshopify.com", "other-app", SECRET, 60))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_wrong_secret() {
        assert!(
            verifier()
                .verify(&token("negozio.myshopify.com", API_KEY, "another-secret-value", 60))
                .is_err()
        );
    }

    #[test]
    fn test_rejects_expired() {
        assert!(
            verifier()
                .verify(&token("negozio.myshopify.com", API_KEY, SECRET, -3600))
                .is_err()
        );
    }
}

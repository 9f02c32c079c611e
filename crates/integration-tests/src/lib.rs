//! Integration test harness for the proforma service.
//!
//! Drives the real router in-process with `tower::ServiceExt::oneshot`
//! against [`FakePlatform`], an in-memory commerce platform that counts
//! every call.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p proforma-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use proforma_app::config::{ProformaConfig, ShopifyConfig};
use proforma_app::services::{CommercePlatform, ManualClock};
use proforma_app::shopify::{AdminShopifyError, InvoiceState, MetafieldUserError};
use proforma_app::state::AppState;
use proforma_core::invoice::MetafieldWrite;
use proforma_core::proforma::{
    Address, CompanyDetails, CustomerRecord, LineItemRecord, OrderRecord, ShopRecord, TaxLine,
    TransactionRecord,
};
use proforma_core::{Annotations, CustomerId, OrderId, ShopDomain};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;

pub const STORE: &str = "negozio.myshopify.com";
pub const API_KEY: &str = "proforma-api-key";
pub const API_SECRET: &str = "kT9#mQ2$vL8@pX4!wR6^nZ1&bY3*cH5";
pub const BASE_URL: &str = "https://proforma.example.it";
pub const CACHE_TTL: Duration = Duration::from_secs(300);

// =============================================================================
// Fake platform
// =============================================================================

/// Call counters of a [`FakePlatform`].
#[derive(Debug, Default)]
pub struct CallCounts {
    pub invoice_state: AtomicUsize,
    pub customer_annotations: AtomicUsize,
    pub set_metafields: AtomicUsize,
    pub proforma_order: AtomicUsize,
    pub shop: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// In-memory commerce platform.
///
/// Metafield writes are applied to the stored orders, so a request shows up
/// in later reads the way it does on Shopify.
#[derive(Debug, Default)]
pub struct FakePlatform {
    orders: Mutex<HashMap<OrderId, OrderRecord>>,
    shop: Mutex<ShopRecord>,
    user_errors: Mutex<Vec<MetafieldUserError>>,
    writes: Mutex<Vec<Vec<MetafieldWrite>>>,
    unavailable: AtomicBool,
    pub calls: CallCounts,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            shop: Mutex::new(sample_shop()),
            ..Self::default()
        }
    }

    pub fn with_order(self, order: OrderRecord) -> Self {
        self.orders.lock().unwrap().insert(order.id, order);
        self
    }

    /// Make every call fail as if Shopify were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// User errors the next `metafieldsSet` calls return.
    pub fn reject_writes(&self, errors: Vec<MetafieldUserError>) {
        *self.user_errors.lock().unwrap() = errors;
    }

    pub fn writes(&self) -> Vec<Vec<MetafieldWrite>> {
        self.writes.lock().unwrap().clone()
    }

    pub fn order(&self, id: OrderId) -> Option<OrderRecord> {
        self.orders.lock().unwrap().get(&id).cloned()
    }

    /// Change an order in place, e.g. to prove a cached page is not refetched.
    pub fn update_order(&self, id: OrderId, update: impl FnOnce(&mut OrderRecord)) {
        if let Some(order) = self.orders.lock().unwrap().get_mut(&id) {
            update(order);
        }
    }

    /// Change an order's customer annotations, as a merchant edit would.
    pub fn update_customer(&self, order_id: OrderId, update: impl FnOnce(&mut Annotations)) {
        self.update_order(order_id, |order| {
            if let Some(customer) = order.customer.as_mut() {
                update(&mut customer.annotations);
            }
        });
    }

    fn check_available(&self) -> Result<(), AdminShopifyError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AdminShopifyError::RateLimited(2));
        }
        Ok(())
    }
}

#[async_trait]
impl CommercePlatform for FakePlatform {
    async fn invoice_state(&self, order_id: OrderId) -> Result<InvoiceState, AdminShopifyError> {
        self.calls.invoice_state.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let order = self
            .order(order_id)
            .ok_or_else(|| AdminShopifyError::NotFound(order_id.gid()))?;

        Ok(InvoiceState {
            order: order.annotations,
            customer: order
                .customer
                .and_then(|c| c.id.map(|id| (id, c.annotations))),
        })
    }

    async fn customer_annotations(
        &self,
        customer_id: CustomerId,
    ) -> Result<Annotations, AdminShopifyError> {
        self.calls.customer_annotations.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        self.orders
            .lock()
            .unwrap()
            .values()
            .filter_map(|o| o.customer.as_ref())
            .find(|c| c.id == Some(customer_id))
            .map(|c| c.annotations.clone())
            .ok_or_else(|| AdminShopifyError::NotFound(customer_id.gid()))
    }

    async fn set_metafields(
        &self,
        metafields: Vec<MetafieldWrite>,
    ) -> Result<Vec<MetafieldUserError>, AdminShopifyError> {
        self.calls.set_metafields.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let user_errors = self.user_errors.lock().unwrap().clone();
        if user_errors.is_empty() {
            let mut orders = self.orders.lock().unwrap();
            for write in &metafields {
                if let Ok(id) = OrderId::parse(&write.owner_id)
                    && let Some(order) = orders.get_mut(&id)
                {
                    order.annotations.insert(write.key.clone(), write.value.clone());
                }
            }
        }

        self.writes.lock().unwrap().push(metafields);
        Ok(user_errors)
    }

    async fn proforma_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<OrderRecord>, AdminShopifyError> {
        self.calls.proforma_order.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.order(order_id))
    }

    async fn shop(&self) -> Result<ShopRecord, AdminShopifyError> {
        self.calls.shop.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.shop.lock().unwrap().clone())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn annotations(pairs: &[(&str, &str)]) -> Annotations {
    pairs.iter().copied().collect()
}

/// A company customer with complete fiscal data.
pub fn company_annotations() -> Annotations {
    annotations(&[
        ("customer_type", "company"),
        ("ragione_sociale", "Rossi Arredamenti Srl"),
        ("partita_iva", "IT01234567890"),
        ("sede_legale_via", "Via Roma 1"),
        ("sede_legale_cap", "20100"),
        ("sede_legale_citta", "Milano"),
        ("sede_legale_provincia", "MI"),
        ("codice_sdi", "ABC1234"),
    ])
}

pub fn sample_order(id: u64, customer: Option<Annotations>) -> OrderRecord {
    OrderRecord {
        id: OrderId::new(id),
        name: format!("#{id}"),
        created_at: "2026-03-05T10:00:00Z".to_string(),
        po_number: Some("PO-77".to_string()),
        annotations: Annotations::new(),
        customer: customer.map(|annotations| CustomerRecord {
            id: Some(CustomerId::new(id + 5000)),
            first_name: Some("Mario".to_string()),
            last_name: Some("Rossi".to_string()),
            display_name: Some("Mario Rossi".to_string()),
            email: Some("mario@rossi.it".to_string()),
            annotations,
            ..CustomerRecord::default()
        }),
        billing_address: Some(Address {
            address1: Some("Via Roma 1".to_string()),
            zip: Some("20100".to_string()),
            city: Some("Milano".to_string()),
            country: Some("Italia".to_string()),
            ..Address::default()
        }),
        shipping_address: None,
        line_items: vec![LineItemRecord {
            title: "Sedia Lounge".to_string(),
            variant_title: Some("Rossa".to_string()),
            sku: Some("SED-1".to_string()),
            quantity: 2,
            original_unit_price: Decimal::new(5000, 2),
            discounted_unit_price: Decimal::new(4500, 2),
            tax_lines: vec![],
            discount_allocations: vec![],
        }],
        total_discounts: Decimal::new(1000, 2),
        subtotal: Decimal::new(9000, 2),
        total_shipping: Decimal::ZERO,
        tax_lines: vec![TaxLine {
            rate_percentage: Some(Decimal::new(22, 0)),
            title: Some("IVA".to_string()),
        }],
        total_tax: Decimal::new(1623, 2),
        total_price: Decimal::new(9000, 2),
        currency: "EUR".to_string(),
        payment_gateway_names: vec!["bank_transfer".to_string()],
        transactions: vec![TransactionRecord {
            gateway: Some("bank_transfer".to_string()),
            amount: Some(Decimal::new(9000, 2)),
            status: Some("SUCCESS".to_string()),
            created_at: Some("2026-03-05T10:01:00Z".to_string()),
        }],
    }
}

pub fn sample_shop() -> ShopRecord {
    ShopRecord {
        name: "Negozio Design".to_string(),
        email: Some("info@negozio.it".to_string()),
        myshopify_domain: Some(STORE.to_string()),
        billing_address: Some(Address {
            address1: Some("Corso Italia 10".to_string()),
            zip: Some("10100".to_string()),
            city: Some("Torino".to_string()),
            ..Address::default()
        }),
        company: CompanyDetails {
            partita_iva: Some("IT09876543210".to_string()),
            ..CompanyDetails::default()
        },
    }
}

// =============================================================================
// Test context
// =============================================================================

pub fn test_config() -> ProformaConfig {
    ProformaConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: BASE_URL.to_string(),
        cache_ttl: CACHE_TTL,
        shopify: ShopifyConfig {
            store: ShopDomain::parse(STORE).unwrap(),
            api_version: "2026-01".to_string(),
            api_key: API_KEY.to_string(),
            api_secret: SecretString::from(API_SECRET),
            access_token: SecretString::from("shpat_test_token"),
            request_timeout: Duration::from_secs(5),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Router, platform and clock of one test.
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub platform: Arc<FakePlatform>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    pub fn new(platform: FakePlatform) -> Self {
        let platform = Arc::new(platform);
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap(),
        ));
        let state = AppState::new(test_config(), platform.clone(), clock.clone()).unwrap();

        Self {
            app: proforma_app::router(state.clone()),
            state,
            platform,
            clock,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Request with a valid session token for the store.
    pub async fn authed(&self, method: &str, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Authorization", format!("Bearer {}", session_token(STORE)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Path and query of the signed print link for an order.
    pub fn print_path(&self, order_id: u64) -> String {
        let link = self
            .state
            .signer()
            .issue(OrderId::new(order_id), &ShopDomain::parse(STORE).unwrap());
        let url = url::Url::parse(&link.url).unwrap();
        format!("{}?{}", url.path(), url.query().unwrap_or_default())
    }
}

/// Shopify session token for a shop, signed with the test secret.
pub fn session_token(shop: &str) -> String {
    let now = Utc::now().timestamp();
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "iss": format!("https://{shop}/admin"),
            "dest": format!("https://{shop}"),
            "aud": API_KEY,
            "sub": "42",
            "exp": now + 60,
            "nbf": now - 10,
            "iat": now,
        }),
        &EncodingKey::from_secret(API_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn assert_status(response: &Response<Body>, status: StatusCode) {
    assert_eq!(response.status(), status, "unexpected status");
}

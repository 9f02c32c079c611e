//! Template-ready proforma document.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::invoice::CustomerType;
use crate::types::{Annotations, keys};

use super::format::round_cents;
use super::source::{
    Address, CompanyDetails, CustomerRecord, DiscountAllocation, FiscalSnapshot, LineItemRecord,
    OrderRecord, ShopRecord, TaxLine, TransactionRecord,
};

/// Customer type shown when neither the snapshot nor the customer has one.
pub const DEFAULT_CUSTOMER_TYPE: CustomerType = CustomerType::Company;

/// Snapshot key of the nested registered office object.
const SEDE_LEGALE: &str = "sede_legale";

/// Registered office of the invoiced customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SedeLegale {
    pub via: Option<String>,
    pub cap: Option<String>,
    pub citta: Option<String>,
    pub provincia: Option<String>,
}

impl SedeLegale {
    /// Whether no part of the address is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.via.is_none() && self.cap.is_none() && self.citta.is_none() && self.provincia.is_none()
    }
}

/// Fiscal identity printed on the proforma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiscalData {
    /// `individual`, `company`, or whatever was recorded.
    pub customer_type: String,
    pub ragione_sociale: Option<String>,
    pub partita_iva: Option<String>,
    pub codice_fiscale: Option<String>,
    pub pec: Option<String>,
    /// SDI recipient code, read from `codice_sdi`.
    pub codice_destinatario: Option<String>,
    pub sede_legale: SedeLegale,
}

impl FiscalData {
    /// Resolve fiscal fields, preferring the order-time snapshot.
    ///
    /// A key present in the snapshot wins even when its value is blank, so
    /// the proforma shows what the customer had when invoicing was
    /// requested. Keys the snapshot lacks fall back to the live customer
    /// annotations. The registered office comes from a nested `sede_legale`
    /// object when the snapshot has one, otherwise field by field from the
    /// flat `sede_legale_*` keys.
    #[must_use]
    pub fn resolve(snapshot: Option<&FiscalSnapshot>, live: &Annotations) -> Self {
        let field = |key: &str| match snapshot.and_then(|s| s.field(key)) {
            Some(value) => value,
            None => live.get_non_blank(key).map(str::to_string),
        };

        let sede_legale = match snapshot.filter(|s| s.has_object(SEDE_LEGALE)) {
            Some(snapshot) => SedeLegale {
                via: snapshot.nested(SEDE_LEGALE, "via").flatten(),
                cap: snapshot.nested(SEDE_LEGALE, "cap").flatten(),
                citta: snapshot.nested(SEDE_LEGALE, "citta").flatten(),
                provincia: snapshot.nested(SEDE_LEGALE, "provincia").flatten(),
            },
            None => SedeLegale {
                via: field(keys::SEDE_LEGALE_VIA),
                cap: field(keys::SEDE_LEGALE_CAP),
                citta: field(keys::SEDE_LEGALE_CITTA),
                provincia: field(keys::SEDE_LEGALE_PROVINCIA),
            },
        };

        Self {
            customer_type: field(keys::CUSTOMER_TYPE)
                .unwrap_or_else(|| DEFAULT_CUSTOMER_TYPE.as_str().to_string()),
            ragione_sociale: field(keys::RAGIONE_SOCIALE),
            partita_iva: field(keys::PARTITA_IVA),
            codice_fiscale: field(keys::CODICE_FISCALE),
            pec: field(keys::PEC),
            codice_destinatario: field(keys::CODICE_SDI),
            sede_legale,
        }
    }

    /// Whether the customer is invoiced as a company.
    #[must_use]
    pub fn is_company(&self) -> bool {
        self.customer_type == CustomerType::Company.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerView {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub fiscal: FiscalData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub title: String,
    pub variant_title: String,
    pub sku: String,
    pub quantity: i64,
    pub original_price: Decimal,
    pub final_price: Decimal,
    pub tax_lines: Vec<TaxLine>,
    pub discount_allocations: Vec<DiscountAllocation>,
    /// Discounted unit price times quantity, rounded half up to cents.
    pub final_line_price: Decimal,
}

impl From<&LineItemRecord> for LineView {
    fn from(item: &LineItemRecord) -> Self {
        Self {
            title: item.title.clone(),
            variant_title: item.variant_title.clone().unwrap_or_default(),
            sku: item.sku.clone().unwrap_or_default(),
            quantity: item.quantity,
            original_price: item.original_unit_price,
            final_price: item.discounted_unit_price,
            tax_lines: item.tax_lines.clone(),
            discount_allocations: item.discount_allocations.clone(),
            final_line_price: line_total(item.discounted_unit_price, item.quantity),
        }
    }
}

/// Line total: unit price times quantity, rounded half up to cents.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    round_cents(unit_price * Decimal::from(quantity))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    pub gateway: String,
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            gateway: tx.gateway.clone().unwrap_or_default(),
            amount: tx.amount,
            status: tx.status.clone(),
            created_at: tx.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub name: String,
    pub created_at: String,
    pub po_number: Option<String>,
    pub customer: CustomerView,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub line_items: Vec<LineView>,
    pub total_discount: Decimal,
    pub subtotal: Decimal,
    pub shipping_price: Decimal,
    /// Rate of the first order-level tax line.
    pub tax_rate: Option<Decimal>,
    pub tax_price: Decimal,
    pub total_price: Decimal,
    pub net_payment: Decimal,
    pub currency: String,
    pub payment_gateway_names: Vec<String>,
    pub transactions: Vec<TransactionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopView {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub company: CompanyDetails,
}

impl From<&ShopRecord> for ShopView {
    fn from(shop: &ShopRecord) -> Self {
        Self {
            name: shop.name.clone(),
            email: shop.email.clone(),
            address: shop.billing_address.clone(),
            company: shop.company.clone(),
        }
    }
}

/// Everything the proforma template renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProformaDocument {
    pub order: OrderView,
    pub shop: ShopView,
}

impl ProformaDocument {
    /// Project an order and shop into a document.
    ///
    /// `snapshot` is the parsed `invoice_data` of the order, if it had a
    /// readable one.
    #[must_use]
    pub fn build(order: &OrderRecord, shop: &ShopRecord, snapshot: Option<&FiscalSnapshot>) -> Self {
        let empty = Annotations::new();
        let customer = order.customer.as_ref();
        let live = customer.map_or(&empty, |c| &c.annotations);

        let customer_view = CustomerView {
            id: customer.and_then(|c| c.id).map(|id| id.gid()),
            name: customer.and_then(CustomerRecord::name),
            email: customer.and_then(|c| c.email.clone()),
            phone: customer.and_then(|c| c.phone.clone()),
            address: customer.and_then(|c| c.default_address.clone()),
            fiscal: FiscalData::resolve(snapshot, live),
        };

        Self {
            order: OrderView {
                name: order.name.clone(),
                created_at: order.created_at.clone(),
                po_number: order.po_number.clone(),
                customer: customer_view,
                billing_address: order.billing_address.clone(),
                shipping_address: order.shipping_address.clone(),
                line_items: order.line_items.iter().map(LineView::from).collect(),
                total_discount: order.total_discounts,
                subtotal: order.subtotal,
                shipping_price: order.total_shipping,
                tax_rate: order.tax_lines.first().and_then(|t| t.rate_percentage),
                tax_price: order.total_tax,
                total_price: order.total_price,
                net_payment: order.total_price,
                currency: order.currency.clone(),
                payment_gateway_names: order.payment_gateway_names.clone(),
                transactions: order.transactions.iter().map(TransactionView::from).collect(),
            },
            shop: ShopView::from(shop),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::types::{CustomerId, OrderId};

    fn sample_order() -> OrderRecord {
        OrderRecord {
            id: OrderId::new(1001),
            name: "#1001".to_string(),
            created_at: "2024-03-05T10:00:00Z".to_string(),
            po_number: None,
            annotations: Annotations::new(),
            customer: Some(CustomerRecord {
                id: Some(CustomerId::new(77)),
                first_name: Some("Mario".to_string()),
                last_name: Some("Rossi".to_string()),
                annotations: [
                    ("customer_type", "company"),
                    ("ragione_sociale", "Live Srl"),
                    ("partita_iva", "IT999"),
                    ("sede_legale_citta", "Torino"),
                ]
                .into_iter()
                .collect(),
                ..CustomerRecord::default()
            }),
            billing_address: None,
            shipping_address: None,
            line_items: vec![LineItemRecord {
                title: "Tavolo".to_string(),
                variant_title: None,
                sku: Some("TAV-1".to_string()),
                quantity: 3,
                original_unit_price: dec!(10.00),
                discounted_unit_price: dec!(3.335),
                tax_lines: vec![],
                discount_allocations: vec![],
            }],
            total_discounts: dec!(19.99),
            subtotal: dec!(10.01),
            total_shipping: dec!(0),
            tax_lines: vec![TaxLine {
                rate_percentage: Some(dec!(22)),
                title: Some("IVA".to_string()),
            }],
            total_tax: dec!(1.80),
            total_price: dec!(10.01),
            currency: "EUR".to_string(),
            payment_gateway_names: vec!["manual".to_string()],
            transactions: vec![],
        }
    }

    #[test]
    fn test_line_total_rounds_half_up() {
        assert_eq!(line_total(dec!(3.335), 3), dec!(10.01));
        assert_eq!(line_total(dec!(0.005), 1), dec!(0.01));
        assert_eq!(line_total(dec!(19.99), 2), dec!(39.98));
    }

    #[test]
    fn test_build_uses_live_data_without_snapshot() {
        let doc = ProformaDocument::build(&sample_order(), &ShopRecord::default(), None);
        let fiscal = &doc.order.customer.fiscal;
        assert_eq!(fiscal.customer_type, "company");
        assert_eq!(fiscal.ragione_sociale.as_deref(), Some("Live Srl"));
        assert_eq!(fiscal.sede_legale.citta.as_deref(), Some("Torino"));
        assert_eq!(doc.order.customer.name.as_deref(), Some("Mario Rossi"));
        assert_eq!(doc.order.customer.id.as_deref(), Some("gid://shopify/Customer/77"));
        assert_eq!(doc.order.line_items[0].final_line_price, dec!(10.01));
        assert_eq!(doc.order.line_items[0].variant_title, "");
        assert_eq!(doc.order.tax_rate, Some(dec!(22)));
        assert_eq!(doc.order.net_payment, dec!(10.01));
    }

    #[test]
    fn test_snapshot_wins_over_live_data() {
        let snapshot = FiscalSnapshot::parse(
            r#"{"customer_type":"company","ragione_sociale":"Snapshot Srl",
                "partita_iva":"","sede_legale_citta":"Milano","codice_sdi":"ABC1234"}"#,
        )
        .unwrap();
        let doc = ProformaDocument::build(&sample_order(), &ShopRecord::default(), Some(&snapshot));
        let fiscal = &doc.order.customer.fiscal;
        assert_eq!(fiscal.ragione_sociale.as_deref(), Some("Snapshot Srl"));
        assert_eq!(fiscal.partita_iva, None);
        assert_eq!(fiscal.sede_legale.citta.as_deref(), Some("Milano"));
        assert_eq!(fiscal.codice_destinatario.as_deref(), Some("ABC1234"));
    }

    #[test]
    fn test_nested_sede_legale() {
        let snapshot =
            FiscalSnapshot::parse(r#"{"sede_legale":{"via":"Via Po 2","cap":"10100"}}"#).unwrap();
        let doc = ProformaDocument::build(&sample_order(), &ShopRecord::default(), Some(&snapshot));
        let sede = &doc.order.customer.fiscal.sede_legale;
        assert_eq!(sede.via.as_deref(), Some("Via Po 2"));
        assert_eq!(sede.cap.as_deref(), Some("10100"));
        assert_eq!(sede.citta, None);
    }

    #[test]
    fn test_customer_type_defaults_to_company() {
        let mut order = sample_order();
        order.customer = None;
        let doc = ProformaDocument::build(&order, &ShopRecord::default(), None);
        assert_eq!(doc.order.customer.fiscal.customer_type, "company");
        assert!(doc.order.customer.fiscal.is_company());
        assert!(doc.order.customer.fiscal.sede_legale.is_empty());
        assert_eq!(doc.order.customer.name, None);

        let snapshot = FiscalSnapshot::parse(r#"{"customer_type":"  "}"#).unwrap();
        let doc = ProformaDocument::build(&order, &ShopRecord::default(), Some(&snapshot));
        assert_eq!(doc.order.customer.fiscal.customer_type, "company");
    }

    #[test]
    fn test_individual_from_snapshot() {
        let snapshot =
            FiscalSnapshot::parse(r#"{"customer_type":"individual","codice_fiscale":"ABC123"}"#)
                .unwrap();
        let doc = ProformaDocument::build(&sample_order(), &ShopRecord::default(), Some(&snapshot));
        let fiscal = &doc.order.customer.fiscal;
        assert_eq!(fiscal.customer_type, "individual");
        assert!(!fiscal.is_company());
        assert_eq!(fiscal.codice_fiscale.as_deref(), Some("ABC123"));
        assert_eq!(fiscal.ragione_sociale.as_deref(), Some("Live Srl"));
    }
}

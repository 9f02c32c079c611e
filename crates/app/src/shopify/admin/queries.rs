//! GraphQL operations used against the Shopify Admin API.
//!
//! Each operation is a marker type implementing `graphql_client::GraphQLQuery`
//! by hand, with its query document, variables and response types in a
//! module of the same name (snake case), matching the layout the derive
//! macro generates.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

// =============================================================================
// Custom scalar type aliases
// =============================================================================

/// ISO 8601 date-time string.
type DateTime = String;

/// Money amount as decimal string.
type Money = String;

/// Maximum metafields read per owner in the `invoice` namespace.
pub const INVOICE_METAFIELDS_FIRST: i64 = 50;

/// Maximum line items printed on a proforma.
pub const LINE_ITEMS_FIRST: i64 = 100;

/// Maximum payment transactions printed on a proforma.
pub const TRANSACTIONS_FIRST: i64 = 10;

macro_rules! operation {
    ($name:ident, $module:ident) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

/// Shared shapes.
pub mod common {
    use super::{Deserialize, Money};

    #[derive(Debug, Clone, Deserialize)]
    pub struct MetafieldNode {
        pub key: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MetafieldConnection {
        pub nodes: Vec<MetafieldNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MetafieldValue {
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyV2 {
        pub amount: Money,
        pub currency_code: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyBag {
        pub shop_money: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MailingAddress {
        pub address1: Option<String>,
        pub address2: Option<String>,
        pub city: Option<String>,
        pub province: Option<String>,
        pub province_code: Option<String>,
        pub zip: Option<String>,
        pub country: Option<String>,
        pub phone: Option<String>,
    }
}

// =============================================================================
// Invoice state
// =============================================================================

operation!(InvoiceState, invoice_state);

pub mod invoice_state {
    use super::{Deserialize, Serialize, common::MetafieldConnection};

    pub const OPERATION_NAME: &str = "InvoiceState";
    pub const QUERY: &str = r#"
        query InvoiceState($id: ID!, $first: Int!) {
            order(id: $id) {
                id
                metafields(namespace: "invoice", first: $first) {
                    nodes { key value }
                }
                customer {
                    id
                    metafields(namespace: "invoice", first: $first) {
                        nodes { key value }
                    }
                }
            }
        }
    "#;

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub id: String,
        pub first: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub order: Option<Order>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Order {
        pub id: String,
        pub metafields: MetafieldConnection,
        pub customer: Option<Customer>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Customer {
        pub id: String,
        pub metafields: MetafieldConnection,
    }
}

// =============================================================================
// Customer invoice metafields
// =============================================================================

operation!(CustomerInvoiceMetafields, customer_invoice_metafields);

pub mod customer_invoice_metafields {
    use super::{Deserialize, Serialize, common::MetafieldConnection};

    pub const OPERATION_NAME: &str = "CustomerInvoiceMetafields";
    pub const QUERY: &str = r#"
        query CustomerInvoiceMetafields($id: ID!, $first: Int!) {
            customer(id: $id) {
                id
                metafields(namespace: "invoice", first: $first) {
                    nodes { key value }
                }
            }
        }
    "#;

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub id: String,
        pub first: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub customer: Option<Customer>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Customer {
        pub id: String,
        pub metafields: MetafieldConnection,
    }
}

// =============================================================================
// Metafields set
// =============================================================================

operation!(MetafieldsSet, metafields_set);

pub mod metafields_set {
    use proforma_core::invoice::MetafieldWrite;

    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "MetafieldsSet";
    pub const QUERY: &str = r"
        mutation MetafieldsSet($metafields: [MetafieldsSetInput!]!) {
            metafieldsSet(metafields: $metafields) {
                metafields { key }
                userErrors { field message }
            }
        }
    ";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub metafields: Vec<MetafieldWrite>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafields_set: Option<MetafieldsSetPayload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldsSetPayload {
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Deserialize)]
    pub struct UserError {
        pub field: Option<Vec<String>>,
        pub message: String,
    }
}

// =============================================================================
// Proforma order
// =============================================================================

operation!(ProformaOrder, proforma_order);

pub mod proforma_order {
    use super::{
        DateTime, Deserialize, Serialize,
        common::{MailingAddress, MetafieldConnection, MetafieldValue, MoneyBag},
    };

    pub const OPERATION_NAME: &str = "ProformaOrder";
    pub const QUERY: &str = r#"
        query ProformaOrder($id: ID!, $metafieldCount: Int!, $lineItemCount: Int!, $transactionCount: Int!) {
            order(id: $id) {
                id
                name
                createdAt
                poNumber
                invoiceData: metafield(namespace: "invoice", key: "invoice_data") { value }
                requested: metafield(namespace: "invoice", key: "requested") { value }
                customer {
                    id
                    firstName
                    lastName
                    displayName
                    email
                    phone
                    defaultAddress {
                        address1 address2 city province provinceCode zip country phone
                    }
                    metafields(namespace: "invoice", first: $metafieldCount) {
                        nodes { key value }
                    }
                }
                billingAddress {
                    address1 address2 city province provinceCode zip country phone
                }
                shippingAddress {
                    address1 address2 city province provinceCode zip country phone
                }
                lineItems(first: $lineItemCount) {
                    nodes {
                        title
                        variantTitle
                        sku
                        quantity
                        originalUnitPriceSet { shopMoney { amount currencyCode } }
                        discountedUnitPriceSet { shopMoney { amount currencyCode } }
                        taxLines { ratePercentage title }
                        discountAllocations {
                            allocatedAmountSet { shopMoney { amount currencyCode } }
                            discountApplication {
                                value {
                                    __typename
                                    ... on PricingPercentageValue { percentage }
                                }
                            }
                        }
                    }
                }
                totalDiscountsSet { shopMoney { amount currencyCode } }
                subtotalPriceSet { shopMoney { amount currencyCode } }
                totalShippingPriceSet { shopMoney { amount currencyCode } }
                taxLines { ratePercentage title }
                totalTaxSet { shopMoney { amount currencyCode } }
                totalPriceSet { shopMoney { amount currencyCode } }
                paymentGatewayNames
                transactions(first: $transactionCount) {
                    formattedGateway
                    amountSet { shopMoney { amount currencyCode } }
                    status
                    createdAt
                }
            }
        }
    "#;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub id: String,
        pub metafield_count: i64,
        pub line_item_count: i64,
        pub transaction_count: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub order: Option<Order>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Order {
        pub id: String,
        pub name: Option<String>,
        pub created_at: Option<DateTime>,
        pub po_number: Option<String>,
        pub invoice_data: Option<MetafieldValue>,
        pub requested: Option<MetafieldValue>,
        pub customer: Option<Customer>,
        pub billing_address: Option<MailingAddress>,
        pub shipping_address: Option<MailingAddress>,
        pub line_items: Option<LineItemConnection>,
        pub total_discounts_set: Option<MoneyBag>,
        pub subtotal_price_set: Option<MoneyBag>,
        pub total_shipping_price_set: Option<MoneyBag>,
        #[serde(default)]
        pub tax_lines: Vec<TaxLine>,
        pub total_tax_set: Option<MoneyBag>,
        pub total_price_set: Option<MoneyBag>,
        #[serde(default)]
        pub payment_gateway_names: Vec<String>,
        #[serde(default)]
        pub transactions: Vec<Transaction>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Customer {
        pub id: String,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub display_name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub default_address: Option<MailingAddress>,
        pub metafields: MetafieldConnection,
    }

    #[derive(Debug, Deserialize)]
    pub struct LineItemConnection {
        pub nodes: Vec<LineItem>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LineItem {
        pub title: Option<String>,
        pub variant_title: Option<String>,
        pub sku: Option<String>,
        pub quantity: Option<i64>,
        pub original_unit_price_set: Option<MoneyBag>,
        pub discounted_unit_price_set: Option<MoneyBag>,
        #[serde(default)]
        pub tax_lines: Vec<TaxLine>,
        #[serde(default)]
        pub discount_allocations: Vec<DiscountAllocation>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TaxLine {
        pub rate_percentage: Option<f64>,
        pub title: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DiscountAllocation {
        pub allocated_amount_set: Option<MoneyBag>,
        pub discount_application: Option<DiscountApplication>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DiscountApplication {
        pub value: Option<PricingValue>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PricingValue {
        pub percentage: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transaction {
        pub formatted_gateway: Option<String>,
        pub amount_set: Option<MoneyBag>,
        pub status: Option<String>,
        pub created_at: Option<DateTime>,
    }
}

// =============================================================================
// Shop
// =============================================================================

operation!(ShopDetails, shop_details);

pub mod shop_details {
    use super::{
        Deserialize, Serialize,
        common::{MailingAddress, MetafieldConnection},
    };

    pub const OPERATION_NAME: &str = "ShopDetails";
    pub const QUERY: &str = r#"
        query ShopDetails($first: Int!) {
            shop {
                id
                name
                email
                myshopifyDomain
                billingAddress {
                    address1 address2 city province provinceCode zip country phone
                }
                metafields(namespace: "company", first: $first) {
                    nodes { key value }
                }
            }
        }
    "#;

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub shop: Shop,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Shop {
        pub id: String,
        pub name: String,
        pub email: Option<String>,
        pub myshopify_domain: Option<String>,
        pub billing_address: Option<MailingAddress>,
        pub metafields: MetafieldConnection,
    }
}

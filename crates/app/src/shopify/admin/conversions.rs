//! Conversions from Admin API wire types into `proforma_core` records.
//!
//! Required fields are checked here; a missing one fails the conversion
//! with [`ProjectionError::Missing`] naming it by its GraphQL path.

use proforma_core::proforma::{
    Address, CompanyDetails, CustomerRecord, DiscountAllocation, LineItemRecord, OrderRecord,
    ProjectionError, ShopRecord, TaxLine, TransactionRecord, parse_amount,
};
use proforma_core::{Annotations, CustomerId, OrderId};
use rust_decimal::Decimal;

use super::queries::{
    common::{MailingAddress, MetafieldConnection, MoneyBag},
    customer_invoice_metafields, invoice_state, proforma_order, shop_details,
};
use crate::shopify::types::InvoiceState;

/// Fallback currency when the platform omits the currency code.
const DEFAULT_CURRENCY: &str = "EUR";

pub fn convert_annotations(connection: MetafieldConnection) -> Annotations {
    connection
        .nodes
        .into_iter()
        .map(|node| (node.key, node.value))
        .collect()
}

pub fn convert_address(address: MailingAddress) -> Address {
    Address {
        address1: address.address1,
        address2: address.address2,
        city: address.city,
        province: address.province,
        province_code: address.province_code,
        zip: address.zip,
        country: address.country,
        phone: address.phone,
    }
}

fn order_id(id: &str, field: &'static str) -> Result<OrderId, ProjectionError> {
    OrderId::parse(id).map_err(|_| ProjectionError::Missing(field))
}

fn customer_id(id: &str, field: &'static str) -> Result<CustomerId, ProjectionError> {
    CustomerId::parse(id).map_err(|_| ProjectionError::Missing(field))
}

fn required_money(bag: Option<MoneyBag>, field: &'static str) -> Result<Decimal, ProjectionError> {
    let bag = bag.ok_or(ProjectionError::Missing(field))?;
    parse_amount(field, &bag.shop_money.amount)
}

fn optional_money(bag: Option<MoneyBag>, field: &'static str) -> Result<Option<Decimal>, ProjectionError> {
    bag.map(|b| parse_amount(field, &b.shop_money.amount))
        .transpose()
}

/// Money totals absent on orders without discounts or shipping read as zero.
fn money_or_zero(bag: Option<MoneyBag>, field: &'static str) -> Result<Decimal, ProjectionError> {
    Ok(optional_money(bag, field)?.unwrap_or_default())
}

fn percentage(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

fn convert_tax_line(line: proforma_order::TaxLine) -> TaxLine {
    TaxLine {
        rate_percentage: percentage(line.rate_percentage),
        title: line.title,
    }
}

impl TryFrom<invoice_state::Order> for InvoiceState {
    type Error = ProjectionError;

    fn try_from(order: invoice_state::Order) -> Result<Self, Self::Error> {
        let customer = order
            .customer
            .map(|c| {
                Ok::<_, ProjectionError>((
                    customer_id(&c.id, "order.customer.id")?,
                    convert_annotations(c.metafields),
                ))
            })
            .transpose()?;

        Ok(Self {
            order: convert_annotations(order.metafields),
            customer,
        })
    }
}

/// Annotations of the customer that was asked for; `None` when the
/// response carries another customer.
pub fn convert_customer_annotations(
    requested: CustomerId,
    customer: customer_invoice_metafields::Customer,
) -> Option<Annotations> {
    if CustomerId::parse(&customer.id).ok() != Some(requested) {
        tracing::warn!(
            requested = %requested.gid(),
            returned = %customer.id,
            "Customer metafields returned for another customer"
        );
        return None;
    }
    Some(convert_annotations(customer.metafields))
}

fn convert_customer(customer: proforma_order::Customer) -> Result<CustomerRecord, ProjectionError> {
    Ok(CustomerRecord {
        id: Some(customer_id(&customer.id, "order.customer.id")?),
        first_name: customer.first_name,
        last_name: customer.last_name,
        display_name: customer.display_name,
        email: customer.email,
        phone: customer.phone,
        default_address: customer.default_address.map(convert_address),
        annotations: convert_annotations(customer.metafields),
    })
}

fn convert_discount_allocation(
    allocation: proforma_order::DiscountAllocation,
) -> Result<DiscountAllocation, ProjectionError> {
    Ok(DiscountAllocation {
        percentage: percentage(
            allocation
                .discount_application
                .and_then(|a| a.value)
                .and_then(|v| v.percentage),
        ),
        amount: required_money(
            allocation.allocated_amount_set,
            "lineItem.discountAllocations.allocatedAmountSet",
        )?,
    })
}

impl TryFrom<proforma_order::LineItem> for LineItemRecord {
    type Error = ProjectionError;

    fn try_from(item: proforma_order::LineItem) -> Result<Self, Self::Error> {
        Ok(Self {
            title: item.title.ok_or(ProjectionError::Missing("lineItem.title"))?,
            variant_title: item.variant_title,
            sku: item.sku,
            quantity: item
                .quantity
                .ok_or(ProjectionError::Missing("lineItem.quantity"))?,
            original_unit_price: required_money(
                item.original_unit_price_set,
                "lineItem.originalUnitPriceSet",
            )?,
            discounted_unit_price: required_money(
                item.discounted_unit_price_set,
                "lineItem.discountedUnitPriceSet",
            )?,
            tax_lines: item.tax_lines.into_iter().map(convert_tax_line).collect(),
            discount_allocations: item
                .discount_allocations
                .into_iter()
                .map(convert_discount_allocation)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<proforma_order::Transaction> for TransactionRecord {
    type Error = ProjectionError;

    fn try_from(transaction: proforma_order::Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            gateway: transaction.formatted_gateway,
            amount: optional_money(transaction.amount_set, "transaction.amountSet")?,
            status: transaction.status,
            created_at: transaction.created_at,
        })
    }
}

impl TryFrom<proforma_order::Order> for OrderRecord {
    type Error = ProjectionError;

    fn try_from(order: proforma_order::Order) -> Result<Self, Self::Error> {
        let currency = order
            .total_price_set
            .as_ref()
            .and_then(|bag| bag.shop_money.currency_code.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let mut annotations = Annotations::new();
        if let Some(requested) = order.requested {
            annotations.insert(proforma_core::keys::REQUESTED, requested.value);
        }
        if let Some(invoice_data) = order.invoice_data {
            annotations.insert(proforma_core::keys::INVOICE_DATA, invoice_data.value);
        }

        Ok(Self {
            id: order_id(&order.id, "order.id")?,
            name: order.name.ok_or(ProjectionError::Missing("order.name"))?,
            created_at: order
                .created_at
                .ok_or(ProjectionError::Missing("order.createdAt"))?,
            po_number: order.po_number,
            annotations,
            customer: order.customer.map(convert_customer).transpose()?,
            billing_address: order.billing_address.map(convert_address),
            shipping_address: order.shipping_address.map(convert_address),
            line_items: order
                .line_items
                .ok_or(ProjectionError::Missing("order.lineItems"))?
                .nodes
                .into_iter()
                .map(LineItemRecord::try_from)
                .collect::<Result<_, _>>()?,
            total_discounts: money_or_zero(order.total_discounts_set, "order.totalDiscountsSet")?,
            subtotal: required_money(order.subtotal_price_set, "order.subtotalPriceSet")?,
            total_shipping: money_or_zero(
                order.total_shipping_price_set,
                "order.totalShippingPriceSet",
            )?,
            tax_lines: order.tax_lines.into_iter().map(convert_tax_line).collect(),
            total_tax: money_or_zero(order.total_tax_set, "order.totalTaxSet")?,
            total_price: required_money(order.total_price_set, "order.totalPriceSet")?,
            currency,
            payment_gateway_names: order.payment_gateway_names,
            transactions: order
                .transactions
                .into_iter()
                .map(TransactionRecord::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<shop_details::Shop> for ShopRecord {
    fn from(shop: shop_details::Shop) -> Self {
        let metafields = convert_annotations(shop.metafields);
        let company_field = |key: &str| metafields.get_non_blank(key).map(str::to_string);

        Self {
            name: shop.name,
            email: shop.email,
            myshopify_domain: shop.myshopify_domain,
            billing_address: shop.billing_address.map(convert_address),
            company: CompanyDetails {
                partita_iva: company_field("partita_iva"),
                codice_fiscale: company_field("codice_fiscale"),
                rea: company_field("rea"),
                capitale_sociale: company_field("capitale_sociale"),
                pec: company_field("pec"),
                codice_sdi: company_field("codice_sdi"),
            },
        }
    }
}

//! Proforma invoice document model.
//!
//! [`source`] defines the typed order, customer and shop records a platform
//! client must deliver; [`document`] projects them into the
//! [`ProformaDocument`] the template renders; [`format`] holds the display
//! filters.

pub mod document;
pub mod format;
pub mod source;

pub use document::{
    CustomerView, FiscalData, LineView, OrderView, ProformaDocument, SedeLegale, ShopView,
    TransactionView, line_total,
};
pub use format::{AmountError, format_address, format_date, format_money, money, payment_method};
pub use source::{
    Address, CompanyDetails, CustomerRecord, DiscountAllocation, FiscalSnapshot, LineItemRecord,
    OrderRecord, ProjectionError, ShopRecord, TaxLine, TransactionRecord, parse_amount,
};

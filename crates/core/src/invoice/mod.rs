//! Invoice request domain.
//!
//! - [`rules`] - which customer fields are mandatory per customer type
//! - [`eligibility`] - request/emission status and missing fields of an order
//! - [`request`] - the metafield payload written when invoicing is requested

pub mod eligibility;
pub mod request;
pub mod rules;

pub use eligibility::{EligibilityReport, InvoiceEligibility, MissingField, evaluate};
pub use request::{
    InvoiceRequestPayload, MetafieldWrite, ValidationError, WriteError, build_request_payload,
};
pub use rules::{CustomerType, required_fields};

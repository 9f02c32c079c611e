//! Field requirement rules per customer type.

use serde::{Deserialize, Serialize};

use crate::types::keys;

/// Fields required for a private individual.
pub const INDIVIDUAL_REQUIRED_FIELDS: &[&str] = &[keys::CODICE_FISCALE];

/// Fields required for a company, in the order they are reported.
pub const COMPANY_REQUIRED_FIELDS: &[&str] = &[
    keys::RAGIONE_SOCIALE,
    keys::PARTITA_IVA,
    keys::SEDE_LEGALE_VIA,
    keys::SEDE_LEGALE_CAP,
    keys::SEDE_LEGALE_CITTA,
    keys::SEDE_LEGALE_PROVINCIA,
];

/// Kind of customer being invoiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// Private individual, identified by codice fiscale.
    Individual,
    /// Company, identified by partita IVA and registered office.
    Company,
}

impl CustomerType {
    /// Parse the `customer_type` annotation. Matching is exact and
    /// case-sensitive; anything else is not a customer type.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "individual" => Some(Self::Individual),
            "company" => Some(Self::Company),
            _ => None,
        }
    }

    /// Annotation value for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Company => "company",
        }
    }

    /// Required fields for this type, in reporting order.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Individual => INDIVIDUAL_REQUIRED_FIELDS,
            Self::Company => COMPANY_REQUIRED_FIELDS,
        }
    }
}

/// Required fields for a raw `customer_type` value.
///
/// Returns `None` when the value is blank or not a known type; callers treat
/// that as "customer type unresolved".
#[must_use]
pub fn required_fields(customer_type: &str) -> Option<&'static [&'static str]> {
    CustomerType::parse(customer_type).map(CustomerType::required_fields)
}

/// Italian display label for a customer field key.
#[must_use]
pub fn field_label(key: &str) -> Option<&'static str> {
    let label = match key {
        keys::CUSTOMER_TYPE => "Tipo cliente",
        keys::CODICE_FISCALE => "Codice fiscale",
        keys::RAGIONE_SOCIALE => "Ragione sociale",
        keys::PARTITA_IVA => "Partita IVA",
        keys::SEDE_LEGALE_VIA => "Via sede legale",
        keys::SEDE_LEGALE_CAP => "CAP sede legale",
        keys::SEDE_LEGALE_CITTA => "Città sede legale",
        keys::SEDE_LEGALE_PROVINCIA => "Provincia sede legale",
        _ => return None,
    };
    Some(label)
}

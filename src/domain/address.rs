//! Address types produced and consumed by postal-code resolution

use serde::{Deserialize, Serialize};

/// Resolved address tuple for one postal code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub street: String,
    pub neighborhood: String,
    pub postal_code: String,
    pub municipality_code: String,
}

impl AddressInfo {
    pub fn new(
        street: impl Into<String>,
        neighborhood: impl Into<String>,
        postal_code: impl Into<String>,
        municipality_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            neighborhood: neighborhood.into(),
            postal_code: postal_code.into(),
            municipality_code: municipality_code.into(),
        }
    }
}

/// Address already stored on a production record for a postal code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnFileAddress {
    pub street: String,
    pub neighborhood: String,
    pub municipality_code: String,
}

/// Municipality entry from the local IBGE table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub name: String,
    /// Two-letter state abbreviation
    pub state: String,
}

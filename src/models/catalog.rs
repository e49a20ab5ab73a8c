use serde::{Deserialize, Serialize};

/// A product row as delivered by the catalog source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCatalogRow {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl RawCatalogRow {
    pub fn new(code: Option<&str>, name: &str) -> Self {
        Self {
            code: code.map(str::to_string),
            name: name.to_string(),
        }
    }
}

/// A catalog product usable as matching context. `code` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
}

/// A customer record from the ERP directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Internal customer reference, when the ERP has one.
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
}

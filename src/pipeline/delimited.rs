//! Deterministic parser for the semicolon-delimited order export.
//!
//! The export is a flat run of `LABEL;VALUE;` pairs. Customer identity comes
//! from the first non-empty `R. SOCIAL`, then `EMAIL`, then `TELEFONO` field.
//! Each order line is a `CANT.` / `COD. TN` / optional `COD. PROV.` /
//! `DESCRIPCION` / `PRECIO` run, matched anywhere in the text.

use std::sync::LazyLock;

use regex::Regex;

use super::ExtractionError;
use crate::models::{Confidence, OrderLine};

/// Customer labels in priority order.
const CUSTOMER_LABELS: &[&str] = &["R. SOCIAL", "EMAIL", "TELEFONO"];

static CUSTOMER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CUSTOMER_LABELS
        .iter()
        .map(|label| Regex::new(&format!(r"\b{};([^;\r\n]*)", regex::escape(label))).unwrap())
        .collect()
});

static RECORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\bCANT\.;\s*(?P<qty>\d+(?:[.,]\d+)?)\s*;\s*",
        r"COD\. TN;(?P<code>[^;\r\n]+);\s*",
        r"(?:COD\. PROV\.;[^;\r\n]*;\s*)?",
        r"DESCRIPCION;(?P<desc>[^;\r\n]+);\s*",
        r"PRECIO;\s*(?P<price>\d+)",
    ))
    .unwrap()
});

/// Customer identity plus the order lines of one delimited document.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedOrder {
    pub customer: String,
    pub lines: Vec<OrderLine>,
}

/// True when the text contains at least one delimited order record.
pub fn looks_delimited(text: &str) -> bool {
    RECORD_PATTERN.is_match(text)
}

/// Parse a delimited export into order lines.
///
/// Every record is `Confidence::High` and carries the document-wide customer.
/// Zero records is `ExtractionError::FormatMismatch`, never an empty order.
pub fn parse_delimited_order(text: &str) -> Result<DelimitedOrder, ExtractionError> {
    let customer = resolve_customer(text);

    let lines: Vec<OrderLine> = RECORD_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let quantity = caps["qty"].replace(',', ".").parse::<f64>().ok()?;
            let price = caps["price"].parse::<f64>().ok()?;
            let code = caps["code"].trim();
            let product_name = caps["desc"].trim();
            if quantity <= 0.0 || code.is_empty() || product_name.is_empty() {
                tracing::debug!("Skipping delimited record without quantity, code or description");
                return None;
            }
            Some(OrderLine {
                customer: customer.clone(),
                code: code.to_string(),
                product_name: product_name.to_string(),
                quantity,
                price: Some(price),
                confidence: Confidence::High,
                note: None,
            })
        })
        .collect();

    if lines.is_empty() {
        return Err(ExtractionError::FormatMismatch);
    }

    tracing::debug!(lines = lines.len(), has_customer = !customer.is_empty(), "Parsed delimited order");
    Ok(DelimitedOrder { customer, lines })
}

/// First non-empty customer field by label priority, wherever it appears.
fn resolve_customer(text: &str) -> String {
    CUSTOMER_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(text))
        .map(|caps| caps[1].trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

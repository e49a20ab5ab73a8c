use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::Confidence;

/// One normalized product request extracted from an order.
///
/// With `Confidence::High` the `code` is a verbatim catalog code. With
/// `Confidence::Low` it may be the original mention text instead.
///
/// Deserialization tolerates the loose values assistants emit: `null`
/// customer, numbers as strings, and confidence tiers in any case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub customer: String,
    pub code: String,
    #[serde(alias = "product_name")]
    pub product_name: String,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: Confidence,
    #[serde(default)]
    pub note: Option<String>,
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `3`, `2.5`, `"3"` and `"1,5"`.
fn flexible_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    flexible_number(&value)
        .ok_or_else(|| de::Error::custom(format!("quantity is not a number: {value}")))
}

/// Unreadable prices become `None`; the line is still usable without one.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(flexible_number(&value))
}

/// Case-insensitive tier; unknown or missing tiers fall back to `Low`.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<Confidence, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().to_ascii_lowercase().parse().ok())
        .unwrap_or_default())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A human-confirmed mapping from an ambiguous mention to a catalog product.
///
/// `original_text` is the identity key: the memory never holds two entries
/// with the same value (exact, case-sensitive comparison).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub original_text: String,
    pub corrected_code: String,
    pub corrected_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Correction {
    pub fn new(original_text: &str, corrected_code: &str, corrected_name: &str) -> Self {
        Self {
            original_text: original_text.to_string(),
            corrected_code: corrected_code.to_string(),
            corrected_name: corrected_name.to_string(),
            recorded_at: None,
        }
    }

    /// Render as a single example line for the extraction context.
    pub fn example_line(&self) -> String {
        format!(
            "\"{}\" → {} ({})",
            self.original_text, self.corrected_code, self.corrected_name
        )
    }
}

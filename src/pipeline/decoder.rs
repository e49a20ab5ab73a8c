//! Recover the JSON array of order rows from an assistant reply.
//!
//! Replies are supposed to be a bare JSON array but arrive wrapped in code
//! fences or surrounded by prose often enough that a strict parse is not
//! viable. Decoding is structural only: rows are returned as raw JSON values.

use serde_json::Value;
use thiserror::Error;

use crate::models::OrderLine;

/// Characters of cleaned reply text quoted in a decode error.
pub const DECODE_EXCERPT_CHARS: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no JSON array found in assistant reply; reply begins: {excerpt}")]
pub struct DecodeError {
    pub excerpt: String,
}

/// Decode an assistant reply into raw row values.
///
/// 1. Remove code-fence markers.
/// 2. Parse the trimmed text as a JSON array.
/// 3. Otherwise parse the span from the first `[` to the last `]`.
pub fn decode_reply(raw: &str) -> Result<Vec<Value>, DecodeError> {
    let cleaned = strip_code_fences(raw);
    let trimmed = cleaned.trim();

    if let Ok(rows) = serde_json::from_str::<Vec<Value>>(trimmed) {
        return Ok(rows);
    }

    if let Some(span) = outermost_bracket_span(trimmed) {
        if let Ok(rows) = serde_json::from_str::<Vec<Value>>(span) {
            tracing::debug!(rows = rows.len(), "Recovered JSON array from noisy reply");
            return Ok(rows);
        }
    }

    Err(DecodeError {
        excerpt: trimmed.chars().take(DECODE_EXCERPT_CHARS).collect(),
    })
}

/// Decode a reply and convert its rows into order lines.
pub fn decode_order_lines(raw: &str) -> Result<Vec<OrderLine>, DecodeError> {
    let rows = decode_reply(raw)?;
    Ok(rows_to_order_lines(&rows))
}

/// Convert rows leniently: rows that do not fit the order-line shape are skipped.
pub fn rows_to_order_lines(rows: &[Value]) -> Vec<OrderLine> {
    let lines: Vec<OrderLine> = rows
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect();

    let skipped = rows.len() - lines.len();
    if skipped > 0 {
        tracing::warn!(skipped, total = rows.len(), "Skipped assistant rows not shaped like order lines");
    }
    lines
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```JSON", "").replace("```", "")
}

/// Greedy span from the first `[` to the last `]`, if both exist in order.
fn outermost_bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

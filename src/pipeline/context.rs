use crate::models::{CatalogEntry, Correction};

/// Catalog entries included in a context, in catalog order.
pub const MAX_CONTEXT_CATALOG_ENTRIES: usize = 1200;

/// Most recent corrections included in a context.
pub const MAX_CONTEXT_CORRECTIONS: usize = 50;

pub const EXTRACTION_PREAMBLE: &str = r#"You are an order-intake assistant for a wholesale goods distributor.
Your ONLY role is to turn a customer's order into order lines matched against
the product catalog listed below.

RULES:
1. Reply with a JSON array and nothing else. No prose, no Markdown.
2. Each element has exactly these keys:
   {"customer": string, "code": string, "productName": string,
    "quantity": number, "price": number or null,
    "confidence": "high" | "medium" | "low", "note": string or null}
3. "high" only when the code is copied verbatim from the catalog.
   "medium" when the match is likely but not certain.
   "low" when no catalog product fits; then put the customer's own wording in "code".
4. A mention with slash-separated variants (e.g. "F91W negro/plata") is one
   line per variant, each matched to its own catalog code.
5. Quantities must be positive. Use null for a price that is not stated.
6. Use "note" to explain any doubt; otherwise null.
"#;

/// Task instruction sent with a free-text order.
pub const TEXT_TASK_INSTRUCTION: &str =
    "Extract every order line from the following order text. Reply with the JSON array only.";

/// Task instruction sent with a photographed order.
pub const IMAGE_TASK_INSTRUCTION: &str =
    "Extract every order line from the order in this image. Reply with the JSON array only.";

/// Build the extraction context handed to the assistant.
///
/// Preamble, then one `code|name` line per catalog entry (first
/// `MAX_CONTEXT_CATALOG_ENTRIES`, not re-sorted), then a block of past
/// corrections when there are any (newest `MAX_CONTEXT_CORRECTIONS`).
pub fn build_extraction_context(catalog: &[CatalogEntry], corrections: &[Correction]) -> String {
    let mut context = String::with_capacity(EXTRACTION_PREAMBLE.len() + catalog.len() * 48);
    context.push_str(EXTRACTION_PREAMBLE);

    context.push_str("\nCATALOG (code|name):\n");
    for entry in catalog.iter().take(MAX_CONTEXT_CATALOG_ENTRIES) {
        context.push_str(&entry.code);
        context.push('|');
        context.push_str(&entry.name);
        context.push('\n');
    }

    if !corrections.is_empty() {
        let start = corrections.len().saturating_sub(MAX_CONTEXT_CORRECTIONS);
        context.push_str("\nPAST CORRECTIONS (customer wording → correct product):\n");
        for correction in &corrections[start..] {
            context.push_str(&correction.example_line());
            context.push('\n');
        }
    }

    context
}

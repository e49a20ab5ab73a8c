use crate::models::{CatalogEntry, RawCatalogRow};

/// Normalize raw catalog rows into matching context.
///
/// Codes are trimmed; rows whose code is missing or blank are dropped.
/// Input order is preserved.
pub fn normalize_catalog(rows: &[RawCatalogRow]) -> Vec<CatalogEntry> {
    rows.iter()
        .filter_map(|row| {
            let code = row.code.as_deref().unwrap_or("").trim();
            if code.is_empty() {
                return None;
            }
            Some(CatalogEntry {
                code: code.to_string(),
                name: row.name.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_and_missing_codes() {
        let rows = vec![
            RawCatalogRow::new(Some("A-1"), "Alpha"),
            RawCatalogRow::new(None, "No code"),
            RawCatalogRow::new(Some("   "), "Blank code"),
            RawCatalogRow::new(Some(""), "Empty code"),
            RawCatalogRow::new(Some("B-2"), "Beta"),
        ];
        let entries = normalize_catalog(&rows);
        let codes: Vec<&str> = entries.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["A-1", "B-2"]);
    }

    #[test]
    fn trims_codes_but_keeps_names() {
        let rows = vec![RawCatalogRow::new(Some("  CS-F91W1U \n"), " Reloj digital ")];
        let entries = normalize_catalog(&rows);
        assert_eq!(entries[0].code, "CS-F91W1U");
        assert_eq!(entries[0].name, " Reloj digital ");
    }

    #[test]
    fn preserves_input_order() {
        let rows = vec![
            RawCatalogRow::new(Some("Z"), "last alphabetically"),
            RawCatalogRow::new(Some("A"), "first alphabetically"),
        ];
        let entries = normalize_catalog(&rows);
        assert_eq!(entries[0].code, "Z");
        assert_eq!(entries[1].code, "A");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize_catalog(&[]).is_empty());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use phieu_core::{ExtractedRecord, MaterialRow, MATERIAL_HEADER};

use crate::arith::fold_cell;

// ── JSON mode ─────────────────────────────────────────────────────────────────

/// Outcome of parsing a JSON-mode response.
///
/// A malformed payload is recovered locally: the caller gets the error
/// description and the untouched raw text for diagnostics instead of a
/// propagated failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordsPayload {
    Records(Vec<ExtractedRecord>),
    Malformed { error: String, raw_text: String },
}

impl RecordsPayload {
    pub fn is_malformed(&self) -> bool {
        matches!(self, RecordsPayload::Malformed { .. })
    }

    /// The parsed records, or an empty sequence on a malformed payload.
    pub fn into_records(self) -> Vec<ExtractedRecord> {
        match self {
            RecordsPayload::Records(records) => records,
            RecordsPayload::Malformed { .. } => Vec::new(),
        }
    }
}

/// Parse the model's JSON-mode output: a JSON array of records, or a
/// single record object, possibly wrapped in markdown code fences.
pub fn parse_records(raw: &str) -> RecordsPayload {
    let clean = strip_fences(raw, "json");

    let value: Value = match serde_json::from_str(&clean) {
        Ok(v) => v,
        Err(e) => {
            return RecordsPayload::Malformed {
                error: format!("Failed to parse JSON: {e}"),
                raw_text: raw.to_string(),
            }
        }
    };

    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return RecordsPayload::Malformed {
                error: format!("Expected a JSON array or object, got {}", kind_of(&other)),
                raw_text: raw.to_string(),
            }
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<ExtractedRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                return RecordsPayload::Malformed {
                    error: format!("Malformed record in payload: {e}"),
                    raw_text: raw.to_string(),
                }
            }
        }
    }

    RecordsPayload::Records(records)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Remove markdown fence markers (```` ```<tag> ```` and ```` ``` ````)
/// anywhere in the text, then trim.
fn strip_fences(raw: &str, lang_tag: &str) -> String {
    raw.replace(&format!("```{lang_tag}"), "")
        .replace("```", "")
        .trim()
        .to_string()
}

// ── Tabular mode ──────────────────────────────────────────────────────────────

/// Column layout of a pipe-delimited table.
///
/// A candidate line must carry at least `columns - 1` pipe characters to
/// count as a table row; cells under the named arithmetic columns are
/// folded with [`fold_cell`]. The default is the 8-column material list
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableLayout {
    pub columns: usize,
    pub arithmetic_columns: Vec<String>,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            columns: MATERIAL_HEADER.len(),
            arithmetic_columns: vec!["Định mức".to_string(), "Thực lĩnh".to_string()],
        }
    }
}

impl TableLayout {
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))
    }

    fn min_pipes(&self) -> usize {
        self.columns.saturating_sub(1)
    }
}

/// Parse the model's tabular output into rows keyed by its own header
/// line. Non-table commentary and `---` separator lines are dropped; an
/// input with no surviving table lines yields an empty sequence.
pub fn parse_material_table(raw: &str, layout: &TableLayout) -> Vec<MaterialRow> {
    let clean = strip_fences(raw, "csv");

    let lines: Vec<&str> = clean
        .lines()
        .map(str::trim)
        .filter(|line| line.matches('|').count() >= layout.min_pipes() && !line.contains("---"))
        .collect();

    let Some((header_line, data_lines)) = lines.split_first() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_line.split('|').map(|h| h.trim().to_string()).collect();

    data_lines
        .iter()
        .map(|line| {
            let mut cells: Vec<String> =
                line.split('|').map(|c| c.trim().to_string()).collect();
            // Short rows pad on the right, long rows drop the extras.
            cells.resize(headers.len(), String::new());

            let mut row: MaterialRow = headers.iter().cloned().zip(cells).collect();
            for column in &layout.arithmetic_columns {
                if let Some(cell) = row.get_mut(column) {
                    *cell = fold_cell(cell).into_string();
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phieu_core::{OrderNumbers, Scalar};

    // ── JSON mode ─────────────────────────────────────────────────────────────

    #[test]
    fn parses_fenced_array() {
        let raw = "```json\n[{\"description\": \"Tôn TU\", \"quantity\": 3}]\n```";
        let RecordsPayload::Records(records) = parse_records(raw) else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, Some(Scalar::from("Tôn TU")));
        assert_eq!(records[0].quantity, Some(Scalar::Int(3)));
    }

    #[test]
    fn wraps_single_object_into_one_record() {
        let RecordsPayload::Records(records) =
            parse_records(r#"{"description": "Dây Teflon"}"#)
        else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn malformed_json_carries_raw_text() {
        let raw = "sorry, I could not read the document";
        match parse_records(raw) {
            RecordsPayload::Malformed { error, raw_text } => {
                assert!(error.starts_with("Failed to parse JSON"));
                assert_eq!(raw_text, raw);
            }
            RecordsPayload::Records(_) => panic!("expected malformed"),
        }
    }

    #[test]
    fn bare_scalar_payload_is_malformed() {
        assert!(parse_records("42").is_malformed());
        assert!(parse_records("\"just a string\"").is_malformed());
    }

    #[test]
    fn non_object_array_element_is_malformed() {
        assert!(parse_records(r#"[{"id": 1}, "stray"]"#).is_malformed());
    }

    #[test]
    fn into_records_on_malformed_is_empty() {
        assert!(parse_records("not json").into_records().is_empty());
    }

    #[test]
    fn parses_order_numbers_sequence() {
        let raw = r#"[{"order_numbers": ["25B827", "25B828"], "quantity": 2}]"#;
        let records = parse_records(raw).into_records();
        assert_eq!(
            records[0].order_numbers,
            Some(OrderNumbers::from(["25B827", "25B828"]))
        );
    }

    // ── Tabular mode ──────────────────────────────────────────────────────────

    fn material(raw: &str) -> Vec<MaterialRow> {
        parse_material_table(raw, &TableLayout::default())
    }

    #[test]
    fn parses_header_and_rows() {
        let raw = "STT|Tên vật tư|Quy cách|ĐVT|Định mức|Thực lĩnh|Chênh lệch|Ghi chú\n\
                   1|Tôn TU|45 x 0.27|Kg|20.5|20.5||\n\
                   2|Dây Teflon|2.5mm2|m|10|14||";
        let rows = material(raw);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Tên vật tư"], "Tôn TU");
        assert_eq!(rows[1]["Thực lĩnh"], "14");
    }

    #[test]
    fn short_row_pads_missing_cells() {
        // Header is wider than the row; the missing cells pad as empty.
        let raw = "STT|Tên|Spec|ĐVT|Rated|Actual|Diff|Note|Extra1|Extra2\n\
                   1|Tôn TU|45 x 0.27|Kg|20.5|20.5||";
        let rows = material(raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Rated"], "20.5");
        assert_eq!(rows[0]["Extra1"], "");
        assert_eq!(rows[0]["Extra2"], "");
    }

    #[test]
    fn row_below_pipe_threshold_is_dropped() {
        // Fewer than (columns - 1) pipes means the line is not a table row.
        let raw = "STT|Tên|Spec|ĐVT|Rated|Actual|Diff|Note\n1|Tôn TU|45 x 0.27|Kg|20.5";
        let rows = material(raw);
        assert!(rows.is_empty());
    }

    #[test]
    fn long_row_truncates_extra_cells() {
        let raw = "STT|Tên|Spec|ĐVT|Rated|Actual|Diff|Note\n1|a|b|c|d|e|f|g|EXTRA";
        let rows = material(raw);
        assert_eq!(rows[0].len(), 8);
        assert_eq!(rows[0]["Note"], "g");
    }

    #[test]
    fn separator_lines_are_excluded() {
        let raw = "STT|Tên|Spec|ĐVT|Rated|Actual|Diff|Note\n\
                   ---|---|---|---|---|---|---|---\n\
                   1|Tôn TU|||||| ";
        let rows = material(raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["STT"], "1");
    }

    #[test]
    fn commentary_lines_are_excluded() {
        let raw = "Here is the converted table:\n\
                   STT|Tên|Spec|ĐVT|Định mức|Thực lĩnh|Diff|Note\n\
                   1|Tôn TU|45|Kg|20.5|20.5||\n\
                   Let me know if you need anything else.";
        let rows = material(raw);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn no_surviving_lines_yields_empty() {
        assert!(material("no table here at all").is_empty());
        assert!(material("").is_empty());
    }

    #[test]
    fn arithmetic_applied_to_designated_columns_only() {
        let raw = "STT|Tên|Spec|ĐVT|Định mức|Thực lĩnh|Chênh lệch|Ghi chú\n\
                   1|Item|1+1|Kg|1+1|2 + 1|1+1|note";
        let rows = material(raw);
        assert_eq!(rows[0]["Định mức"], "2");
        assert_eq!(rows[0]["Thực lĩnh"], "3");
        // Non-designated columns keep the raw expression.
        assert_eq!(rows[0]["Spec"], "1+1");
        assert_eq!(rows[0]["Chênh lệch"], "1+1");
    }

    #[test]
    fn annotation_noise_cleaned_in_designated_columns() {
        let raw = "STT|Tên|Spec|ĐVT|Định mức|Thực lĩnh|Chênh lệch|Ghi chú\n\
                   1|Item||Kg|20.5|1v||";
        let rows = material(raw);
        assert_eq!(rows[0]["Thực lĩnh"], "1");
    }

    #[test]
    fn fenced_csv_is_unwrapped() {
        let raw = "```csv\nSTT|Tên|Spec|ĐVT|Rated|Actual|Diff|Note\n1|Tôn TU||||||\n```";
        assert_eq!(material(raw).len(), 1);
    }

    #[test]
    fn preserved_empty_rows_survive() {
        // Rows with only an STT and empty cells are intentionally kept.
        let raw = "STT|Tên|Spec|ĐVT|Rated|Actual|Diff|Note\n5|||||||\n6|||||||";
        let rows = material(raw);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["STT"], "5");
        assert_eq!(rows[1]["STT"], "6");
    }

    #[test]
    fn custom_layout_from_toml() {
        let layout = TableLayout::from_toml(
            "columns = 3\narithmetic_columns = [\"Qty\"]\n",
        )
        .unwrap();
        let rows = parse_material_table("A|B|Qty\n1|x|1+2", &layout);
        assert_eq!(rows[0]["Qty"], "3");
    }
}

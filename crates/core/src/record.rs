use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// Column names of the material list table, in print order.
pub const MATERIAL_HEADER: [&str; 8] = [
    "STT",
    "Tên vật tư",
    "Quy cách",
    "ĐVT",
    "Định mức",
    "Thực lĩnh",
    "Chênh lệch",
    "Ghi chú",
];

/// A material-list row keyed by the table's own header line. Values are
/// plain strings after arithmetic normalization; key order is the print
/// order of the source columns.
pub type MaterialRow = IndexMap<String, String>;

/// The serial/order codes printed inside a row's description cell.
///
/// The model normally emits an array, but a lone code occasionally
/// arrives as a bare value; both shapes are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OrderNumbers {
    Codes(Vec<Scalar>),
    Single(Scalar),
}

impl OrderNumbers {
    /// Collapse to the single-string form used on normalized rows: one
    /// code as-is, or the comma-and-space join of a sequence.
    pub fn collapsed(&self) -> String {
        match self {
            OrderNumbers::Codes(codes) => codes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            OrderNumbers::Single(code) => code.to_string(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for OrderNumbers {
    fn from(codes: [&str; N]) -> Self {
        OrderNumbers::Codes(codes.iter().map(|c| Scalar::from(*c)).collect())
    }
}

/// One row as extracted by the recognition model from an invoice or
/// warehouse slip.
///
/// Which fields are present depends on the document kind and on the
/// quantity-column schema the caller requested: either a single
/// `quantity`, or the `quantity_doc` / `quantity_actual` pair found on
/// two-column warehouse forms. JSON `null` and an absent key are both
/// treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_doc: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_actual: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unitprice: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totalprice: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_numbers: Option<OrderNumbers>,
}

/// Flattener output: exactly one physical line item per row, with the
/// order code collapsed to a single string (possibly empty).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_doc: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_actual: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unitprice: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totalprice: Option<Scalar>,
    pub order_numbers: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_split_quantity_schema() {
        let r: ExtractedRecord = serde_json::from_value(json!({
            "doc_type": "Export",
            "date": "14/07/2022",
            "description": "MBA 560KVA - 22/0,4KV",
            "order_numbers": ["25B834", "25B835"],
            "quantity_doc": null,
            "quantity_actual": 10
        }))
        .unwrap();

        assert_eq!(r.quantity_doc, None); // null collapses to absent
        assert_eq!(r.quantity_actual, Some(Scalar::Int(10)));
        assert_eq!(r.order_numbers, Some(OrderNumbers::from(["25B834", "25B835"])));
    }

    #[test]
    fn deserialize_tolerates_bare_order_code() {
        let r: ExtractedRecord =
            serde_json::from_value(json!({ "order_numbers": "25B827" })).unwrap();
        assert_eq!(
            r.order_numbers,
            Some(OrderNumbers::Single(Scalar::from("25B827")))
        );
    }

    #[test]
    fn deserialize_tolerates_numeric_id() {
        let r: ExtractedRecord = serde_json::from_value(json!({ "id": 123 })).unwrap();
        assert_eq!(r.id, Some(Scalar::Int(123)));
    }

    #[test]
    fn deserialize_ignores_unknown_keys() {
        let r: ExtractedRecord =
            serde_json::from_value(json!({ "description": "Tôn TU", "confidence": 0.9 }))
                .unwrap();
        assert_eq!(r.description, Some(Scalar::from("Tôn TU")));
    }

    #[test]
    fn serialize_omits_absent_fields() {
        let row = NormalizedRow {
            description: Some(Scalar::from("Tôn TU")),
            order_numbers: "25B827".to_string(),
            ..NormalizedRow::default()
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(
            v,
            json!({ "description": "Tôn TU", "order_numbers": "25B827" })
        );
    }

    #[test]
    fn collapsed_joins_codes_with_comma_space() {
        let codes = OrderNumbers::from(["25B827", "25B828", "25B621"]);
        assert_eq!(codes.collapsed(), "25B827, 25B828, 25B621");
        assert_eq!(OrderNumbers::Codes(vec![]).collapsed(), "");
        assert_eq!(OrderNumbers::Single(Scalar::Int(828)).collapsed(), "828");
    }
}

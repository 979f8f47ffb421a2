use serde::{Deserialize, Serialize};

use phieu_core::ExtractedRecord;

/// Rule table for detecting rows the recognition model captured from a
/// table header, column index marker, or section label instead of real
/// data.
///
/// The matching policy is data rather than control flow: the built-in
/// table covers the standard warehouse form, and site-specific tables can
/// be loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoiseRuleSet {
    /// Section/index markers, matched exactly (after uppercasing).
    pub index_markers: Vec<String>,
    /// Column-header fragments, matched as substrings (after uppercasing).
    pub header_phrases: Vec<String>,
}

impl Default for NoiseRuleSet {
    fn default() -> Self {
        Self {
            index_markers: vec!["B".into(), "C".into(), "D".into()],
            header_phrases: vec![
                "TÊN, NHÃN HIỆU".into(),
                "NHÃN HIỆU, QUY CÁCH".into(),
                "PHẨM CHẤT VẬT TƯ".into(),
                "SẢN PHẨM, HÀNG HÓA".into(),
                "TÊN VẬT TƯ".into(),
            ],
        }
    }
}

impl NoiseRuleSet {
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))
    }

    /// Whether a description cell is a leaked header or index marker.
    pub fn is_noise(&self, description: &str) -> bool {
        let desc = description.trim().to_uppercase();
        self.index_markers.iter().any(|marker| desc == *marker)
            || self
                .header_phrases
                .iter()
                .any(|phrase| desc.contains(phrase.as_str()))
    }

    /// Drop noise records from a JSON-mode batch, keeping the rest in
    /// order. Records without a description always pass.
    pub fn retain(&self, records: Vec<ExtractedRecord>) -> Vec<ExtractedRecord> {
        records
            .into_iter()
            .filter(|record| !self.matches_record(record))
            .collect()
    }

    fn matches_record(&self, record: &ExtractedRecord) -> bool {
        record
            .description
            .as_ref()
            .is_some_and(|d| self.is_noise(&d.to_string()))
    }
}

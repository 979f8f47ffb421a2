use phieu_core::{MaterialRow, NormalizedRow};

use crate::flatten;
use crate::noise::NoiseRuleSet;
use crate::recognizer::{RecognizeError, RecognizerBackend};
use crate::response::{self, RecordsPayload, TableLayout};

/// A recorded failure for one page of a multi-page source.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFailure {
    /// 1-based page number within the source document.
    pub page: usize,
    pub message: String,
    /// The raw model text, when the failure happened after recognition.
    pub raw_text: Option<String>,
}

/// Aggregate outcome of a multi-page run. Every page that parsed
/// contributes its rows in page order; every page that failed contributes
/// an error entry. A fully failed run has no rows and one failure per
/// page.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub rows: Vec<NormalizedRow>,
    pub page_failures: Vec<PageFailure>,
}

/// Drives recognition page by page and funnels each raw response through
/// parse → noise filter → flatten.
pub struct DocumentPipeline<R: RecognizerBackend> {
    recognizer: R,
    noise: NoiseRuleSet,
    layout: TableLayout,
}

impl<R: RecognizerBackend> DocumentPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            noise: NoiseRuleSet::default(),
            layout: TableLayout::default(),
        }
    }

    pub fn with_rules(recognizer: R, noise: NoiseRuleSet, layout: TableLayout) -> Self {
        Self { recognizer, noise, layout }
    }

    /// Process a multi-page document in page order. A failing page is
    /// recorded and skipped; surviving pages still contribute their rows.
    pub fn process_pages(&self, pages: &[Vec<u8>]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (index, page) in pages.iter().enumerate() {
            let page_no = index + 1;

            let raw = match self.recognizer.recognize(page) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(page = page_no, error = %e, "page recognition failed");
                    outcome.page_failures.push(PageFailure {
                        page: page_no,
                        message: e.to_string(),
                        raw_text: None,
                    });
                    continue;
                }
            };

            match response::parse_records(&raw) {
                RecordsPayload::Records(records) => {
                    let kept = self.noise.retain(records);
                    let rows = flatten::flatten_records(kept);
                    tracing::debug!(page = page_no, rows = rows.len(), "page normalized");
                    outcome.rows.extend(rows);
                }
                RecordsPayload::Malformed { error, raw_text } => {
                    tracing::warn!(page = page_no, error = %error, "page payload malformed");
                    outcome.page_failures.push(PageFailure {
                        page: page_no,
                        message: error,
                        raw_text: Some(raw_text),
                    });
                }
            }
        }

        outcome
    }

    /// Material lists go to the model as one document, not page by page,
    /// so a backend failure here is the caller's to surface.
    pub fn process_material(&self, document: &[u8]) -> Result<Vec<MaterialRow>, RecognizeError> {
        let raw = self.recognizer.recognize(document)?;
        Ok(response::parse_material_table(&raw, &self.layout))
    }
}

pub mod arith;
pub mod flatten;
pub mod noise;
pub mod pipeline;
pub mod recognizer;
pub mod response;

pub use arith::{fold_cell, CellFold};
pub use flatten::{flatten_record, flatten_records};
pub use noise::NoiseRuleSet;
pub use pipeline::{BatchOutcome, DocumentPipeline, PageFailure};
pub use recognizer::{MockRecognizer, RecognizeError, RecognizerBackend};
pub use response::{parse_material_table, parse_records, RecordsPayload, TableLayout};

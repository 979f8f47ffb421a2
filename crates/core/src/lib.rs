pub mod record;
pub mod scalar;

pub use record::{ExtractedRecord, MaterialRow, NormalizedRow, OrderNumbers, MATERIAL_HEADER};
pub use scalar::Scalar;

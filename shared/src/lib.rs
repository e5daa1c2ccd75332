pub mod models;
pub mod utils;

// Models and helpers shared by the remittance engine and any front-end that
// feeds it rows (upload screens, batch jobs). Nothing in here does I/O.

pub use models::{FieldValue, InputRow, OriginatorConfig, RecordKind, RECORD_LENGTH};

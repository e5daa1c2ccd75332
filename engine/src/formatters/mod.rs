// Field formatters: each turns a raw cell into its fixed-width CNAB text.
// None of them can fail. Malformed input degrades to the field's fill value
// (spaces for text, zeros for everything else) so one dirty cell never costs a row.
pub mod date;
pub mod money;
pub mod numeric;
pub mod text;

pub use date::{format_date, parse_date, DATE_WIDTH};
pub use money::format_money;
pub use numeric::format_numeric;
pub use text::{clean_text, format_text};

use cnab_shared::FieldValue;

// Absent values and empty strings are the same thing to every formatter.
fn raw_value(value: Option<&FieldValue>) -> Option<&FieldValue> {
    value.filter(|v| !v.is_blank())
}

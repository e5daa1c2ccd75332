use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every CNAB 444 record, whatever its kind, is exactly this many characters.
pub const RECORD_LENGTH: usize = 444;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Header,
    Detail,
    Trailer,
}

impl RecordKind {
    /// Byte written at position 001 of the record.
    pub fn leading_byte(self) -> u8 {
        match self {
            RecordKind::Header => b'0',
            RecordKind::Detail => b'1',
            RecordKind::Trailer => b'9',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Header => "header",
            RecordKind::Detail => "detail",
            RecordKind::Trailer => "trailer",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw cell value as handed over by the ingestion side.
///
/// Spreadsheet exports mostly produce `Text`; programmatic callers may pass
/// typed values. An empty `Text` means the same thing as a missing value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// Returns the value only when it carries something (not absent, not "").
pub fn present(value: &Option<FieldValue>) -> Option<&FieldValue> {
    value.as_ref().filter(|v| !v.is_blank())
}

/// One receivable (installment) to be remitted. Never mutated by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputRow {
    /// Originator's own reference ("seu número").
    pub reference: Option<FieldValue>,
    pub due_date: Option<FieldValue>,
    /// Due date moved to the next business day; preferred over `due_date`.
    pub adjusted_due_date: Option<FieldValue>,
    pub issue_date: Option<FieldValue>,
    pub face_value: Option<FieldValue>,
    pub debtor_tax_id: Option<FieldValue>,
    pub debtor_name: Option<FieldValue>,

    pub co_obligation: Option<FieldValue>,
    pub present_value: Option<FieldValue>,
    pub acquisition_value: Option<FieldValue>,
    pub assignor_name: Option<FieldValue>,
    pub assignor_tax_id: Option<FieldValue>,
    pub document_number: Option<FieldValue>,
    pub reference_date: Option<FieldValue>,
    /// Bank-assigned identifier ("nosso número").
    pub our_number: Option<FieldValue>,
}

impl InputRow {
    pub fn preferred_due_date(&self) -> Option<&FieldValue> {
        present(&self.adjusted_due_date).or_else(|| present(&self.due_date))
    }
}

/// Originator and bank identity, supplied once per generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OriginatorConfig {
    pub code: String,
    pub name: String,
    pub bank_number: String,
    pub bank_name: String,
}

impl Default for OriginatorConfig {
    fn default() -> Self {
        OriginatorConfig {
            code: String::new(),
            name: String::new(),
            bank_number: "611".to_string(),
            bank_name: "PAULISTA S.A.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjusted_due_date_wins() {
        let row = InputRow {
            due_date: Some("2025-12-30".into()),
            adjusted_due_date: Some("2025-12-31".into()),
            ..Default::default()
        };
        assert_eq!(row.preferred_due_date(), Some(&FieldValue::text("2025-12-31")));
    }

    #[test]
    fn test_blank_adjusted_due_date_falls_back() {
        let row = InputRow {
            due_date: Some("2025-12-30".into()),
            adjusted_due_date: Some("".into()),
            ..Default::default()
        };
        assert_eq!(row.preferred_due_date(), Some(&FieldValue::text("2025-12-30")));
    }

    #[test]
    fn test_leading_bytes() {
        assert_eq!(RecordKind::Header.leading_byte(), b'0');
        assert_eq!(RecordKind::Detail.leading_byte(), b'1');
        assert_eq!(RecordKind::Trailer.leading_byte(), b'9');
    }

    #[test]
    fn test_originator_config_from_partial_json() {
        let cfg: OriginatorConfig =
            serde_json::from_str(r#"{"code": "123", "name": "ACME"}"#).unwrap();
        assert_eq!(cfg.code, "123");
        assert_eq!(cfg.bank_number, "611");
        assert_eq!(cfg.bank_name, "PAULISTA S.A.");
    }
}

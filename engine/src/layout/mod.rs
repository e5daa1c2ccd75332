// Declarative record layouts.
//
// A RecordLayout is an ordered list of FieldSpecs, each naming a byte
// range, a formatter and where its value comes from. Encoding a record means
// starting from a buffer filled with the layout's fill byte and writing every
// formatted field into its range; nothing else knows about positions.

pub mod record;
pub mod source;
pub mod versions;

pub use record::{Record, RecordBuffer};
pub use source::{
    co_obligation_code, tax_id_type, DetailSource, FieldKey, HeaderSource, RecordSource,
    TrailerSource,
};
pub use versions::{LayoutDefaults, LayoutSet, LayoutVersion};

use crate::formatters::{format_date, format_money, format_numeric, format_text, DATE_WIDTH};
use cnab_shared::{FieldValue, RecordKind, RECORD_LENGTH};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Numeric,
    Money,
    Date,
    /// Written verbatim, left-justified and space-padded.
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Field(FieldKey),
    Constant(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Zero-based; position 001 of the bank manuals is offset 0.
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
    pub source: Source,
}

impl FieldSpec {
    pub fn new(offset: usize, width: usize, kind: FieldKind, source: Source) -> Self {
        FieldSpec { offset, width, kind, source }
    }

    pub fn text(offset: usize, width: usize, key: FieldKey) -> Self {
        Self::new(offset, width, FieldKind::Text, Source::Field(key))
    }

    pub fn numeric(offset: usize, width: usize, key: FieldKey) -> Self {
        Self::new(offset, width, FieldKind::Numeric, Source::Field(key))
    }

    pub fn money(offset: usize, width: usize, key: FieldKey) -> Self {
        Self::new(offset, width, FieldKind::Money, Source::Field(key))
    }

    pub fn date(offset: usize, key: FieldKey) -> Self {
        Self::new(offset, DATE_WIDTH, FieldKind::Date, Source::Field(key))
    }

    /// A constant exactly as wide as its text.
    pub fn literal(offset: usize, value: &str) -> Self {
        Self::new(offset, value.len(), FieldKind::Literal, Source::Constant(value.to_string()))
    }

    /// A constant text run, formatted and space-padded to `width`.
    pub fn constant_text(offset: usize, width: usize, value: &str) -> Self {
        Self::new(offset, width, FieldKind::Text, Source::Constant(value.to_string()))
    }

    pub fn zeros(offset: usize, width: usize) -> Self {
        Self::new(offset, width, FieldKind::Literal, Source::Constant("0".repeat(width)))
    }

    pub fn end(&self) -> usize {
        self.offset + self.width
    }

    fn label(&self) -> Cow<'_, str> {
        match &self.source {
            Source::Field(key) => Cow::Borrowed(key.name()),
            Source::Constant(value) => Cow::Owned(format!("constant {:?}", value)),
        }
    }
}

/// What to do when a value has more digits than its field holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Refuse the record; a detail row is reported as failed.
    #[default]
    RejectRow,
    /// Keep the rightmost (least significant) characters.
    TruncateLeft,
}

/// Defects in a layout definition. Always fatal: bad data never causes these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("field at offset {offset} has zero width")]
    ZeroWidth { offset: usize },

    #[error("field {offset}..{end} lies outside the 444-character record")]
    OutOfRange { offset: usize, end: usize },

    #[error("fields at offsets {first} and {second} overlap")]
    Overlap { first: usize, second: usize },

    #[error("constant at offset {offset} is {len} characters, field holds {width}")]
    ConstantTooLong { offset: usize, width: usize, len: usize },

    #[error("constant at offset {offset} is not ASCII")]
    NonAscii { offset: usize },

    #[error("date field at offset {offset} must be 6 wide, found {width}")]
    DateWidth { offset: usize, width: usize },

    #[error("literal field at offset {offset} must take a constant")]
    LiteralWithoutConstant { offset: usize },

    #[error("record must start with the {kind} type byte '{expected}'")]
    LeadingByte { kind: RecordKind, expected: char },

    #[error("record has {len} characters, expected 444")]
    RecordLength { len: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{field} at position {position} needs {len} characters but the field holds {width}")]
    FieldOverflow {
        field: String,
        /// One-based, as in the bank manuals.
        position: usize,
        width: usize,
        len: usize,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    kind: RecordKind,
    fill: u8,
    fields: Vec<FieldSpec>,
}

impl RecordLayout {
    /// Builds and validates a layout. Ranges not covered by any field are
    /// written with `fill`.
    pub fn new(kind: RecordKind, fill: char, mut fields: Vec<FieldSpec>) -> Result<Self, LayoutError> {
        if !fill.is_ascii() {
            return Err(LayoutError::NonAscii { offset: 0 });
        }
        fields.sort_by_key(|f| f.offset);

        for field in &fields {
            validate_field(field)?;
        }
        for pair in fields.windows(2) {
            if pair[0].end() > pair[1].offset {
                return Err(LayoutError::Overlap {
                    first: pair[0].offset,
                    second: pair[1].offset,
                });
            }
        }

        let expected = kind.leading_byte() as char;
        let leads_with_type = fields.first().is_some_and(|f| {
            f.offset == 0
                && matches!(&f.source, Source::Constant(c) if c.starts_with(expected))
        });
        if !leads_with_type {
            return Err(LayoutError::LeadingByte { kind, expected });
        }

        Ok(RecordLayout { kind, fill: fill as u8, fields })
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn fill(&self) -> char {
        self.fill as char
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_for(&self, key: FieldKey) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.source == Source::Field(key))
    }

    /// Encodes one record from `source`.
    pub fn encode(&self, source: &dyn RecordSource, policy: OverflowPolicy) -> Result<Record, EncodeError> {
        let mut buffer = RecordBuffer::filled(self.fill);

        for field in &self.fields {
            let value = match &field.source {
                Source::Field(key) => source.value(*key),
                Source::Constant(c) => Some(FieldValue::text(c.as_str())),
            };
            let formatted = format_field(field, value.as_ref());
            let fitted = fit(field, &formatted, policy)?;
            buffer.write(field.offset, fitted)?;
        }

        Ok(buffer.into_record(self.kind)?)
    }
}

fn validate_field(field: &FieldSpec) -> Result<(), LayoutError> {
    let offset = field.offset;
    if field.width == 0 {
        return Err(LayoutError::ZeroWidth { offset });
    }
    if field.end() > RECORD_LENGTH {
        return Err(LayoutError::OutOfRange { offset, end: field.end() });
    }
    if field.kind == FieldKind::Date && field.width != DATE_WIDTH {
        return Err(LayoutError::DateWidth { offset, width: field.width });
    }
    match &field.source {
        Source::Constant(c) => {
            if !c.is_ascii() {
                return Err(LayoutError::NonAscii { offset });
            }
            if c.len() > field.width {
                return Err(LayoutError::ConstantTooLong { offset, width: field.width, len: c.len() });
            }
        }
        Source::Field(_) if field.kind == FieldKind::Literal => {
            return Err(LayoutError::LiteralWithoutConstant { offset });
        }
        Source::Field(_) => {}
    }
    Ok(())
}

fn format_field(field: &FieldSpec, value: Option<&FieldValue>) -> String {
    let width = field.width;
    match field.kind {
        FieldKind::Text => format_text(value, width),
        FieldKind::Numeric => format_numeric(value, width),
        FieldKind::Money => format_money(value, width),
        FieldKind::Date => format_date(value),
        FieldKind::Literal => {
            let raw = value.map(|v| v.to_string()).unwrap_or_default();
            format!("{:<width$}", raw, width = width)
        }
    }
}

fn fit<'a>(field: &FieldSpec, formatted: &'a str, policy: OverflowPolicy) -> Result<&'a str, EncodeError> {
    let len = formatted.len();
    if len <= field.width {
        return Ok(formatted);
    }
    match policy {
        OverflowPolicy::TruncateLeft if formatted.is_char_boundary(len - field.width) => {
            Ok(&formatted[len - field.width..])
        }
        _ => Err(EncodeError::FieldOverflow {
            field: field.label().into_owned(),
            position: field.offset + 1,
            width: field.width,
            len,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnab_shared::{InputRow, OriginatorConfig};

    fn trailer_layout() -> RecordLayout {
        RecordLayout::new(
            RecordKind::Trailer,
            ' ',
            vec![
                FieldSpec::literal(0, "9"),
                FieldSpec::numeric(1, 6, FieldKey::TotalRecords),
                FieldSpec::numeric(438, 6, FieldKey::RecordSequence),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_fills_uncovered_ranges() {
        let record = trailer_layout()
            .encode(&TrailerSource { total_records: 3 }, OverflowPolicy::RejectRow)
            .unwrap();
        let text = record.as_str();
        assert_eq!(text.len(), RECORD_LENGTH);
        assert_eq!(&text[0..7], "9000003");
        assert!(text[7..438].chars().all(|c| c == ' '));
        assert_eq!(&text[438..], "000003");
    }

    #[test]
    fn test_fields_are_sorted_before_validation() {
        let layout = RecordLayout::new(
            RecordKind::Trailer,
            '0',
            vec![FieldSpec::numeric(438, 6, FieldKey::RecordSequence), FieldSpec::literal(0, "9")],
        )
        .unwrap();
        assert_eq!(layout.fields()[0].offset, 0);
        assert_eq!(layout.fill(), '0');
    }

    #[test]
    fn test_overlap_is_rejected() {
        let err = RecordLayout::new(
            RecordKind::Trailer,
            ' ',
            vec![
                FieldSpec::literal(0, "9"),
                FieldSpec::numeric(1, 6, FieldKey::TotalRecords),
                FieldSpec::numeric(5, 6, FieldKey::RecordSequence),
            ],
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::Overlap { first: 1, second: 5 });
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let err = RecordLayout::new(
            RecordKind::Trailer,
            ' ',
            vec![FieldSpec::literal(0, "9"), FieldSpec::numeric(440, 6, FieldKey::RecordSequence)],
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::OutOfRange { offset: 440, end: 446 });
    }

    #[test]
    fn test_missing_type_byte_is_rejected() {
        let err = RecordLayout::new(
            RecordKind::Detail,
            ' ',
            vec![FieldSpec::literal(0, "9")],
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::LeadingByte { kind: RecordKind::Detail, expected: '1' });
    }

    #[test]
    fn test_constant_wider_than_field_is_rejected() {
        let err = RecordLayout::new(
            RecordKind::Header,
            ' ',
            vec![FieldSpec::literal(0, "0"), FieldSpec::constant_text(1, 3, "REMESSA")],
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::ConstantTooLong { offset: 1, width: 3, len: 7 });
    }

    #[test]
    fn test_date_width_is_fixed() {
        let err = RecordLayout::new(
            RecordKind::Detail,
            ' ',
            vec![
                FieldSpec::literal(0, "1"),
                FieldSpec::new(10, 8, FieldKind::Date, Source::Field(FieldKey::DueDate)),
            ],
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::DateWidth { offset: 10, width: 8 });
    }

    fn short_reference_layout() -> RecordLayout {
        RecordLayout::new(
            RecordKind::Detail,
            ' ',
            vec![FieldSpec::literal(0, "1"), FieldSpec::numeric(1, 4, FieldKey::Reference)],
        )
        .unwrap()
    }

    #[test]
    fn test_overflow_rejects_by_default() {
        let row = InputRow { reference: Some("1234567".into()), ..Default::default() };
        let defaults = LayoutDefaults::default();
        let source = DetailSource { row: &row, sequence: 2, defaults: &defaults };
        let err = short_reference_layout().encode(&source, OverflowPolicy::RejectRow).unwrap_err();
        assert_eq!(
            err,
            EncodeError::FieldOverflow { field: "reference".to_string(), position: 2, width: 4, len: 7 }
        );
    }

    #[test]
    fn test_overflow_truncates_from_the_left() {
        let row = InputRow { reference: Some("1234567".into()), ..Default::default() };
        let defaults = LayoutDefaults::default();
        let source = DetailSource { row: &row, sequence: 2, defaults: &defaults };
        let record = short_reference_layout().encode(&source, OverflowPolicy::TruncateLeft).unwrap();
        assert_eq!(&record.as_str()[0..5], "14567");
    }

    #[test]
    fn test_field_lookup_by_key() {
        let layout = trailer_layout();
        assert_eq!(layout.field_for(FieldKey::TotalRecords).map(|f| f.offset), Some(1));
        assert!(layout.field_for(FieldKey::DebtorName).is_none());
    }

    #[test]
    fn test_header_source_feeds_constants_and_fields() {
        let layout = RecordLayout::new(
            RecordKind::Header,
            ' ',
            vec![
                FieldSpec::literal(0, "0"),
                FieldSpec::constant_text(1, 10, "Cobranca"),
                FieldSpec::text(11, 10, FieldKey::OriginatorName),
            ],
        )
        .unwrap();
        let originator = OriginatorConfig { name: "Fundo Ação".to_string(), ..Default::default() };
        let source = HeaderSource {
            originator: &originator,
            file_sequence: 1,
            recording_date: chrono::NaiveDate::from_ymd_opt(2025, 11, 29).unwrap(),
        };
        let record = layout.encode(&source, OverflowPolicy::RejectRow).unwrap();
        assert_eq!(&record.as_str()[0..21], "0COBRANCA  FUNDO ACAO");
    }
}

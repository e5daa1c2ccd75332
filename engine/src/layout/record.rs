use super::LayoutError;
use cnab_shared::{RecordKind, RECORD_LENGTH};
use std::fmt;

/// Fixed-size working buffer for one record. Writes are bounds-checked and
/// never grow the buffer.
pub struct RecordBuffer {
    bytes: [u8; RECORD_LENGTH],
}

impl RecordBuffer {
    pub fn filled(fill: u8) -> Self {
        RecordBuffer { bytes: [fill; RECORD_LENGTH] }
    }

    pub fn write(&mut self, offset: usize, text: &str) -> Result<(), LayoutError> {
        let end = offset + text.len();
        if end > RECORD_LENGTH {
            return Err(LayoutError::OutOfRange { offset, end });
        }
        if !text.is_ascii() {
            return Err(LayoutError::NonAscii { offset });
        }
        self.bytes[offset..end].copy_from_slice(text.as_bytes());
        Ok(())
    }

    pub fn into_record(self, kind: RecordKind) -> Result<Record, LayoutError> {
        if self.bytes[0] != kind.leading_byte() {
            return Err(LayoutError::LeadingByte { kind, expected: kind.leading_byte() as char });
        }
        let text = String::from_utf8(self.bytes.to_vec())
            .map_err(|_| LayoutError::NonAscii { offset: 0 })?;
        Record::new(kind, text)
    }
}

/// One finished 444-character record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    text: String,
}

impl Record {
    pub fn new(kind: RecordKind, text: String) -> Result<Self, LayoutError> {
        let len = text.chars().count();
        if len != RECORD_LENGTH {
            return Err(LayoutError::RecordLength { len });
        }
        Ok(Record { kind, text })
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Positions 439-444: the record's own sequence number.
    pub fn sequence_field(&self) -> &str {
        &self.text[RECORD_LENGTH - 6..]
    }

    /// Reads a slice by the one-based, inclusive positions used in bank manuals.
    #[cfg(test)]
    pub(crate) fn positions(&self, first: usize, last: usize) -> &str {
        &self.text[first - 1..last]
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// File assembly: one header, one detail per encodable row (in row order) and
// a trailer whose count matches what was actually emitted.
pub mod sequence;

use crate::error::{EngineError, Result};
use crate::layout::{
    DetailSource, EncodeError, HeaderSource, LayoutDefaults, LayoutSet, OverflowPolicy, Record,
    TrailerSource,
};
use chrono::NaiveDate;
use cnab_shared::{InputRow, OriginatorConfig, RecordKind};
use sequence::{detail_sequence, SequenceTracker, MAX_FILE_SEQUENCE};
use std::sync::Arc;

pub const LINE_TERMINATOR: &str = "\r\n";

/// A row that could not be encoded. The batch carries on without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Zero-based index in the input rows.
    pub position: usize,
    /// One-based line in the tabular source, counting its header line.
    pub line: usize,
    pub reason: String,
}

impl RowFailure {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        RowFailure {
            position,
            line: position + 2,
            reason: reason.into(),
        }
    }
}

#[derive(Debug)]
pub enum DetailError {
    Row(RowFailure),
    /// The detail layout itself is broken; the whole run must stop.
    Fatal(EngineError),
}

pub type DetailOutcome = std::result::Result<Record, RowFailure>;

#[derive(Debug, Clone)]
pub struct AssembledFile {
    pub records: Vec<Record>,
    pub failures: Vec<RowFailure>,
    pub rows_attempted: usize,
}

impl AssembledFile {
    pub fn rows_encoded(&self) -> usize {
        self.records.len().saturating_sub(2)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn to_text(&self) -> String {
        self.records
            .iter()
            .map(Record::as_str)
            .collect::<Vec<_>>()
            .join(LINE_TERMINATOR)
    }

    /// Single-byte Latin-1 encoding of the joined records. Records are ASCII
    /// by construction; anything outside Latin-1 would become '?'.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_latin1(&self.to_text())
    }
}

pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect()
}

pub struct FileAssembler {
    layouts: Arc<LayoutSet>,
    defaults: Arc<LayoutDefaults>,
    policy: OverflowPolicy,
}

impl FileAssembler {
    pub fn new(layouts: LayoutSet, defaults: LayoutDefaults, policy: OverflowPolicy) -> Self {
        FileAssembler {
            layouts: Arc::new(layouts),
            defaults: Arc::new(defaults),
            policy,
        }
    }

    pub fn layouts(&self) -> &LayoutSet {
        &self.layouts
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn encode_header(
        &self,
        originator: &OriginatorConfig,
        file_sequence: u32,
        recording_date: NaiveDate,
    ) -> Result<Record> {
        if !(1..=MAX_FILE_SEQUENCE).contains(&file_sequence) {
            return Err(EngineError::ConfigError(format!(
                "file sequence must be between 1 and {}, got {}",
                MAX_FILE_SEQUENCE, file_sequence
            )));
        }
        let source = HeaderSource { originator, file_sequence, recording_date };
        // Header values identify the originator; they are never truncated,
        // whatever the run's policy for detail rows.
        self.layouts
            .header
            .encode(&source, OverflowPolicy::RejectRow)
            .map_err(|e| match e {
                EncodeError::FieldOverflow { .. } => {
                    EngineError::ConfigError(format!("header does not fit: {}", e))
                }
                EncodeError::Layout(inner) => EngineError::layout(RecordKind::Header, inner.to_string()),
            })
    }

    pub fn encode_detail(&self, row: &InputRow, position: usize) -> std::result::Result<Record, DetailError> {
        let source = DetailSource {
            row,
            sequence: detail_sequence(position),
            defaults: &self.defaults,
        };
        self.layouts
            .detail
            .encode(&source, self.policy)
            .map_err(|e| match e {
                EncodeError::FieldOverflow { .. } => DetailError::Row(RowFailure::new(position, e.to_string())),
                EncodeError::Layout(inner) => {
                    DetailError::Fatal(EngineError::layout(RecordKind::Detail, inner.to_string()))
                }
            })
    }

    pub fn encode_trailer(&self, total_records: u64) -> Result<Record> {
        self.layouts
            .trailer
            .encode(&TrailerSource { total_records }, OverflowPolicy::RejectRow)
            .map_err(|e| EngineError::layout(RecordKind::Trailer, e.to_string()))
    }

    /// Orders detail outcomes by row position, drops failed rows and closes
    /// the file with a trailer counting the emitted records.
    pub fn merge(
        &self,
        header: Record,
        mut outcomes: Vec<(usize, DetailOutcome)>,
        rows_attempted: usize,
    ) -> Result<AssembledFile> {
        outcomes.sort_by_key(|(position, _)| *position);

        let mut tracker = SequenceTracker::new();
        let mut records = Vec::with_capacity(outcomes.len() + 2);
        let mut failures = Vec::new();

        tracker.record(RecordKind::Header);
        records.push(header);

        for (_, outcome) in outcomes {
            match outcome {
                Ok(record) => {
                    tracker.record(RecordKind::Detail);
                    records.push(record);
                }
                Err(failure) => {
                    tracing::warn!(line = failure.line, reason = %failure.reason, "Row skipped");
                    failures.push(failure);
                }
            }
        }

        let trailer = self.encode_trailer(tracker.trailer_total())?;
        tracker.record(RecordKind::Trailer);
        records.push(trailer);

        Ok(AssembledFile { records, failures, rows_attempted })
    }

    /// Sequential end-to-end assembly of one remittance file.
    pub fn assemble(
        &self,
        rows: &[InputRow],
        originator: &OriginatorConfig,
        file_sequence: u32,
        recording_date: NaiveDate,
    ) -> Result<AssembledFile> {
        SequenceTracker::check_capacity(rows.len())?;
        tracing::debug!(rows = rows.len(), version = %self.layouts.version, "Assembling CNAB file");

        let header = self.encode_header(originator, file_sequence, recording_date)?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            match self.encode_detail(row, position) {
                Ok(record) => outcomes.push((position, Ok(record))),
                Err(DetailError::Row(failure)) => outcomes.push((position, Err(failure))),
                Err(DetailError::Fatal(e)) => return Err(e),
            }
        }

        self.merge(header, outcomes, rows.len())
    }
}

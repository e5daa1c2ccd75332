// Record sequence numbers and the trailer's total count.
use crate::error::{EngineError, Result};
use cnab_shared::RecordKind;

/// Largest value the 6-digit sequence field can hold.
pub const MAX_SEQUENCE: u64 = 999_999;

/// Largest file sequence the 7-digit header field holds.
pub const MAX_FILE_SEQUENCE: u32 = 9_999_999;

/// Sequence number of the detail built from the row at `position` (0-based).
/// The header takes 1, so the first detail is 2.
pub fn detail_sequence(position: usize) -> u64 {
    position as u64 + 2
}

/// Counts records as they are emitted so the trailer total matches the
/// lines actually written.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    header: bool,
    details: u64,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses batches whose record count would not fit the sequence field.
    pub fn check_capacity(rows: usize) -> Result<()> {
        let records = rows.saturating_add(2);
        if records as u64 > MAX_SEQUENCE {
            return Err(EngineError::BatchTooLarge { records });
        }
        Ok(())
    }

    pub fn record(&mut self, kind: RecordKind) {
        match kind {
            RecordKind::Header => self.header = true,
            RecordKind::Detail => self.details += 1,
            RecordKind::Trailer => {}
        }
    }

    pub fn details(&self) -> u64 {
        self.details
    }

    /// Header + emitted details + the trailer itself.
    pub fn trailer_total(&self) -> u64 {
        u64::from(self.header) + self.details + 1
    }
}

// engine/src/services/generation_service/mod.rs
// GenerationService drives one remittance run: header, parallel detail
// encoding, ordered merge, trailer. Handlers live in sibling modules.
use crate::assembler::sequence::SequenceTracker;
use crate::assembler::{FileAssembler, RowFailure};
use crate::config::EngineSettings;
use crate::error::Result;
use crate::layout::{LayoutSet, LayoutVersion};
use chrono::NaiveDate;
use cnab_shared::{InputRow, OriginatorConfig};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub mod encode_rows;
pub mod load_rows;
pub mod write_output;

pub use write_output::default_output_name;

/// Shared stop switch. Workers look at it between rows, never mid-record.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub rows: Vec<InputRow>,
    pub originator: OriginatorConfig,
    pub file_sequence: u32,
    /// Written into the header; the only time-dependent field of a file.
    pub recording_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub layout_version: LayoutVersion,
    pub rows_attempted: usize,
    pub rows_encoded: usize,
    pub failures: Vec<RowFailure>,
    pub record_count: usize,
    /// The complete file, Latin-1 encoded.
    pub bytes: Vec<u8>,
}

impl GenerationReport {
    pub async fn write_report_file(&self, path: &Path) -> Result<PathBuf> {
        write_output::handle_write_output(&self.bytes, path).await
    }
}

pub struct GenerationService {
    assembler: Arc<FileAssembler>,
    workers: usize,
}

impl GenerationService {
    pub fn new(assembler: FileAssembler, workers: usize) -> Self {
        GenerationService {
            assembler: Arc::new(assembler),
            workers: workers.max(1),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        let layouts = LayoutSet::for_version(settings.layout_version)?;
        let assembler = FileAssembler::new(layouts, settings.defaults.clone(), settings.overflow_policy);
        Ok(Self::new(assembler, settings.worker_threads))
    }

    pub fn assembler(&self) -> &FileAssembler {
        &self.assembler
    }

    /// Reads a remittance CSV on a blocking task.
    pub async fn load_rows(path: PathBuf) -> Result<Vec<InputRow>> {
        load_rows::handle_load_rows(path).await
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationReport> {
        self.generate_with_cancel(request, CancellationFlag::new()).await
    }

    /// Nothing is returned on a fatal error or cancellation, so no partial
    /// file can reach the caller.
    pub async fn generate_with_cancel(
        &self,
        request: GenerationRequest,
        cancel: CancellationFlag,
    ) -> Result<GenerationReport> {
        let run_id = Uuid::new_v4();
        let rows_attempted = request.rows.len();
        let layout_version = self.assembler.layouts().version;
        SequenceTracker::check_capacity(rows_attempted)?;

        tracing::info!(
            run_id = %run_id,
            rows = rows_attempted,
            layout = %layout_version,
            workers = self.workers,
            "Starting remittance generation"
        );

        let header = self.assembler.encode_header(
            &request.originator,
            request.file_sequence,
            request.recording_date,
        )?;

        let rows = Arc::new(request.rows);
        let outcomes =
            encode_rows::handle_encode_rows(Arc::clone(&self.assembler), rows, self.workers, cancel).await?;

        let file = self.assembler.merge(header, outcomes, rows_attempted)?;
        let report = GenerationReport {
            run_id,
            layout_version,
            rows_attempted,
            rows_encoded: file.rows_encoded(),
            record_count: file.record_count(),
            bytes: file.to_bytes(),
            failures: file.failures,
        };

        tracing::info!(
            run_id = %run_id,
            rows_encoded = report.rows_encoded,
            failures = report.failures.len(),
            records = report.record_count,
            "Remittance generation finished"
        );
        Ok(report)
    }
}

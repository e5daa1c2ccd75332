use cnab_shared::RecordKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Settings file error: {source}")]
    SettingsFormatError {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    // The layout itself is mis-specified; never caused by dirty row data.
    #[error("Layout consistency error in {kind} record: {message}")]
    LayoutConsistency { kind: RecordKind, message: String },

    #[error("Batch too large: {records} records exceed the 6-digit sequence field")]
    BatchTooLarge { records: usize },

    #[error("Generation cancelled after {encoded} of {attempted} rows")]
    Cancelled { encoded: usize, attempted: usize },

    #[error("Worker task failed: {0}")]
    WorkerError(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    pub fn layout(kind: RecordKind, message: impl Into<String>) -> Self {
        EngineError::LayoutConsistency {
            kind,
            message: message.into(),
        }
    }

    /// Exit code used by the binary; fatal layout problems get their own code.
    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::ConfigError(_) | EngineError::SettingsFormatError { .. } => 2,
            EngineError::CsvSystemError { .. }
            | EngineError::CsvDataFormatError(_)
            | EngineError::IoError { .. }
            | EngineError::AnyhowError(_) => 3,
            EngineError::LayoutConsistency { .. } => 4,
            EngineError::BatchTooLarge { .. } => 5,
            EngineError::Cancelled { .. } | EngineError::WorkerError(_) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

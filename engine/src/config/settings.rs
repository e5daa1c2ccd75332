// Engine settings, loaded from a JSON file and overridden by CLI flags
use crate::error::{EngineError, Result};
use crate::layout::{LayoutDefaults, LayoutVersion, OverflowPolicy};
use cnab_shared::OriginatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::assembler::sequence::MAX_FILE_SEQUENCE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub originator: OriginatorConfig,
    pub file_sequence: u32,
    pub layout_version: LayoutVersion,
    pub overflow_policy: OverflowPolicy,
    pub defaults: LayoutDefaults,
    /// Blocking tasks used to encode detail rows.
    pub worker_threads: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            originator: OriginatorConfig::default(),
            file_sequence: 1,
            layout_version: LayoutVersion::default(),
            overflow_policy: OverflowPolicy::default(),
            defaults: LayoutDefaults::default(),
            worker_threads: 4,
        }
    }
}

impl EngineSettings {
    /// Reads settings from a JSON file. Keys left out take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading engine settings");
        let content = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Checks what the header layout cannot hold. Detail data is never
    /// checked here; bad rows are reported per row.
    pub fn validate(&self) -> Result<()> {
        let originator = &self.originator;
        if originator.code.trim().is_empty() {
            return Err(EngineError::ConfigError("originator code is required".to_string()));
        }
        if originator.name.trim().is_empty() {
            return Err(EngineError::ConfigError("originator name is required".to_string()));
        }
        check_digits("originator code", &originator.code, 20)?;
        check_digits("bank number", &originator.bank_number, 3)?;
        if self.file_sequence == 0 || self.file_sequence > MAX_FILE_SEQUENCE {
            return Err(EngineError::ConfigError(format!(
                "file sequence must be between 1 and {}, got {}",
                MAX_FILE_SEQUENCE, self.file_sequence
            )));
        }
        if self.worker_threads == 0 {
            return Err(EngineError::ConfigError("worker_threads must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn check_digits(name: &str, value: &str, max: usize) -> Result<()> {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if digits > max {
        return Err(EngineError::ConfigError(format!(
            "{} has {} digits, at most {} allowed",
            name, digits, max
        )));
    }
    Ok(())
}

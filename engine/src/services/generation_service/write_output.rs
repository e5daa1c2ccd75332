// Handler for delivering a generated file to disk
use crate::error::Result;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// "REMESSA_20251129_143000.REM"
pub fn default_output_name(now: NaiveDateTime) -> String {
    format!("REMESSA_{}.REM", now.format("%Y%m%d_%H%M%S"))
}

/// Writes to a sibling temp file and renames it into place, so readers
/// never see a half-written remittance.
pub async fn handle_write_output(bytes: &[u8], path: &Path) -> Result<PathBuf> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Remittance file written");
    Ok(path.to_path_buf())
}

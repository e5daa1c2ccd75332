// Handler for loading a remittance CSV off the async runtime
use crate::data::csv_parser::RemittanceCsvParser;
use crate::error::{EngineError, Result};
use cnab_shared::InputRow;
use std::path::PathBuf;

pub async fn handle_load_rows(path: PathBuf) -> Result<Vec<InputRow>> {
    let shown = path.display().to_string();
    let loaded = tokio::task::spawn_blocking(move || RemittanceCsvParser::load_rows_from_csv(&path))
        .await
        .map_err(|e| EngineError::WorkerError(e.to_string()))?;

    loaded.map_err(|e| {
        tracing::error!(path = %shown, error = %e, "Failed to load remittance CSV");
        match e.downcast::<csv::Error>() {
            Ok(csv_error) => EngineError::from(csv_error),
            Err(other) => EngineError::CsvDataFormatError(format!("{:#}", other)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_rows_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SEU_NUMERO;NOME_SACADO").unwrap();
        writeln!(file, "1;Empresa").unwrap();

        let rows = handle_load_rows(file.path().to_path_buf()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_file_is_a_data_format_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Ativo;Data").unwrap();

        let err = handle_load_rows(file.path().to_path_buf()).await.unwrap_err();
        assert!(matches!(err, EngineError::CsvDataFormatError(_)));
        assert_eq!(err.exit_code(), 3);
    }
}

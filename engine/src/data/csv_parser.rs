use anyhow::{anyhow, Result};
use cnab_shared::{FieldValue, InputRow};
use csv::{ByteRecord, ReaderBuilder};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::formatters::clean_text;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Input columns the encoder knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Reference,
    AdjustedDueDate,
    DueDate,
    IssueDate,
    FaceValue,
    DebtorTaxId,
    DebtorName,
    CoObligation,
    PresentValue,
    AcquisitionValue,
    AssignorName,
    AssignorTaxId,
    DocumentNumber,
    ReferenceDate,
    OurNumber,
}

impl Column {
    const ALL: [Column; 15] = [
        Column::Reference,
        Column::AdjustedDueDate,
        Column::DueDate,
        Column::IssueDate,
        Column::FaceValue,
        Column::DebtorTaxId,
        Column::DebtorName,
        Column::CoObligation,
        Column::PresentValue,
        Column::AcquisitionValue,
        Column::AssignorName,
        Column::AssignorTaxId,
        Column::DocumentNumber,
        Column::ReferenceDate,
        Column::OurNumber,
    ];

    // Normalized header names, in order of preference.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Reference => &["SEU_NUMERO", "ID_RECEBIVEL", "REFERENCE"],
            Column::AdjustedDueDate => &["DATA_VENCIMENTO_AJUSTADA", "ADJUSTED_DUE_DATE"],
            Column::DueDate => &["DATA_VENCIMENTO", "DUE_DATE"],
            Column::IssueDate => &["DATA_EMISSAO", "ISSUE_DATE"],
            Column::FaceValue => &["VALOR_NOMINAL", "FACE_VALUE"],
            Column::DebtorTaxId => &["DOC_SACADO", "DEBTOR_TAX_ID"],
            Column::DebtorName => &["NOME_SACADO", "DEBTOR_NAME"],
            Column::CoObligation => &["COOBRIGACAO", "CO_OBLIGATION"],
            Column::PresentValue => &["VALOR_PRESENTE", "PRESENT_VALUE"],
            Column::AcquisitionValue => &["VALOR_AQUISICAO", "ACQUISITION_VALUE"],
            Column::AssignorName => &["NOME_CEDENTE", "ASSIGNOR_NAME"],
            Column::AssignorTaxId => &["DOC_CEDENTE", "ASSIGNOR_TAX_ID"],
            Column::DocumentNumber => &["NUMERO_DOCUMENTO", "DOCUMENT_NUMBER"],
            Column::ReferenceDate => &["DATA_REFERENCIA", "REFERENCE_DATE"],
            Column::OurNumber => &["DS_NOSSO_NUMERO", "NOSSO_NUMERO", "OUR_NUMBER"],
        }
    }

    fn assign(self, row: &mut InputRow, value: FieldValue) {
        let slot = match self {
            Column::Reference => &mut row.reference,
            Column::AdjustedDueDate => &mut row.adjusted_due_date,
            Column::DueDate => &mut row.due_date,
            Column::IssueDate => &mut row.issue_date,
            Column::FaceValue => &mut row.face_value,
            Column::DebtorTaxId => &mut row.debtor_tax_id,
            Column::DebtorName => &mut row.debtor_name,
            Column::CoObligation => &mut row.co_obligation,
            Column::PresentValue => &mut row.present_value,
            Column::AcquisitionValue => &mut row.acquisition_value,
            Column::AssignorName => &mut row.assignor_name,
            Column::AssignorTaxId => &mut row.assignor_tax_id,
            Column::DocumentNumber => &mut row.document_number,
            Column::ReferenceDate => &mut row.reference_date,
            Column::OurNumber => &mut row.our_number,
        };
        *slot = Some(value);
    }
}

/// "Data Vencimento Ajustada", "data_vencimento_ajustada" and
/// "DATA VENCIMENTO AJUSTADA" all become "DATA_VENCIMENTO_AJUSTADA".
pub fn normalize_header(header: &str) -> String {
    let spaced: String = header
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    clean_text(&spaced).split_whitespace().collect::<Vec<_>>().join("_")
}

/// Latin-1 fallback for cells exported by older spreadsheet tools.
fn decode_cell(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Picks ';' (Brazilian spreadsheet exports) unless the header line has more commas.
fn sniff_delimiter(content: &[u8]) -> u8 {
    let header_line = content.split(|&b| b == b'\n').next().unwrap_or_default();
    let semicolons = header_line.iter().filter(|&&b| b == b';').count();
    let commas = header_line.iter().filter(|&&b| b == b',').count();
    if commas > semicolons {
        b','
    } else {
        b';'
    }
}

struct ColumnMap {
    columns: Vec<(Column, usize)>,
}

impl ColumnMap {
    fn from_headers(headers: &ByteRecord) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize_header(&decode_cell(h)))
            .collect();

        let columns: Vec<(Column, usize)> = Column::ALL
            .iter()
            .filter_map(|&column| {
                column
                    .aliases()
                    .iter()
                    .find_map(|alias| normalized.iter().position(|h| h == alias))
                    .map(|idx| (column, idx))
            })
            .collect();

        if columns.is_empty() {
            return Err(anyhow!(
                "No recognized remittance column in CSV header: {}",
                normalized.join(", ")
            ));
        }

        let map = ColumnMap { columns };
        map.warn_missing();
        Ok(map)
    }

    fn has(&self, column: Column) -> bool {
        self.columns.iter().any(|(c, _)| *c == column)
    }

    fn warn_missing(&self) {
        let required = [
            Column::Reference,
            Column::IssueDate,
            Column::FaceValue,
            Column::DebtorTaxId,
            Column::DebtorName,
        ];
        for column in required {
            if !self.has(column) {
                tracing::warn!(column = column.aliases()[0], "Required column missing; field will be filled");
            }
        }
        if !self.has(Column::DueDate) && !self.has(Column::AdjustedDueDate) {
            tracing::warn!(column = "DATA_VENCIMENTO", "Required column missing; field will be filled");
        }
    }

    fn row_from(&self, record: &ByteRecord) -> InputRow {
        let mut row = InputRow::default();
        for &(column, idx) in &self.columns {
            let Some(cell) = record.get(idx) else { continue };
            let value = decode_cell(cell);
            let value = value.trim();
            if !value.is_empty() {
                column.assign(&mut row, FieldValue::text(value));
            }
        }
        row
    }
}

fn is_empty_row(row: &InputRow) -> bool {
    *row == InputRow::default()
}

pub struct RemittanceCsvParser;

impl RemittanceCsvParser {
    // Header example: SEU_NUMERO;DATA_VENCIMENTO_AJUSTADA;DATA_EMISSAO;VALOR_NOMINAL;DOC_SACADO;NOME_SACADO
    // Row example:    100001;31/12/2025;29/11/2025;1.500,00;12.345.678/0001-90;Empresa Exemplo Ltda
    pub fn load_rows_from_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<InputRow>> {
        let path = file_path.as_ref();
        let file = File::open(path)
            .map_err(|e| anyhow!("Failed to open CSV file '{}': {}", path.display(), e))?;
        let rows = Self::load_rows_from_reader(BufReader::new(file))?;
        tracing::info!(path = %path.display(), rows = rows.len(), "Loaded remittance rows");
        Ok(rows)
    }

    /// Rows keep their file order, so row `i` sits on line `i + 2`. Only
    /// trailing all-empty rows are dropped, which leaves that mapping intact.
    pub fn load_rows_from_reader<R: Read>(mut reader: R) -> Result<Vec<InputRow>> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

        let mut rdr = ReaderBuilder::new()
            .delimiter(sniff_delimiter(content))
            .has_headers(true)
            .flexible(true)
            .from_reader(content);

        let headers = rdr.byte_headers()?.clone();
        let map = ColumnMap::from_headers(&headers)?;

        let mut rows = Vec::new();
        for (idx, result) in rdr.byte_records().enumerate() {
            let record = result.map_err(|e| anyhow!("Error reading CSV record at line {}: {}", idx + 2, e))?;
            rows.push(map.row_from(&record));
        }

        while rows.last().is_some_and(is_empty_row) {
            rows.pop();
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    fn text(value: &Option<FieldValue>) -> Option<String> {
        value.as_ref().map(|v| v.to_string())
    }

    #[test]
    fn test_load_rows_semicolon_file() {
        let csv_content = "\
SEU_NUMERO;DATA_VENCIMENTO_AJUSTADA;DATA_EMISSAO;VALOR_NOMINAL;DOC_SACADO;NOME_SACADO
100001;31/12/2025;29/11/2025;1.500,00;12.345.678/0001-90;Empresa Exemplo Ltda
100002;15/01/2026;29/11/2025;99,90;123.456.789-01;Maria José
";
        let tmp_file = create_test_csv(csv_content.as_bytes());
        let rows = RemittanceCsvParser::load_rows_from_csv(tmp_file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(text(&rows[0].reference).as_deref(), Some("100001"));
        assert_eq!(text(&rows[0].adjusted_due_date).as_deref(), Some("31/12/2025"));
        assert_eq!(rows[0].due_date, None);
        assert_eq!(text(&rows[0].face_value).as_deref(), Some("1.500,00"));
        assert_eq!(text(&rows[1].debtor_name).as_deref(), Some("Maria José"));
    }

    #[test]
    fn test_comma_delimiter_and_header_variants() {
        let csv_content = "\
Id Recebivel,Data Vencimento,Data Emissão,Valor Nominal,doc_sacado,Nome Sacado,Coobrigação,Nosso Número
7,2025-12-31,2025-11-29,1500.00,12345678901234,ACME,SIM,55
";
        let rows = RemittanceCsvParser::load_rows_from_reader(csv_content.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(text(&row.reference).as_deref(), Some("7"));
        assert_eq!(text(&row.due_date).as_deref(), Some("2025-12-31"));
        assert_eq!(text(&row.issue_date).as_deref(), Some("2025-11-29"));
        assert_eq!(text(&row.co_obligation).as_deref(), Some("SIM"));
        assert_eq!(text(&row.our_number).as_deref(), Some("55"));
    }

    #[test]
    fn test_first_alias_wins() {
        let csv_content = "ID_RECEBIVEL;SEU_NUMERO\nA;B\n";
        let rows = RemittanceCsvParser::load_rows_from_reader(csv_content.as_bytes()).unwrap();
        assert_eq!(text(&rows[0].reference).as_deref(), Some("B"));
    }

    #[test]
    fn test_bom_and_latin1_cells() {
        let mut content = UTF8_BOM.to_vec();
        content.extend_from_slice(b"SEU_NUMERO;NOME_SACADO\n1;Jo\xE3o\n");
        let tmp_file = create_test_csv(&content);
        let rows = RemittanceCsvParser::load_rows_from_csv(tmp_file.path()).unwrap();

        assert_eq!(text(&rows[0].reference).as_deref(), Some("1"));
        assert_eq!(text(&rows[0].debtor_name).as_deref(), Some("João"));
    }

    #[test]
    fn test_blank_cells_are_absent() {
        let csv_content = "SEU_NUMERO;NOME_SACADO;VALOR_NOMINAL\n1;  ;\n";
        let rows = RemittanceCsvParser::load_rows_from_reader(csv_content.as_bytes()).unwrap();
        assert_eq!(rows[0].debtor_name, None);
        assert_eq!(rows[0].face_value, None);
    }

    #[test]
    fn test_trailing_empty_rows_dropped_inner_kept() {
        let csv_content = "SEU_NUMERO;NOME_SACADO\n1;A\n;\n2;B\n;\n;\n";
        let rows = RemittanceCsvParser::load_rows_from_reader(csv_content.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], InputRow::default());
        assert_eq!(text(&rows[2].reference).as_deref(), Some("2"));
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let csv_content = "SEU_NUMERO;NOME_SACADO;DOC_SACADO\n1;A\n";
        let rows = RemittanceCsvParser::load_rows_from_reader(csv_content.as_bytes()).unwrap();
        assert_eq!(rows[0].debtor_tax_id, None);
    }

    #[test]
    fn test_header_only_file() {
        let csv_content = "SEU_NUMERO;DATA_VENCIMENTO;DATA_EMISSAO;VALOR_NOMINAL;DOC_SACADO;NOME_SACADO\n";
        let rows = RemittanceCsvParser::load_rows_from_reader(csv_content.as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_no_recognized_column() {
        let csv_content = "Ativo;Data;Hora\nWINFUT;30/12/2024;18:20:00\n";
        let result = RemittanceCsvParser::load_rows_from_reader(csv_content.as_bytes());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("No recognized remittance column"));
    }

    #[test]
    fn test_missing_file() {
        let result = RemittanceCsvParser::load_rows_from_csv("/no/such/remessa.csv");
        assert!(result.unwrap_err().to_string().contains("Failed to open CSV file"));
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Data Vencimento Ajustada"), "DATA_VENCIMENTO_AJUSTADA");
        assert_eq!(normalize_header(" coobrigação "), "COOBRIGACAO");
        assert_eq!(normalize_header("DS_NOSSO_NUMERO"), "DS_NOSSO_NUMERO");
        assert_eq!(normalize_header("nosso-número"), "NOSSO_NUMERO");
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter(b"A;B;C\n1,5;2;3"), b';');
        assert_eq!(sniff_delimiter(b"A,B,C\n1;2;3"), b',');
        assert_eq!(sniff_delimiter(b"A\n1"), b';');
    }
}

// Where field values come from: one source per record kind, all behind the
// same lookup trait so the layout engine stays ignorant of rows and configs.
use super::versions::LayoutDefaults;
use crate::formatters::clean_text;
use chrono::NaiveDate;
use cnab_shared::models::present;
use cnab_shared::utils::brazilian_format::digits_only;
use cnab_shared::{FieldValue, InputRow, OriginatorConfig};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    // Header
    OriginatorCode,
    OriginatorName,
    BankNumber,
    BankName,
    RecordingDate,
    FileSequence,

    // Detail
    Reference,
    DueDate,
    IssueDate,
    FaceValue,
    DebtorTaxIdType,
    DebtorTaxId,
    DebtorName,
    DebtorAddress,
    CoObligation,
    PresentValue,
    AcquisitionValue,
    AssignorName,
    AssignorTaxIdType,
    AssignorTaxId,
    DocumentNumber,
    ReferenceDate,
    OurNumber,
    TitleSpecies,

    // Trailer
    TotalRecords,

    RecordSequence,
}

impl FieldKey {
    pub fn name(self) -> &'static str {
        match self {
            FieldKey::OriginatorCode => "originator_code",
            FieldKey::OriginatorName => "originator_name",
            FieldKey::BankNumber => "bank_number",
            FieldKey::BankName => "bank_name",
            FieldKey::RecordingDate => "recording_date",
            FieldKey::FileSequence => "file_sequence",
            FieldKey::Reference => "reference",
            FieldKey::DueDate => "due_date",
            FieldKey::IssueDate => "issue_date",
            FieldKey::FaceValue => "face_value",
            FieldKey::DebtorTaxIdType => "debtor_tax_id_type",
            FieldKey::DebtorTaxId => "debtor_tax_id",
            FieldKey::DebtorName => "debtor_name",
            FieldKey::DebtorAddress => "debtor_address",
            FieldKey::CoObligation => "co_obligation",
            FieldKey::PresentValue => "present_value",
            FieldKey::AcquisitionValue => "acquisition_value",
            FieldKey::AssignorName => "assignor_name",
            FieldKey::AssignorTaxIdType => "assignor_tax_id_type",
            FieldKey::AssignorTaxId => "assignor_tax_id",
            FieldKey::DocumentNumber => "document_number",
            FieldKey::ReferenceDate => "reference_date",
            FieldKey::OurNumber => "our_number",
            FieldKey::TitleSpecies => "title_species",
            FieldKey::TotalRecords => "total_records",
            FieldKey::RecordSequence => "record_sequence",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait RecordSource {
    /// `None` lets the field's formatter fall back to its fill value.
    fn value(&self, key: FieldKey) -> Option<FieldValue>;
}

/// "02" (company, CNPJ) when the ID has exactly 14 digits, otherwise "01"
/// (individual, CPF).
pub fn tax_id_type(value: Option<&FieldValue>) -> &'static str {
    let digits = value.map(|v| digits_only(&v.to_string())).unwrap_or_default();
    if digits.len() == 14 {
        "02"
    } else {
        "01"
    }
}

pub const CO_OBLIGATION_DEFAULT: &str = "02";

/// Maps free-text co-obligation answers onto the two-digit code. Anything
/// outside the lexicon is passed on for numeric formatting.
pub fn co_obligation_code(value: Option<&FieldValue>) -> String {
    let Some(value) = value.filter(|v| !v.is_blank()) else {
        return CO_OBLIGATION_DEFAULT.to_string();
    };
    let raw = value.to_string();
    match clean_text(&raw).trim() {
        "SIM" | "S" | "YES" | "Y" => "01".to_string(),
        "NAO" | "N" | "NO" => "02".to_string(),
        _ => raw,
    }
}

pub struct HeaderSource<'a> {
    pub originator: &'a OriginatorConfig,
    pub file_sequence: u32,
    pub recording_date: NaiveDate,
}

impl RecordSource for HeaderSource<'_> {
    fn value(&self, key: FieldKey) -> Option<FieldValue> {
        match key {
            FieldKey::OriginatorCode => Some(FieldValue::text(self.originator.code.as_str())),
            FieldKey::OriginatorName => Some(FieldValue::text(self.originator.name.as_str())),
            FieldKey::BankNumber => Some(FieldValue::text(self.originator.bank_number.as_str())),
            FieldKey::BankName => Some(FieldValue::text(self.originator.bank_name.as_str())),
            FieldKey::RecordingDate => Some(FieldValue::Date(self.recording_date)),
            FieldKey::FileSequence => Some(FieldValue::Integer(i64::from(self.file_sequence))),
            FieldKey::RecordSequence => Some(FieldValue::Integer(1)),
            _ => None,
        }
    }
}

pub struct DetailSource<'a> {
    pub row: &'a InputRow,
    pub sequence: u64,
    pub defaults: &'a LayoutDefaults,
}

impl RecordSource for DetailSource<'_> {
    fn value(&self, key: FieldKey) -> Option<FieldValue> {
        let row = self.row;
        match key {
            FieldKey::Reference => present(&row.reference).cloned(),
            FieldKey::DueDate => row.preferred_due_date().cloned(),
            FieldKey::IssueDate => present(&row.issue_date).cloned(),
            FieldKey::FaceValue => present(&row.face_value).cloned(),
            FieldKey::DebtorTaxIdType => {
                Some(FieldValue::text(tax_id_type(present(&row.debtor_tax_id))))
            }
            FieldKey::DebtorTaxId => present(&row.debtor_tax_id).cloned(),
            FieldKey::DebtorName => present(&row.debtor_name).cloned(),
            FieldKey::DebtorAddress => Some(FieldValue::text(self.defaults.debtor_address.as_str())),
            FieldKey::CoObligation => {
                Some(FieldValue::Text(co_obligation_code(present(&row.co_obligation))))
            }
            FieldKey::PresentValue => present(&row.present_value).cloned(),
            FieldKey::AcquisitionValue => present(&row.acquisition_value).cloned(),
            FieldKey::AssignorName => present(&row.assignor_name)
                .cloned()
                .or_else(|| Some(FieldValue::text(self.defaults.assignor_name.as_str()))),
            FieldKey::AssignorTaxIdType => present(&row.assignor_tax_id)
                .map(|id| FieldValue::text(tax_id_type(Some(id)))),
            FieldKey::AssignorTaxId => present(&row.assignor_tax_id).cloned(),
            FieldKey::DocumentNumber => present(&row.document_number).cloned(),
            FieldKey::ReferenceDate => present(&row.reference_date).cloned(),
            FieldKey::OurNumber => present(&row.our_number).cloned(),
            FieldKey::TitleSpecies => Some(FieldValue::text(self.defaults.title_species.as_str())),
            FieldKey::RecordSequence => i64::try_from(self.sequence).ok().map(FieldValue::Integer),
            _ => None,
        }
    }
}

pub struct TrailerSource {
    pub total_records: u64,
}

impl RecordSource for TrailerSource {
    fn value(&self, key: FieldKey) -> Option<FieldValue> {
        match key {
            FieldKey::TotalRecords | FieldKey::RecordSequence => {
                i64::try_from(self.total_records).ok().map(FieldValue::Integer)
            }
            _ => None,
        }
    }
}

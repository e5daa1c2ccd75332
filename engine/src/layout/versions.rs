// Built-in CNAB 444 layout revisions.
//
// Positions in the comments are the one-based, inclusive ranges of the bank
// manuals; offsets in code are zero-based.

use super::source::FieldKey as K;
use super::{FieldSpec as F, LayoutError, RecordLayout};
use crate::error::EngineError;
use cnab_shared::RecordKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVersion {
    /// Compact detail: 10-digit reference, our-number, assignor name block.
    #[default]
    V1,
    /// 25-digit reference, debtor block at 221-314, no tax-ID type.
    V2,
    /// Full receivables-fund layout: co-obligation, present and acquisition
    /// values, assignor identity; trailer carries the count only in its tail.
    V3,
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutVersion::V1 => "v1",
            LayoutVersion::V2 => "v2",
            LayoutVersion::V3 => "v3",
        };
        f.write_str(name)
    }
}

/// Values the bank files need but the input spreadsheets do not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDefaults {
    pub debtor_address: String,
    /// Used when a row has no assignor name of its own.
    pub assignor_name: String,
    /// Espécie do título; "04" is a service invoice (duplicata de serviço).
    pub title_species: String,
}

impl Default for LayoutDefaults {
    fn default() -> Self {
        LayoutDefaults {
            debtor_address: "ENDERECO COMPLETO".to_string(),
            assignor_name: String::new(),
            title_species: "04".to_string(),
        }
    }
}

/// Header, detail and trailer layouts of one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSet {
    pub version: LayoutVersion,
    pub header: RecordLayout,
    pub detail: RecordLayout,
    pub trailer: RecordLayout,
}

impl LayoutSet {
    /// Builds the three layouts of `version`. A definition that fails
    /// validation is a fatal layout-consistency error.
    pub fn for_version(version: LayoutVersion) -> crate::error::Result<Self> {
        let (detail, trailer) = match version {
            LayoutVersion::V1 => (detail_v1(), trailer_with_leading_count()),
            LayoutVersion::V2 => (detail_v2(), trailer_with_leading_count()),
            LayoutVersion::V3 => (detail_v3(), trailer_tail_only()),
        };
        Ok(LayoutSet {
            version,
            header: checked(version, RecordKind::Header, header())?,
            detail: checked(version, RecordKind::Detail, detail)?,
            trailer: checked(version, RecordKind::Trailer, trailer)?,
        })
    }

    pub fn layout(&self, kind: RecordKind) -> &RecordLayout {
        match kind {
            RecordKind::Header => &self.header,
            RecordKind::Detail => &self.detail,
            RecordKind::Trailer => &self.trailer,
        }
    }
}

fn checked(
    version: LayoutVersion,
    kind: RecordKind,
    layout: Result<RecordLayout, LayoutError>,
) -> crate::error::Result<RecordLayout> {
    layout.map_err(|e| EngineError::layout(kind, format!("{} layout: {}", version, e)))
}

// The header is shared by every revision.
fn header() -> Result<RecordLayout, LayoutError> {
    RecordLayout::new(
        RecordKind::Header,
        ' ',
        vec![
            F::literal(0, "0"),                        // 001     record type
            F::literal(1, "1"),                        // 002     remittance file
            F::literal(2, "REMESSA"),                  // 003-009
            F::literal(9, "01"),                       // 010-011 service code
            F::constant_text(11, 15, "COBRANCA"),      // 012-026
            F::numeric(26, 20, K::OriginatorCode),     // 027-046
            F::text(46, 30, K::OriginatorName),        // 047-076
            F::numeric(76, 3, K::BankNumber),          // 077-079
            F::text(79, 15, K::BankName),              // 080-094
            F::date(94, K::RecordingDate),             // 095-100
            F::literal(108, "MX"),                     // 109-110
            F::numeric(110, 7, K::FileSequence),       // 111-117
            F::numeric(438, 6, K::RecordSequence),     // 439-444
        ],
    )
}

fn detail_v1() -> Result<RecordLayout, LayoutError> {
    RecordLayout::new(
        RecordKind::Detail,
        ' ',
        vec![
            F::literal(0, "1"),
            F::numeric(20, 2, K::CoObligation),        // 021-022
            F::zeros(22, 14),                          // 023-036
            F::literal(36, "AA"),                      // 037-038
            F::zeros(38, 6),                           // 039-044
            F::literal(44, "400"),                     // 045-047 wallet
            F::literal(47, "50000"),                   // 048-052
            F::numeric(52, 10, K::Reference),          // 053-062
            F::date(62, K::DueDate),                   // 063-068
            F::money(68, 13, K::FaceValue),            // 069-081
            F::zeros(81, 3),                           // 082-084 collecting bank
            F::zeros(84, 5),                           // 085-089 agency
            F::numeric(89, 2, K::TitleSpecies),        // 090-091
            F::date(93, K::IssueDate),                 // 094-099
            F::literal(99, "0000200000"),              // 100-109 instructions
            F::zeros(109, 29),                         // 110-138 interest, fine
            F::numeric(138, 2, K::DebtorTaxIdType),    // 139-140
            F::numeric(140, 14, K::DebtorTaxId),       // 141-154
            F::text(154, 40, K::DebtorName),           // 155-194
            F::text(194, 40, K::DebtorAddress),        // 195-234
            F::numeric(237, 10, K::Reference),         // 238-247
            F::zeros(250, 8),                          // 251-258
            F::text(258, 40, K::AssignorName),         // 259-298
            F::numeric(304, 10, K::OurNumber),         // 305-314
            F::zeros(314, 124),                        // 315-438
            F::numeric(438, 6, K::RecordSequence),     // 439-444
        ],
    )
}

fn detail_v2() -> Result<RecordLayout, LayoutError> {
    RecordLayout::new(
        RecordKind::Detail,
        ' ',
        vec![
            F::literal(0, "1"),
            F::numeric(20, 2, K::CoObligation),        // 021-022
            F::zeros(22, 15),                          // 023-037
            F::numeric(37, 25, K::Reference),          // 038-062
            F::zeros(62, 58),                          // 063-120
            F::date(120, K::DueDate),                  // 121-126
            F::money(126, 13, K::FaceValue),           // 127-139
            F::zeros(139, 8),                          // 140-147
            F::numeric(147, 2, K::TitleSpecies),       // 148-149
            F::date(150, K::IssueDate),                // 151-156
            F::zeros(156, 64),                         // 157-220
            F::numeric(220, 14, K::DebtorTaxId),       // 221-234
            F::text(234, 40, K::DebtorName),           // 235-274
            F::text(274, 40, K::DebtorAddress),        // 275-314
            F::numeric(438, 6, K::RecordSequence),     // 439-444
        ],
    )
}

fn detail_v3() -> Result<RecordLayout, LayoutError> {
    RecordLayout::new(
        RecordKind::Detail,
        ' ',
        vec![
            F::literal(0, "1"),
            F::numeric(20, 2, K::CoObligation),        // 021-022
            F::zeros(22, 15),                          // 023-037 special traits, risk class
            F::numeric(37, 25, K::Reference),          // 038-062
            F::zeros(62, 8),                           // 063-070 bank, zeros
            F::numeric(70, 11, K::OurNumber),          // 071-081
            F::zeros(81, 11),                          // 082-092 check digit, amount paid
            F::zeros(92, 16),                          // 093-108 settlement data
            F::literal(108, "01"),                     // 109-110 occurrence: remittance
            F::numeric(110, 10, K::DocumentNumber),    // 111-120
            F::date(120, K::DueDate),                  // 121-126
            F::money(126, 13, K::FaceValue),           // 127-139
            F::zeros(139, 8),                          // 140-147
            F::numeric(147, 2, K::TitleSpecies),       // 148-149
            F::date(150, K::IssueDate),                // 151-156
            F::zeros(156, 3),                          // 157-159 instructions
            F::numeric(159, 2, K::AssignorTaxIdType),  // 160-161
            F::zeros(161, 12),                         // 162-173
            F::money(192, 13, K::PresentValue),        // 193-205
            F::zeros(205, 13),                         // 206-218 rebate
            F::numeric(218, 2, K::DebtorTaxIdType),    // 219-220
            F::numeric(220, 14, K::DebtorTaxId),       // 221-234
            F::text(234, 40, K::DebtorName),           // 235-274
            F::text(274, 40, K::DebtorAddress),        // 275-314
            F::zeros(326, 8),                          // 327-334 postal code
            F::text(334, 46, K::AssignorName),         // 335-380
            F::numeric(380, 14, K::AssignorTaxId),     // 381-394
            F::money(394, 13, K::AcquisitionValue),    // 395-407
            F::date(407, K::ReferenceDate),            // 408-413
            F::numeric(438, 6, K::RecordSequence),     // 439-444
        ],
    )
}

fn trailer_with_leading_count() -> Result<RecordLayout, LayoutError> {
    RecordLayout::new(
        RecordKind::Trailer,
        ' ',
        vec![
            F::literal(0, "9"),
            F::numeric(1, 6, K::TotalRecords),         // 002-007
            F::numeric(438, 6, K::RecordSequence),     // 439-444
        ],
    )
}

fn trailer_tail_only() -> Result<RecordLayout, LayoutError> {
    RecordLayout::new(
        RecordKind::Trailer,
        '0',
        vec![
            F::literal(0, "9"),
            F::numeric(438, 6, K::RecordSequence),     // 439-444
        ],
    )
}

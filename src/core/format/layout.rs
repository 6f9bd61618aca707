//! Fixed-width line layouts of the two record categories

use super::field::{format_spec, FieldSpec};
use crate::domain::{Field, OrgType, ProductionRecord};

/// Line terminator closing every line of the batch file
pub const LINE_TERMINATOR: &str = "\r\n";

/// Consolidated layout: 10 columns, 48 characters
pub const CONSOLIDATED_LAYOUT: &[FieldSpec] = &[
    FieldSpec::numeric(Field::LineIndicator, 2),
    FieldSpec::numeric(Field::FacilityCode, 7),
    FieldSpec::numeric(Field::Competence, 6),
    FieldSpec::alpha(Field::CboCode, 6),
    FieldSpec::numeric(Field::Page, 3),
    FieldSpec::numeric(Field::Sequence, 2),
    FieldSpec::numeric(Field::ProcedureCode, 10),
    FieldSpec::numeric(Field::Age, 3),
    FieldSpec::numeric(Field::Quantity, 6),
    FieldSpec::alpha(Field::Org, 3),
];

/// Individualized layout: 39 data columns totalling 349 characters. The CRLF
/// terminator is the 40th field and is appended by [`format_record`].
pub const INDIVIDUALIZED_LAYOUT: &[FieldSpec] = &[
    FieldSpec::numeric(Field::LineIndicator, 2),
    FieldSpec::numeric(Field::FacilityCode, 7),
    FieldSpec::numeric(Field::Competence, 6),
    FieldSpec::numeric(Field::ProfessionalId, 15),
    FieldSpec::numeric(Field::CboCode, 6),
    FieldSpec::numeric(Field::ServiceDate, 8),
    FieldSpec::numeric(Field::Page, 3),
    FieldSpec::numeric(Field::Sequence, 2),
    FieldSpec::numeric(Field::ProcedureCode, 10),
    FieldSpec::numeric(Field::PatientHealthId, 15),
    FieldSpec::alpha(Field::Sex, 1),
    FieldSpec::numeric(Field::MunicipalityCode, 6),
    FieldSpec::alpha(Field::DiagnosisCode, 4),
    FieldSpec::numeric(Field::Age, 3),
    FieldSpec::numeric(Field::Quantity, 6),
    FieldSpec::numeric(Field::CareType, 2),
    FieldSpec::alpha(Field::AuthorizationNumber, 13),
    FieldSpec::alpha(Field::Org, 3),
    FieldSpec::alpha(Field::PatientName, 30),
    FieldSpec::numeric(Field::BirthDate, 8),
    FieldSpec::numeric(Field::Race, 2),
    FieldSpec::alpha(Field::Ethnicity, 4),
    FieldSpec::numeric(Field::Nationality, 3),
    FieldSpec::alpha(Field::Service, 3),
    FieldSpec::alpha(Field::Classification, 3),
    FieldSpec::numeric(Field::TeamSequence, 8),
    FieldSpec::alpha(Field::TeamArea, 4),
    FieldSpec::numeric(Field::Cnpj, 14),
    FieldSpec::numeric(Field::PostalCode, 8),
    FieldSpec::alpha(Field::StreetType, 3),
    FieldSpec::alpha(Field::Street, 30),
    FieldSpec::alpha(Field::Complement, 10),
    FieldSpec::numeric(Field::AddressNumber, 5),
    FieldSpec::alpha(Field::Neighborhood, 30),
    FieldSpec::numeric(Field::PhoneArea, 2),
    FieldSpec::numeric(Field::Phone, 9),
    FieldSpec::alpha(Field::Email, 40),
    FieldSpec::numeric(Field::Ine, 10),
    FieldSpec::numeric(Field::PatientTaxId, 11),
];

pub fn layout_for(org_type: OrgType) -> &'static [FieldSpec] {
    match org_type {
        OrgType::Consolidated => CONSOLIDATED_LAYOUT,
        OrgType::Individualized => INDIVIDUALIZED_LAYOUT,
    }
}

/// Width of a body line of the given category, terminator excluded
pub fn line_width(org_type: OrgType) -> usize {
    layout_for(org_type).iter().map(|spec| spec.length).sum()
}

/// Encodes a record as one body line, terminator included
pub fn format_record(record: &ProductionRecord) -> String {
    let layout = layout_for(record.org_type);
    let mut line = String::with_capacity(line_width(record.org_type) + LINE_TERMINATOR.len());
    for spec in layout {
        line.push_str(&format_spec(record.value(spec.field), spec, record.org_type));
    }
    line.push_str(LINE_TERMINATOR);
    line
}

//! Production record model
//!
//! A [`ProductionRecord`] is one exportable line of the batch file. Every
//! column is kept as text exactly as staged; an empty string means absent.
//! The record encoder addresses columns through [`Field`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record category, selecting the field layout used by the encoder
///
/// Staged rows start out individualized; consolidation creates the
/// consolidated ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum OrgType {
    /// Aggregated production ("BPA-C")
    #[serde(rename = "BPA")]
    Consolidated,
    /// Per-patient production ("BPA-I")
    #[default]
    #[serde(rename = "BPI")]
    Individualized,
}

impl OrgType {
    /// Code stored in the staging table and written in the ORG column
    pub fn code(&self) -> &'static str {
        match self {
            OrgType::Consolidated => "BPA",
            OrgType::Individualized => "BPI",
        }
    }

    /// Record-type indicator opening each body line
    pub fn line_indicator(&self) -> &'static str {
        match self {
            OrgType::Consolidated => "02",
            OrgType::Individualized => "03",
        }
    }
}

impl fmt::Display for OrgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OrgType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BPA" => Ok(OrgType::Consolidated),
            "BPI" => Ok(OrgType::Individualized),
            other => Err(format!("Unknown record category '{other}'. Expected BPA or BPI")),
        }
    }
}

/// Addressable record columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Constant line indicator, not stored on the record
    LineIndicator,
    FacilityCode,
    Competence,
    ProfessionalId,
    CboCode,
    ServiceDate,
    Page,
    Sequence,
    ProcedureCode,
    PatientHealthId,
    Sex,
    MunicipalityCode,
    DiagnosisCode,
    Age,
    Quantity,
    CareType,
    AuthorizationNumber,
    Org,
    PatientName,
    BirthDate,
    Race,
    Ethnicity,
    Nationality,
    Service,
    Classification,
    TeamSequence,
    TeamArea,
    Cnpj,
    PostalCode,
    StreetType,
    Street,
    Complement,
    AddressNumber,
    Neighborhood,
    PhoneArea,
    Phone,
    Email,
    Ine,
    PatientTaxId,
}

/// One exportable production line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionRecord {
    pub org_type: OrgType,
    pub facility_code: String,
    pub competence: String,
    pub professional_id: String,
    pub cbo_code: String,
    pub page: String,
    pub sequence: String,
    pub procedure_code: String,
    pub patient_health_id: String,
    pub patient_tax_id: String,
    pub patient_name: String,
    pub birth_date: String,
    pub sex: String,
    pub race: String,
    pub ethnicity: String,
    pub nationality: String,
    pub municipality_code: String,
    pub service_date: String,
    pub diagnosis_code: String,
    pub age: String,
    pub quantity: String,
    pub care_type: String,
    pub authorization_number: String,
    pub service: String,
    pub classification: String,
    pub team_sequence: String,
    pub team_area: String,
    pub cnpj: String,
    pub postal_code: String,
    pub street_type: String,
    pub street: String,
    pub complement: String,
    pub address_number: String,
    pub neighborhood: String,
    pub phone_area: String,
    pub phone: String,
    pub email: String,
    pub ine: String,
}

impl ProductionRecord {
    /// Blank record of the given category
    pub fn new(org_type: OrgType) -> Self {
        Self {
            org_type,
            ..Default::default()
        }
    }

    pub fn is(&self, org_type: OrgType) -> bool {
        self.org_type == org_type
    }

    /// Value of a column; the line indicator comes from the category
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::LineIndicator => self.org_type.line_indicator(),
            Field::Org => self.org_type.code(),
            Field::FacilityCode => &self.facility_code,
            Field::Competence => &self.competence,
            Field::ProfessionalId => &self.professional_id,
            Field::CboCode => &self.cbo_code,
            Field::ServiceDate => &self.service_date,
            Field::Page => &self.page,
            Field::Sequence => &self.sequence,
            Field::ProcedureCode => &self.procedure_code,
            Field::PatientHealthId => &self.patient_health_id,
            Field::Sex => &self.sex,
            Field::MunicipalityCode => &self.municipality_code,
            Field::DiagnosisCode => &self.diagnosis_code,
            Field::Age => &self.age,
            Field::Quantity => &self.quantity,
            Field::CareType => &self.care_type,
            Field::AuthorizationNumber => &self.authorization_number,
            Field::PatientName => &self.patient_name,
            Field::BirthDate => &self.birth_date,
            Field::Race => &self.race,
            Field::Ethnicity => &self.ethnicity,
            Field::Nationality => &self.nationality,
            Field::Service => &self.service,
            Field::Classification => &self.classification,
            Field::TeamSequence => &self.team_sequence,
            Field::TeamArea => &self.team_area,
            Field::Cnpj => &self.cnpj,
            Field::PostalCode => &self.postal_code,
            Field::StreetType => &self.street_type,
            Field::Street => &self.street,
            Field::Complement => &self.complement,
            Field::AddressNumber => &self.address_number,
            Field::Neighborhood => &self.neighborhood,
            Field::PhoneArea => &self.phone_area,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            Field::Ine => &self.ine,
            Field::PatientTaxId => &self.patient_tax_id,
        }
    }

    /// Numeric quantity, when the stored text is a plain unsigned integer
    pub fn numeric_quantity(&self) -> Option<u64> {
        parse_digits(&self.quantity)
    }

    /// Numeric procedure code, when the stored text is all digits
    pub fn numeric_procedure(&self) -> Option<u64> {
        parse_digits(&self.procedure_code)
    }

    /// Keeps a single patient identifier, preferring the national health id.
    ///
    /// Returns true when the tax id was dropped.
    pub fn normalize_patient_identifiers(&mut self) -> bool {
        if !self.patient_health_id.trim().is_empty() && !self.patient_tax_id.trim().is_empty() {
            self.patient_tax_id.clear();
            return true;
        }
        false
    }

    /// True when any address column the individualized layout requires is blank
    pub fn has_incomplete_address(&self) -> bool {
        [
            &self.postal_code,
            &self.street,
            &self.neighborhood,
            &self.municipality_code,
        ]
        .iter()
        .any(|v| v.trim().is_empty())
    }
}

/// Parses text made only of ASCII digits (surrounding spaces allowed)
pub fn parse_digits(value: &str) -> Option<u64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_type_codes() {
        assert_eq!(OrgType::Consolidated.code(), "BPA");
        assert_eq!(OrgType::Individualized.code(), "BPI");
        assert_eq!(OrgType::Consolidated.line_indicator(), "02");
        assert_eq!(OrgType::Individualized.line_indicator(), "03");
    }

    #[test]
    fn test_org_type_from_str() {
        assert_eq!("bpi".parse::<OrgType>().unwrap(), OrgType::Individualized);
        assert_eq!(" BPA ".parse::<OrgType>().unwrap(), OrgType::Consolidated);
        assert!("XYZ".parse::<OrgType>().is_err());
    }

    #[test]
    fn test_value_reads_category_columns() {
        let mut record = ProductionRecord::new(OrgType::Individualized);
        record.patient_name = "MARIA".to_string();
        assert_eq!(record.value(Field::LineIndicator), "03");
        assert_eq!(record.value(Field::Org), "BPI");
        assert_eq!(record.value(Field::PatientName), "MARIA");
    }

    #[test]
    fn test_numeric_quantity() {
        let mut record = ProductionRecord::new(OrgType::Consolidated);
        record.quantity = "12".to_string();
        assert_eq!(record.numeric_quantity(), Some(12));
        record.quantity = "abc".to_string();
        assert_eq!(record.numeric_quantity(), None);
        record.quantity = "-3".to_string();
        assert_eq!(record.numeric_quantity(), None);
    }

    #[test]
    fn test_normalize_patient_identifiers() {
        let mut record = ProductionRecord::new(OrgType::Individualized);
        record.patient_health_id = "898001160000000".to_string();
        record.patient_tax_id = "12345678909".to_string();
        assert!(record.normalize_patient_identifiers());
        assert!(record.patient_tax_id.is_empty());

        record.patient_health_id.clear();
        record.patient_tax_id = "12345678909".to_string();
        assert!(!record.normalize_patient_identifiers());
        assert_eq!(record.patient_tax_id, "12345678909");
    }

    #[test]
    fn test_incomplete_address() {
        let mut record = ProductionRecord::new(OrgType::Individualized);
        record.postal_code = "07400959".to_string();
        record.street = "dos Expedicionários".to_string();
        record.neighborhood = "Jardim Rincão".to_string();
        assert!(record.has_incomplete_address());
        record.municipality_code = "350390".to_string();
        assert!(!record.has_incomplete_address());
    }
}

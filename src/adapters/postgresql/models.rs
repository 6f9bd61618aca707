//! Row mapping for the `tb_bpa` staging table
//!
//! Every column is TEXT; NULL reads back as an empty string.

use crate::domain::{BpaError, OrgType, ProductionRecord, Result};
use tokio_postgres::Row;

/// Staging columns in insert order
pub const STAGING_COLUMNS: [&str; 38] = [
    "prd_uid",
    "prd_cmp",
    "prd_cnsmed",
    "prd_cbo",
    "prd_flh",
    "prd_seq",
    "prd_pa",
    "prd_cnspac",
    "prd_cpf_pcnte",
    "prd_nmpac",
    "prd_dtnasc",
    "prd_sexo",
    "prd_ibge",
    "prd_dtaten",
    "prd_cid",
    "prd_idade",
    "prd_qt_p",
    "prd_caten",
    "prd_naut",
    "prd_org",
    "prd_raca",
    "prd_servico",
    "prd_classificacao",
    "prd_etnia",
    "prd_nac",
    "prd_cnpj",
    "prd_eqp_area",
    "prd_eqp_seq",
    "prd_lograd_pcnte",
    "prd_cep_pcnte",
    "prd_end_pcnte",
    "prd_compl_pcnte",
    "prd_num_pcnte",
    "prd_bairro_pcnte",
    "prd_ddtel_pcnte",
    "prd_tel_pcnte",
    "prd_email_pcnte",
    "prd_ine",
];

pub fn select_sql() -> String {
    format!("SELECT {} FROM tb_bpa", STAGING_COLUMNS.join(", "))
}

pub fn insert_sql() -> String {
    let placeholders: Vec<String> = (1..=STAGING_COLUMNS.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO tb_bpa ({}) VALUES ({})",
        STAGING_COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

/// Column values of `record`, aligned with [`STAGING_COLUMNS`]
pub fn record_values(record: &ProductionRecord) -> [&str; 38] {
    [
        record.facility_code.as_str(),
        record.competence.as_str(),
        record.professional_id.as_str(),
        record.cbo_code.as_str(),
        record.page.as_str(),
        record.sequence.as_str(),
        record.procedure_code.as_str(),
        record.patient_health_id.as_str(),
        record.patient_tax_id.as_str(),
        record.patient_name.as_str(),
        record.birth_date.as_str(),
        record.sex.as_str(),
        record.municipality_code.as_str(),
        record.service_date.as_str(),
        record.diagnosis_code.as_str(),
        record.age.as_str(),
        record.quantity.as_str(),
        record.care_type.as_str(),
        record.authorization_number.as_str(),
        record.org_type.code(),
        record.race.as_str(),
        record.service.as_str(),
        record.classification.as_str(),
        record.ethnicity.as_str(),
        record.nationality.as_str(),
        record.cnpj.as_str(),
        record.team_area.as_str(),
        record.team_sequence.as_str(),
        record.street_type.as_str(),
        record.postal_code.as_str(),
        record.street.as_str(),
        record.complement.as_str(),
        record.address_number.as_str(),
        record.neighborhood.as_str(),
        record.phone_area.as_str(),
        record.phone.as_str(),
        record.email.as_str(),
        record.ine.as_str(),
    ]
}

/// Builds a record from a row selected with [`select_sql`]
pub fn record_from_row(row: &Row) -> Result<ProductionRecord> {
    let text = |idx: usize| -> Result<String> {
        row.try_get::<_, Option<String>>(idx)
            .map(Option::unwrap_or_default)
            .map_err(|e| {
                BpaError::Database(format!("Failed to read column {}: {e}", STAGING_COLUMNS[idx]))
            })
    };

    let org = text(19)?;
    let org_type: OrgType = org.parse().map_err(BpaError::Validation)?;

    Ok(ProductionRecord {
        org_type,
        facility_code: text(0)?,
        competence: text(1)?,
        professional_id: text(2)?,
        cbo_code: text(3)?,
        page: text(4)?,
        sequence: text(5)?,
        procedure_code: text(6)?,
        patient_health_id: text(7)?,
        patient_tax_id: text(8)?,
        patient_name: text(9)?,
        birth_date: text(10)?,
        sex: text(11)?,
        municipality_code: text(12)?,
        service_date: text(13)?,
        diagnosis_code: text(14)?,
        age: text(15)?,
        quantity: text(16)?,
        care_type: text(17)?,
        authorization_number: text(18)?,
        race: text(20)?,
        service: text(21)?,
        classification: text(22)?,
        ethnicity: text(23)?,
        nationality: text(24)?,
        cnpj: text(25)?,
        team_area: text(26)?,
        team_sequence: text(27)?,
        street_type: text(28)?,
        postal_code: text(29)?,
        street: text(30)?,
        complement: text(31)?,
        address_number: text(32)?,
        neighborhood: text(33)?,
        phone_area: text(34)?,
        phone: text(35)?,
        email: text(36)?,
        ine: text(37)?,
    })
}

/// Escapes LIKE wildcards in user-provided text
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

//! The two consolidation passes
//!
//! Both passes turn individualized rows of selected procedures into
//! consolidated rows with summed quantities, then drop the source rows.
//! The first pass also forces facility diagnoses and applies the address
//! backstop; the second remaps legacy facilities and forces procedure
//! diagnoses across every row.

use super::rules::{AddressBackstop, ConsolidationRules};
use crate::config::BpaConfig;
use crate::domain::{BpaError, OrgType, ProductionRecord, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Row counts produced by one consolidation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    /// Rows whose tax id was dropped in favour of the health id
    pub identifiers_normalized: usize,
    pub consolidated_inserted: usize,
    pub individualized_deleted: usize,
    /// Groups whose usable quantities summed to zero
    pub empty_groups_skipped: usize,
    pub diagnoses_overridden: usize,
    pub facilities_remapped: usize,
    pub backstopped: usize,
}

impl ConsolidationReport {
    pub fn log_summary(&self) {
        tracing::info!(
            identifiers_normalized = self.identifiers_normalized,
            consolidated_inserted = self.consolidated_inserted,
            individualized_deleted = self.individualized_deleted,
            empty_groups_skipped = self.empty_groups_skipped,
            diagnoses_overridden = self.diagnoses_overridden,
            facilities_remapped = self.facilities_remapped,
            backstopped = self.backstopped,
            "Consolidation complete"
        );
    }
}

/// Aggregation key: facility, procedure, cbo, competence and, for the second pass, age
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    facility_code: String,
    procedure_code: String,
    cbo_code: String,
    competence: String,
    age: Option<String>,
}

impl GroupKey {
    fn of(record: &ProductionRecord, by_age: bool) -> Self {
        Self {
            facility_code: record.facility_code.clone(),
            procedure_code: record.procedure_code.clone(),
            cbo_code: record.cbo_code.clone(),
            competence: record.competence.clone(),
            age: by_age.then(|| record.age.clone()),
        }
    }

    fn into_record(self, quantity: u64) -> ProductionRecord {
        let mut record = ProductionRecord::new(OrgType::Consolidated);
        record.facility_code = self.facility_code;
        record.procedure_code = self.procedure_code;
        record.cbo_code = self.cbo_code;
        record.competence = self.competence;
        record.age = self.age.unwrap_or_else(|| "000".to_string());
        record.quantity = quantity.to_string();
        record.page = "001".to_string();
        record.sequence = "01".to_string();
        record
    }
}

/// Canonicalizes staged rows before sequencing
#[derive(Debug, Clone, Default)]
pub struct Consolidator {
    rules: ConsolidationRules,
    backstop: AddressBackstop,
}

impl Consolidator {
    pub fn new(rules: ConsolidationRules, backstop: AddressBackstop) -> Self {
        Self { rules, backstop }
    }

    pub fn from_config(config: &BpaConfig) -> Self {
        Self::new(
            ConsolidationRules::from_config(&config.consolidation),
            AddressBackstop::from_config(&config.address),
        )
    }

    pub fn rules(&self) -> &ConsolidationRules {
        &self.rules
    }

    /// Runs both passes over the in-memory record set
    ///
    /// The set is only modified when every step succeeds; on error the
    /// caller's records are left as they were.
    ///
    /// # Errors
    ///
    /// Returns [`BpaError::Consolidation`] when a group's quantity overflows
    pub fn consolidate(&self, records: &mut Vec<ProductionRecord>) -> Result<ConsolidationReport> {
        let mut working = records.clone();
        let mut report = ConsolidationReport::default();

        for record in working.iter_mut() {
            if record.normalize_patient_identifiers() {
                report.identifiers_normalized += 1;
            }
        }

        self.first_pass(&mut working, &mut report)?;
        self.second_pass(&mut working, &mut report)?;

        *records = working;
        Ok(report)
    }

    fn first_pass(
        &self,
        records: &mut Vec<ProductionRecord>,
        report: &mut ConsolidationReport,
    ) -> Result<()> {
        let groups = aggregate(records, &self.rules.grouped_procedures, false)?;
        insert_groups(records, groups, report);

        let before = records.len();
        records.retain(|r| {
            !(r.is(OrgType::Individualized) && self.rules.is_removed_in_first_pass(&r.procedure_code))
        });
        report.individualized_deleted += before - records.len();

        for record in records.iter_mut() {
            if let Some(diagnosis) = self.rules.facility_diagnosis.get(&record.facility_code) {
                if record.diagnosis_code != *diagnosis {
                    record.diagnosis_code = diagnosis.clone();
                    report.diagnoses_overridden += 1;
                }
            }

            if record.is(OrgType::Individualized) && self.backstop.applies_to(record) {
                tracing::debug!(
                    facility = %record.facility_code,
                    postal_code = %record.postal_code,
                    "Applying fallback address"
                );
                self.backstop.apply(record);
                report.backstopped += 1;
            }
        }

        Ok(())
    }

    fn second_pass(
        &self,
        records: &mut Vec<ProductionRecord>,
        report: &mut ConsolidationReport,
    ) -> Result<()> {
        let groups = aggregate(records, &self.rules.age_grouped_procedures, true)?;
        insert_groups(records, groups, report);

        let before = records.len();
        records.retain(|r| {
            !(r.is(OrgType::Individualized)
                && self.rules.age_grouped_procedures.contains(&r.procedure_code))
        });
        report.individualized_deleted += before - records.len();

        for record in records.iter_mut() {
            if let Some(current) = self.rules.facility_remap.get(&record.facility_code) {
                record.facility_code = current.clone();
                report.facilities_remapped += 1;
            }
            if let Some(diagnosis) = self.rules.procedure_diagnosis.get(&record.procedure_code) {
                if record.diagnosis_code != *diagnosis {
                    record.diagnosis_code = diagnosis.clone();
                    report.diagnoses_overridden += 1;
                }
            }
        }

        Ok(())
    }
}

/// Sums usable quantities of the individualized rows whose procedure is in `procedures`
fn aggregate(
    records: &[ProductionRecord],
    procedures: &BTreeSet<String>,
    by_age: bool,
) -> Result<BTreeMap<GroupKey, u64>> {
    let mut groups: BTreeMap<GroupKey, u64> = BTreeMap::new();

    for record in records
        .iter()
        .filter(|r| r.is(OrgType::Individualized) && procedures.contains(&r.procedure_code))
    {
        let total = groups.entry(GroupKey::of(record, by_age)).or_insert(0);
        match record.numeric_quantity() {
            Some(quantity) => {
                *total = total.checked_add(quantity).ok_or_else(|| {
                    BpaError::Consolidation(format!(
                        "Quantity overflow aggregating procedure {} at facility {}",
                        record.procedure_code, record.facility_code
                    ))
                })?;
            }
            None => {
                tracing::debug!(
                    facility = %record.facility_code,
                    procedure = %record.procedure_code,
                    quantity = %record.quantity,
                    "Ignoring non-numeric quantity"
                );
            }
        }
    }

    Ok(groups)
}

fn insert_groups(
    records: &mut Vec<ProductionRecord>,
    groups: BTreeMap<GroupKey, u64>,
    report: &mut ConsolidationReport,
) {
    for (key, quantity) in groups {
        if quantity == 0 {
            tracing::warn!(
                facility = %key.facility_code,
                procedure = %key.procedure_code,
                "Skipping group without a positive quantity"
            );
            report.empty_groups_skipped += 1;
            continue;
        }
        records.push(key.into_record(quantity));
        report.consolidated_inserted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(facility: &str, procedure: &str, quantity: &str) -> ProductionRecord {
        let mut r = ProductionRecord::new(OrgType::Individualized);
        r.facility_code = facility.to_string();
        r.competence = "202403".to_string();
        r.professional_id = "708000000000001".to_string();
        r.cbo_code = "225125".to_string();
        r.procedure_code = procedure.to_string();
        r.quantity = quantity.to_string();
        r.age = "034".to_string();
        r.patient_name = "MARIA DA SILVA".to_string();
        r.postal_code = "07401050".to_string();
        r.street = "Rua Brasil".to_string();
        r.neighborhood = "Centro".to_string();
        r.municipality_code = "350390".to_string();
        r.page = "001".to_string();
        r.sequence = "01".to_string();
        r
    }

    fn consolidated(records: &[ProductionRecord]) -> Vec<&ProductionRecord> {
        records.iter().filter(|r| r.is(OrgType::Consolidated)).collect()
    }

    #[test]
    fn test_first_pass_sums_quantities() {
        let mut records = vec![
            staged("6896847", "0101010010", "2"),
            staged("6896847", "0101010010", "3"),
            staged("6896847", "0301010064", "1"),
        ];
        let report = Consolidator::default().consolidate(&mut records).unwrap();

        let grouped: Vec<_> = consolidated(&records)
            .into_iter()
            .filter(|r| r.procedure_code == "0101010010")
            .collect();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].quantity, "5");
        assert_eq!(grouped[0].age, "000");
        assert_eq!(grouped[0].page, "001");
        assert_eq!(grouped[0].sequence, "01");
        assert!(grouped[0].patient_name.is_empty());
        assert!(!records
            .iter()
            .any(|r| r.is(OrgType::Individualized) && r.procedure_code == "0101010010"));
        assert_eq!(report.consolidated_inserted, 2);
        assert_eq!(report.individualized_deleted, 3);
    }

    #[test]
    fn test_non_numeric_quantity_is_excluded_from_sum() {
        let mut records = vec![
            staged("6896847", "0101010010", "4"),
            staged("6896847", "0101010010", "abc"),
        ];
        Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity, "4");
    }

    #[test]
    fn test_group_without_usable_quantity_is_skipped() {
        let mut records = vec![staged("6896847", "0101010010", "x")];
        let report = Consolidator::default().consolidate(&mut records).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.empty_groups_skipped, 1);
        assert_eq!(report.individualized_deleted, 1);
    }

    #[test]
    fn test_groups_split_by_cbo_and_competence() {
        let mut other_cbo = staged("6896847", "0101010010", "1");
        other_cbo.cbo_code = "322205".to_string();
        let mut other_competence = staged("6896847", "0101010010", "1");
        other_competence.competence = "202402".to_string();
        let mut records = vec![staged("6896847", "0101010010", "1"), other_cbo, other_competence];

        Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(consolidated(&records).len(), 3);
    }

    #[test]
    fn test_deprecated_rows_are_removed() {
        let mut records = vec![
            staged("6896847", "0214010082", "1"),
            staged("6896847", "ABPG0001", "1"),
            staged("6896847", "00ABEX01", "1"),
            staged("6896847", "0301010064", "1"),
        ];
        let mut keep = staged("6896847", "0201010046", "1");
        keep.diagnosis_code = "K359".to_string();
        records.push(keep);

        let report = Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(report.individualized_deleted, 4);
        assert_eq!(records.iter().filter(|r| r.is(OrgType::Individualized)).count(), 1);
    }

    #[test]
    fn test_second_pass_groups_by_age() {
        let mut older = staged("6896847", "0301010064", "1");
        older.age = "071".to_string();
        let mut records = vec![
            staged("6896847", "0301010064", "1"),
            staged("6896847", "0301010064", "2"),
            older,
        ];
        Consolidator::default().consolidate(&mut records).unwrap();

        let mut by_age: Vec<(String, String)> = consolidated(&records)
            .iter()
            .map(|r| (r.age.clone(), r.quantity.clone()))
            .collect();
        by_age.sort();
        assert_eq!(
            by_age,
            vec![
                ("034".to_string(), "3".to_string()),
                ("071".to_string(), "1".to_string())
            ]
        );
        assert!(records.iter().all(|r| r.is(OrgType::Consolidated)));
    }

    #[test]
    fn test_facility_diagnosis_runs_before_remap() {
        let mut records = vec![staged("0491381", "0201010046", "1")];
        Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(records[0].facility_code, "6430163");
        // procedure override runs last and wins
        assert_eq!(records[0].diagnosis_code, "K629");

        let mut records = vec![staged("0491381", "0211060100", "1")];
        Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(records[0].diagnosis_code, "G804");
        assert_eq!(records[0].facility_code, "6430163");
    }

    #[test]
    fn test_remap_applies_to_inserted_rows() {
        let mut records = vec![staged("0000001", "0101010010", "1")];
        let report = Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(records[0].facility_code, "6896847");
        assert_eq!(report.facilities_remapped, 1);
    }

    #[test]
    fn test_backstop_only_touches_individualized_rows() {
        let mut placeholder = staged("6896847", "0211060100", "1");
        placeholder.postal_code = "07400000".to_string();
        let mut records = vec![placeholder, staged("6896847", "0101010010", "1")];

        let report = Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(report.backstopped, 1);
        let individual = records
            .iter()
            .find(|r| r.is(OrgType::Individualized))
            .unwrap();
        assert_eq!(individual.postal_code, "07400959");
        let grouped = records.iter().find(|r| r.is(OrgType::Consolidated)).unwrap();
        assert!(grouped.postal_code.is_empty());
    }

    #[test]
    fn test_identifiers_are_normalized() {
        let mut record = staged("6896847", "0211060100", "1");
        record.patient_health_id = "898001160000000".to_string();
        record.patient_tax_id = "12345678909".to_string();
        let mut records = vec![record];
        let report = Consolidator::default().consolidate(&mut records).unwrap();
        assert_eq!(report.identifiers_normalized, 1);
        assert!(records[0].patient_tax_id.is_empty());
    }

    #[test]
    fn test_rerun_inserts_nothing() {
        let mut records = vec![
            staged("6896847", "0101010010", "2"),
            staged("6896847", "0301010064", "1"),
            staged("6896847", "0211060100", "1"),
        ];
        let consolidator = Consolidator::default();
        consolidator.consolidate(&mut records).unwrap();
        let snapshot = records.clone();

        let report = consolidator.consolidate(&mut records).unwrap();
        assert_eq!(report.consolidated_inserted, 0);
        assert_eq!(report.individualized_deleted, 0);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn test_overflow_leaves_records_untouched() {
        let mut records = vec![
            staged("6896847", "0101010010", &u64::MAX.to_string()),
            staged("6896847", "0101010010", "1"),
        ];
        let snapshot = records.clone();
        let err = Consolidator::default().consolidate(&mut records).unwrap_err();
        assert!(matches!(err, BpaError::Consolidation(_)));
        assert_eq!(records, snapshot);
    }
}

//! Page/sequence assignment for both record categories
//!
//! Each category gets its own pass through a [`SequenceAssigner`]:
//!
//! - consolidated rows are visited by (facility, procedure, cbo, page, sequence)
//!   and every row takes the next slot
//! - individualized rows are visited by (facility, professional, cbo, page,
//!   sequence) and consecutive rows describing the same clinical episode share
//!   a slot
//!
//! Both restart at page 1 on every new facility and hold at most
//! [`PAGE_SIZE`] slots per page. Re-running on an already sequenced set gives
//! the same assignment.

pub mod assigner;

pub use assigner::{SequenceAssigner, SequenceCounter, MAX_PAGE, PAGE_SIZE};

use crate::domain::{OrgType, ProductionRecord, Result};
use std::cmp::Ordering;

/// Rows sharing this tuple with the preceding row keep its sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeIdentity {
    pub facility_code: String,
    pub procedure_code: String,
    pub professional_id: String,
    pub patient_name: String,
    pub service_date: String,
    pub diagnosis_code: String,
}

impl EpisodeIdentity {
    pub fn of(record: &ProductionRecord) -> Self {
        Self {
            facility_code: record.facility_code.clone(),
            procedure_code: record.procedure_code.clone(),
            professional_id: record.professional_id.clone(),
            patient_name: record.patient_name.clone(),
            service_date: record.service_date.clone(),
            diagnosis_code: record.diagnosis_code.clone(),
        }
    }
}

/// Highest page reached by each pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub consolidated_max_page: u32,
    pub individualized_max_page: u32,
}

impl Pagination {
    /// Page count written into the header
    pub fn page_count(&self) -> u32 {
        self.consolidated_max_page + self.individualized_max_page
    }
}

fn facility(record: &ProductionRecord) -> &str {
    &record.facility_code
}

fn consolidated_order(a: &ProductionRecord, b: &ProductionRecord) -> Ordering {
    (&a.facility_code, &a.procedure_code, &a.cbo_code, &a.page, &a.sequence).cmp(&(
        &b.facility_code,
        &b.procedure_code,
        &b.cbo_code,
        &b.page,
        &b.sequence,
    ))
}

fn individualized_order(a: &ProductionRecord, b: &ProductionRecord) -> Ordering {
    (&a.facility_code, &a.professional_id, &a.cbo_code, &a.page, &a.sequence).cmp(&(
        &b.facility_code,
        &b.professional_id,
        &b.cbo_code,
        &b.page,
        &b.sequence,
    ))
}

pub fn consolidated_assigner() -> SequenceAssigner<()> {
    SequenceAssigner::new(OrgType::Consolidated, consolidated_order, facility, |_| None)
}

pub fn individualized_assigner() -> SequenceAssigner<EpisodeIdentity> {
    SequenceAssigner::new(
        OrgType::Individualized,
        individualized_order,
        facility,
        |r| Some(EpisodeIdentity::of(r)),
    )
}

/// Runs both passes in place
pub fn sequence_records(records: &mut [ProductionRecord]) -> Result<Pagination> {
    let consolidated_max_page = consolidated_assigner().assign(records)?;
    let individualized_max_page = individualized_assigner().assign(records)?;

    tracing::debug!(
        consolidated_max_page,
        individualized_max_page,
        "Sequencing complete"
    );

    Ok(Pagination {
        consolidated_max_page,
        individualized_max_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consolidated(facility: &str, page: u32, sequence: u32) -> ProductionRecord {
        let mut r = ProductionRecord::new(OrgType::Consolidated);
        r.facility_code = facility.to_string();
        r.procedure_code = "0301010110".to_string();
        r.cbo_code = "225125".to_string();
        r.page = format!("{page:03}");
        r.sequence = format!("{sequence:02}");
        r
    }

    fn episode(professional: &str, patient: &str, procedure: &str) -> ProductionRecord {
        let mut r = ProductionRecord::new(OrgType::Individualized);
        r.facility_code = "6430163".to_string();
        r.professional_id = professional.to_string();
        r.cbo_code = "225142".to_string();
        r.patient_name = patient.to_string();
        r.procedure_code = procedure.to_string();
        r.service_date = "20240312".to_string();
        r.page = "001".to_string();
        r.sequence = "01".to_string();
        r
    }

    #[test]
    fn test_twenty_five_consolidated_rows_span_two_pages() {
        let mut records: Vec<ProductionRecord> = (0..25)
            .map(|i| consolidated("1234567", 1, i + 1))
            .collect();

        let pagination = sequence_records(&mut records).unwrap();

        for r in &records[..20] {
            assert_eq!(r.page, "001");
        }
        for r in &records[20..] {
            assert_eq!(r.page, "002");
        }
        assert_eq!(records[24].sequence, "05");
        assert_eq!(pagination.consolidated_max_page, 2);
        assert_eq!(pagination.individualized_max_page, 0);
        assert_eq!(pagination.page_count(), 2);
    }

    #[test]
    fn test_identical_episodes_share_sequence() {
        let mut records = vec![
            episode("708000000000001", "ANA", "0301010064"),
            episode("708000000000001", "ANA", "0301010064"),
            episode("708000000000001", "BIA", "0301010064"),
        ];
        sequence_records(&mut records).unwrap();
        assert_eq!(records[0].sequence, records[1].sequence);
        assert_eq!(records[2].sequence, "02");
    }

    #[test]
    fn test_sequences_stay_in_range() {
        let mut records: Vec<ProductionRecord> = (0..137)
            .map(|i| episode(&format!("{:015}", i % 4), &format!("P{i}"), "0301010064"))
            .collect();
        let pagination = sequence_records(&mut records).unwrap();

        for r in &records {
            let sequence: u32 = r.sequence.parse().unwrap();
            let page: u32 = r.page.parse().unwrap();
            assert!((1..=PAGE_SIZE).contains(&sequence));
            assert!((1..=pagination.individualized_max_page).contains(&page));
        }
        assert_eq!(pagination.individualized_max_page, 7);
    }

    #[test]
    fn test_facilities_restart_independently() {
        let mut records: Vec<ProductionRecord> = (0..21)
            .map(|i| consolidated("1111111", 1, i + 1))
            .chain((0..3).map(|i| consolidated("2222222", 1, i + 1)))
            .collect();
        let pagination = sequence_records(&mut records).unwrap();
        assert_eq!(records[21].page, "001");
        assert_eq!(records[21].sequence, "01");
        assert_eq!(pagination.consolidated_max_page, 2);
    }

    #[test]
    fn test_resequencing_is_idempotent() {
        let mut records: Vec<ProductionRecord> = (0..45)
            .map(|i| episode(&format!("{:015}", i % 3), &format!("P{}", i / 2), "0301010064"))
            .chain((0..30).map(|i| consolidated("6896847", 9, i % 7)))
            .collect();

        let first_pass = sequence_records(&mut records).unwrap();
        let snapshot = records.clone();
        let second_pass = sequence_records(&mut records).unwrap();

        assert_eq!(first_pass, second_pass);
        assert_eq!(snapshot, records);
    }
}

//! Generation summary and reporting

use crate::core::address::RepairSummary;
use crate::core::consolidation::ConsolidationReport;
use crate::domain::Competence;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Result of one generation job
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    /// Where the batch file was (or, in a dry run, would have been) written
    pub output_path: PathBuf,
    pub competence: Competence,
    /// Header line included
    pub record_count: usize,
    pub page_count: u32,
    pub control_field: u32,
    pub consolidation: ConsolidationReport,
    /// `None` when address repair did not run
    pub repair: Option<RepairSummary>,
    pub dry_run: bool,
    pub duration: Duration,
}

impl GenerationSummary {
    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            output_path = %self.output_path.display(),
            competence = %self.competence,
            record_count = self.record_count,
            page_count = self.page_count,
            control_field = self.control_field,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Batch file generation completed"
        );
        self.consolidation.log_summary();
        if let Some(repair) = &self.repair {
            repair.log_summary();
        }
    }

    /// Machine-readable view printed by the CLI
    pub fn report(&self) -> GenerationReport {
        GenerationReport {
            output_path: self.output_path.display().to_string(),
            competence: self.competence.to_string(),
            record_count: self.record_count,
            page_count: self.page_count,
            control_field: self.control_field,
            consolidated_inserted: self.consolidation.consolidated_inserted,
            individualized_deleted: self.consolidation.individualized_deleted,
            addresses_repaired: self
                .repair
                .map(|r| r.updated + r.replaced)
                .unwrap_or_default(),
            dry_run: self.dry_run,
            duration_ms: self.duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub output_path: String,
    pub competence: String,
    pub record_count: usize,
    pub page_count: u32,
    pub control_field: u32,
    pub consolidated_inserted: usize,
    pub individualized_deleted: usize,
    pub addresses_repaired: usize,
    pub dry_run: bool,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_repaired_addresses() {
        let summary = GenerationSummary {
            output_path: PathBuf::from("/srv/bpa/bpa_202403.txt"),
            competence: Competence::new("202403").unwrap(),
            record_count: 12,
            page_count: 2,
            control_field: 1500,
            consolidation: ConsolidationReport::default(),
            repair: Some(RepairSummary {
                total: 5,
                updated: 2,
                replaced: 1,
                failed: 2,
                skipped: 0,
            }),
            dry_run: false,
            duration: Duration::from_millis(1250),
        };

        let report = summary.report();
        assert_eq!(report.addresses_repaired, 3);
        assert_eq!(report.duration_ms, 1250);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["competence"], "202403");
        assert_eq!(json["output_path"], "/srv/bpa/bpa_202403.txt");
    }
}

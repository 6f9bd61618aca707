//! File assembler - main orchestrator for batch generation
//!
//! Runs the whole job against a staging store: consolidation, optional
//! address repair, sequencing, persistence of the prepared rows, encoding,
//! and the atomic write of the batch file.

use super::output::{encode_batch, output_file_name, sort_for_output, write_atomically};
use super::summary::GenerationSummary;
use crate::adapters::database::StagingStore;
use crate::config::{BpaConfig, OutputConfig};
use crate::core::address::AddressRepairer;
use crate::core::consolidation::Consolidator;
use crate::core::format::{BatchHeader, Submitter};
use crate::core::job::JobContext;
use crate::core::sequencing::sequence_records;
use crate::domain::{BpaError, Competence, ProductionRecord, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Per-run switches, usually taken from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Competence written in the header and file name; read from the
    /// staging store when absent, the current month as a last resort
    pub competence: Option<Competence>,
    /// Overrides `output.directory`
    pub output_dir: Option<PathBuf>,
    pub repair_addresses: bool,
    /// Leaves the staging store and the output directory untouched
    pub dry_run: bool,
}

impl GenerationOptions {
    pub fn from_config(config: &BpaConfig) -> Self {
        Self {
            competence: None,
            output_dir: None,
            repair_addresses: config.address.repair_during_generation,
            dry_run: config.application.dry_run,
        }
    }
}

/// File assembler
pub struct FileAssembler {
    staging: Arc<dyn StagingStore>,
    consolidator: Consolidator,
    repairer: Option<AddressRepairer>,
    submitter: Submitter,
    output: OutputConfig,
}

impl FileAssembler {
    /// Create a new assembler; without a repairer the repair step is skipped
    pub fn new(
        config: &BpaConfig,
        staging: Arc<dyn StagingStore>,
        repairer: Option<AddressRepairer>,
    ) -> Self {
        Self {
            staging,
            consolidator: Consolidator::from_config(config),
            repairer,
            submitter: Submitter::from(&config.submission),
            output: config.output.clone(),
        }
    }

    /// Execute the generation
    ///
    /// Progress milestones go to the context sink: 25 once records are
    /// consolidated (and repaired), 50 once they are sequenced and
    /// persisted, 75 once encoded, 100 once the file is in place. Any error
    /// is reported through [`JobContext::fail`] before being returned.
    ///
    /// Consolidated rows are written back before address repair starts and
    /// stay committed when a later step fails.
    pub async fn execute_generation(
        &self,
        options: &GenerationOptions,
        ctx: &JobContext,
    ) -> Result<GenerationSummary> {
        match self.generate(options, ctx).await {
            Ok(summary) => {
                ctx.finish();
                Ok(summary)
            }
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::error!(task_id = %ctx.task_id(), error = %e, "Batch file generation failed");
                }
                ctx.fail(&e);
                Err(e)
            }
        }
    }

    async fn generate(
        &self,
        options: &GenerationOptions,
        ctx: &JobContext,
    ) -> Result<GenerationSummary> {
        let start_time = Instant::now();
        tracing::info!(
            task_id = %ctx.task_id(),
            dry_run = options.dry_run,
            repair_addresses = options.repair_addresses && self.repairer.is_some(),
            "Starting batch file generation"
        );

        ctx.ensure_active()?;
        let competence = self.resolve_competence(options).await?;

        let mut records = self.staging.load_records().await?;
        if records.is_empty() {
            return Err(BpaError::Validation(
                "No staged production records to export".to_string(),
            ));
        }
        tracing::info!(record_count = records.len(), competence = %competence, "Loaded staged records");

        let consolidation = self.consolidator.consolidate(&mut records)?;
        self.persist(&records, options, "consolidated").await?;

        let repair = match &self.repairer {
            Some(repairer) if options.repair_addresses => {
                Some(repairer.repair(&mut records, ctx).await?)
            }
            _ => None,
        };
        ctx.report(25);

        ctx.ensure_active()?;
        let pagination = sequence_records(&mut records)?;
        self.persist(&records, options, "sequenced").await?;
        ctx.report(50);

        ctx.ensure_active()?;
        sort_for_output(&mut records);
        let header = BatchHeader::build(
            competence.clone(),
            &records,
            pagination.page_count(),
            self.submitter.clone(),
        );
        let contents = encode_batch(&header, &records)?;
        ctx.report(75);

        let output_path = self.output_path(options, &competence);
        if options.dry_run {
            tracing::info!(
                path = %output_path.display(),
                bytes = contents.len(),
                "Dry run: batch file not written"
            );
        } else {
            write_atomically(output_path.clone(), contents).await?;
        }

        let summary = GenerationSummary {
            output_path,
            competence,
            record_count: header.record_count,
            page_count: header.page_count,
            control_field: header.control_field,
            consolidation,
            repair,
            dry_run: options.dry_run,
            duration: start_time.elapsed(),
        };
        summary.log_summary();
        Ok(summary)
    }

    async fn persist(
        &self,
        records: &[ProductionRecord],
        options: &GenerationOptions,
        stage: &'static str,
    ) -> Result<()> {
        if options.dry_run {
            tracing::debug!(stage, "Dry run: staged records left unchanged");
            return Ok(());
        }
        self.staging.replace_records(records).await?;
        tracing::debug!(stage, record_count = records.len(), "Staged records persisted");
        Ok(())
    }

    async fn resolve_competence(&self, options: &GenerationOptions) -> Result<Competence> {
        if let Some(competence) = &options.competence {
            return Ok(competence.clone());
        }
        if let Some(competence) = self.staging.competence().await? {
            return Ok(competence);
        }
        let current = Competence::current();
        tracing::warn!(
            competence = %current,
            "No competence given or staged, using the current month"
        );
        Ok(current)
    }

    fn output_path(&self, options: &GenerationOptions, competence: &Competence) -> PathBuf {
        let directory = options
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.output.directory));
        directory.join(output_file_name(
            &self.output.file_prefix,
            competence,
            &self.output.file_extension,
        ))
    }
}

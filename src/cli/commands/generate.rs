//! Generate command implementation
//!
//! Runs the full batch generation job against the configured staging store.

use super::{connect_or_report, exit_code_for, load_or_report, EXIT_CONFIGURATION, EXIT_FATAL};
use crate::core::address::{AddressRepairer, AddressResolver};
use crate::core::assembly::{FileAssembler, GenerationOptions};
use crate::core::job::{JobContext, TracingProgressSink};
use crate::domain::Competence;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Competence (YYYYMM) for the header and file name; defaults to the staged one
    #[arg(long, value_name = "YYYYMM")]
    pub competence: Option<String>,

    /// Directory receiving the batch file, overriding output.directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip postal-code repair during generation
    #[arg(long)]
    pub skip_address_repair: bool,

    /// Dry run mode - leave the staging store and output directory untouched
    #[arg(long)]
    pub dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(
        &self,
        config_path: &str,
        cancellation: CancellationToken,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting generate command");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let mut options = GenerationOptions::from_config(&config);
        if let Some(raw) = &self.competence {
            match Competence::new(raw.trim()) {
                Ok(competence) => options.competence = Some(competence),
                Err(e) => {
                    eprintln!("❌ Invalid --competence: {e}");
                    return Ok(EXIT_CONFIGURATION);
                }
            }
        }
        if let Some(dir) = &self.output_dir {
            tracing::info!(output_dir = %dir.display(), "Overriding output directory from CLI");
            options.output_dir = Some(dir.clone());
        }
        if self.skip_address_repair {
            options.repair_addresses = false;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            options.dry_run = true;
        }

        if options.dry_run {
            println!("🔍 DRY RUN MODE - nothing will be persisted or written");
            println!();
        }

        let (staging, cache) = match connect_or_report(&config).await {
            Ok(stores) => stores,
            Err(code) => return Ok(code),
        };

        let repairer = if options.repair_addresses {
            match AddressResolver::from_config(&config.address, cache) {
                Ok(resolver) => {
                    tracing::debug!(strategies = ?resolver.strategy_names(), "Address resolver ready");
                    Some(AddressRepairer::new(resolver))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build address resolver");
                    eprintln!("❌ Failed to build address resolver: {e}");
                    return Ok(EXIT_FATAL);
                }
            }
        } else {
            None
        };

        let assembler = FileAssembler::new(&config, staging, repairer);
        let ctx = JobContext::start("generate", cancellation, Arc::new(TracingProgressSink));

        println!("🚀 Generating batch file...");
        let summary = match assembler.execute_generation(&options, &ctx).await {
            Ok(s) => s,
            Err(e) if e.is_cancelled() => {
                println!();
                println!("⚠️  Generation cancelled. No batch file was written.");
                return Ok(exit_code_for(&e));
            }
            Err(e) => {
                eprintln!("❌ Generation failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary.report())?);
            return Ok(0);
        }

        println!();
        println!("📊 Generation Summary:");
        println!("  Competence: {}", summary.competence);
        println!("  Output: {}", summary.output_path.display());
        println!("  Lines (header included): {}", summary.record_count);
        println!("  Pages: {}", summary.page_count);
        println!("  Control field: {}", summary.control_field);
        println!(
            "  Consolidated rows inserted: {}",
            summary.consolidation.consolidated_inserted
        );
        println!(
            "  Individualized rows deleted: {}",
            summary.consolidation.individualized_deleted
        );
        if let Some(repair) = &summary.repair {
            println!(
                "  Postal codes: {} total, {} updated, {} replaced, {} failed",
                repair.total, repair.updated, repair.replaced, repair.failed
            );
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        if summary.dry_run {
            println!("✅ Dry run completed");
        } else {
            println!("✅ Batch file generated successfully!");
        }
        Ok(0)
    }
}

//! Repair-addresses command implementation

use super::{connect_or_report, exit_code_for, load_or_report, EXIT_FATAL};
use crate::core::address::{AddressRepairer, AddressResolver};
use crate::core::assembly::repair_staged_addresses;
use crate::core::job::{JobContext, TracingProgressSink};
use clap::Args;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Arguments for the repair-addresses command
#[derive(Args, Debug)]
pub struct RepairAddressesArgs {
    /// Resolve addresses without persisting them
    #[arg(long)]
    pub dry_run: bool,
}

impl RepairAddressesArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        cancellation: CancellationToken,
    ) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let dry_run = self.dry_run || config.application.dry_run;

        let (staging, cache) = match connect_or_report(&config).await {
            Ok(stores) => stores,
            Err(code) => return Ok(code),
        };
        let resolver = match AddressResolver::from_config(&config.address, cache) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Failed to build address resolver: {e}");
                return Ok(EXIT_FATAL);
            }
        };
        let repairer = AddressRepairer::new(resolver);
        let ctx = JobContext::start(
            "repair-addresses",
            cancellation,
            Arc::new(TracingProgressSink),
        );

        println!("🔎 Resolving staged postal codes...");
        match repair_staged_addresses(staging.as_ref(), &repairer, dry_run, &ctx).await {
            Ok(summary) => {
                println!();
                println!("📊 Repair Summary:");
                println!("  Postal codes: {}", summary.total);
                println!("  Updated: {}", summary.updated);
                println!("  Replaced: {}", summary.replaced);
                println!("  Not found: {}", summary.failed);
                println!("  Invalid: {}", summary.skipped);
                if dry_run {
                    println!("  (dry run, nothing persisted)");
                }
                Ok(0)
            }
            Err(e) => {
                if e.is_cancelled() {
                    println!("⚠️  Repair cancelled. Nothing was persisted.");
                } else {
                    eprintln!("❌ Address repair failed: {e}");
                }
                Ok(exit_code_for(&e))
            }
        }
    }
}

//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the bpagen configuration file.

use super::{connect_or_report, load_or_report, EXIT_CONNECTION};
use crate::config::BpaConfig;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also open a connection to the staging database
    #[arg(long)]
    pub check_connection: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);

        if self.check_connection {
            let (staging, _cache) = match connect_or_report(&config).await {
                Ok(stores) => stores,
                Err(code) => return Ok(code),
            };
            if let Err(e) = staging.test_connection().await {
                println!("❌ Staging database unreachable: {e}");
                return Ok(EXIT_CONNECTION);
            }
            println!("✅ Staging database reachable");
        }
        Ok(0)
    }
}

fn print_summary(config: &BpaConfig) {
    let providers = &config.address.providers;
    let enabled: Vec<&str> = [
        ("opencep", providers.opencep.enabled),
        ("viacep", providers.viacep.enabled),
        ("apicep", providers.apicep.enabled),
    ]
    .into_iter()
    .filter_map(|(name, on)| on.then_some(name))
    .collect();

    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!(
        "  Staging Database: {}",
        config.staging.connection_string.expose_secret().redacted()
    );
    println!("  Max Connections: {}", config.staging.max_connections);
    println!(
        "  Submitter: {} ({})",
        config.submission.responsible_name, config.submission.responsible_acronym
    );
    println!(
        "  Destination: {} [{}]",
        config.submission.destination_name, config.submission.destination_indicator
    );
    println!("  Output Directory: {}", config.output.directory);
    println!(
        "  Address Repair: {}",
        if config.address.repair_during_generation {
            "during generation"
        } else {
            "manual only"
        }
    );
    println!("  Address Providers: {enabled:?}");
    println!();
}

//! Set-address command implementation
//!
//! Manual correction for postal codes no strategy could resolve.

use super::{connect_or_report, exit_code_for, load_or_report, EXIT_CONFIGURATION};
use crate::core::assembly::set_staged_address;
use crate::domain::PostalCode;
use clap::Args;

/// Arguments for the set-address command
#[derive(Args, Debug)]
pub struct SetAddressArgs {
    /// Postal code (CEP), with or without punctuation
    #[arg(long, value_name = "CEP")]
    pub postal_code: String,

    /// Street name to write
    #[arg(long)]
    pub street: String,

    /// Neighborhood to write
    #[arg(long)]
    pub neighborhood: String,

    /// Count the affected records without persisting
    #[arg(long)]
    pub dry_run: bool,
}

impl SetAddressArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(postal_code) = PostalCode::normalize(&self.postal_code) else {
            eprintln!(
                "❌ Invalid postal code '{}': expected 8 digits",
                self.postal_code
            );
            return Ok(EXIT_CONFIGURATION);
        };
        if self.street.trim().is_empty() {
            eprintln!("❌ --street cannot be empty");
            return Ok(EXIT_CONFIGURATION);
        }

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let (staging, _cache) = match connect_or_report(&config).await {
            Ok(stores) => stores,
            Err(code) => return Ok(code),
        };

        let dry_run = self.dry_run || config.application.dry_run;
        match set_staged_address(
            staging.as_ref(),
            &postal_code,
            &self.street,
            &self.neighborhood,
            dry_run,
        )
        .await
        {
            Ok(0) => {
                println!("⚠️  No staged record carries postal code {}", postal_code.hyphenated());
                Ok(0)
            }
            Ok(changed) => {
                println!(
                    "✅ {} record(s) with postal code {} {}",
                    changed,
                    postal_code.hyphenated(),
                    if dry_run { "would be updated" } else { "updated" }
                );
                Ok(0)
            }
            Err(e) => {
                eprintln!("❌ Failed to set address: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_address_rejects_bad_postal_code() {
        let args = SetAddressArgs {
            postal_code: "0740".to_string(),
            street: "Brasil".to_string(),
            neighborhood: "Centro".to_string(),
            dry_run: true,
        };
        assert_eq!(
            args.execute("unused-bpagen.toml").await.unwrap(),
            EXIT_CONFIGURATION
        );
    }
}

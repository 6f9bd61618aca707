//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for bpagen using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// BPAgen - BPA batch file generator
#[derive(Parser, Debug)]
#[command(name = "bpagen")]
#[command(version, about, long_about = None)]
#[command(author = "BPAgen Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bpagen.toml", env = "BPAGEN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BPAGEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Consolidate, sequence and write the batch file for a competence
    Generate(commands::generate::GenerateArgs),

    /// Resolve every staged postal code and rewrite the addresses
    RepairAddresses(commands::repair::RepairAddressesArgs),

    /// Set street and neighborhood for every staged record with a postal code
    SetAddress(commands::set_address::SetAddressArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

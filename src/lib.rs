// BPAgen - BPA batch file generator
// Copyright (c) 2025 BPAgen Contributors
// Licensed under the MIT License

//! # BPAgen - BPA batch file generator
//!
//! BPAgen turns staged ambulatory-production rows into the fixed-width batch
//! file submitted to the national outpatient production system (BPA).
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Consolidating** individualized rows of aggregated procedures into
//!   consolidated rows, and applying the diagnosis and facility overrides
//! - **Repairing** patient addresses through a local cache and public
//!   postal-code services
//! - **Sequencing** records into pages of twenty lines per facility
//! - **Encoding** the header and every record into fixed-width lines
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (consolidation, sequencing, format, address, assembly)
//! - [`adapters`] - Staging store, address cache and HTTP postal-code providers
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bpagen::adapters::database::create_stores;
//! use bpagen::config::load_config;
//! use bpagen::core::address::{AddressRepairer, AddressResolver};
//! use bpagen::core::assembly::{FileAssembler, GenerationOptions};
//! use bpagen::core::job::JobContext;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bpagen.toml")?;
//!     let (staging, cache) = create_stores(&config).await?;
//!
//!     let repairer = AddressRepairer::new(AddressResolver::from_config(&config.address, cache)?);
//!     let assembler = FileAssembler::new(&config, staging, Some(repairer));
//!
//!     let ctx = JobContext::detached("generate");
//!     let summary = assembler
//!         .execute_generation(&GenerationOptions::from_config(&config), &ctx)
//!         .await?;
//!
//!     println!("{} lines written to {}", summary.record_count, summary.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Record encoding
//!
//! ```rust
//! use bpagen::core::format::format_record;
//! use bpagen::domain::{OrgType, ProductionRecord};
//!
//! let mut record = ProductionRecord::new(OrgType::Consolidated);
//! record.facility_code = "6896847".to_string();
//! record.quantity = "15".to_string();
//!
//! let line = format_record(&record);
//! assert!(line.ends_with("BPA\r\n"));
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error type is
//! [`domain::BpaError`]. The binary maps error categories to exit codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

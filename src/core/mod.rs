//! Core business logic for bpagen.
//!
//! # Modules
//!
//! - [`consolidation`] - aggregation passes and rule overrides over the staged rows
//! - [`sequencing`] - page and sequence numbering per record category
//! - [`format`] - fixed-width body lines and the batch header
//! - [`address`] - postal-code resolution chain and address repair
//! - [`job`] - job context, progress sinks and cancellation
//! - [`assembly`] - the generation job and staging maintenance jobs
//!
//! # Generation Workflow
//!
//! 1. **Load**: read every staged row
//! 2. **Consolidate**: aggregate, delete and override (all-or-nothing)
//! 3. **Repair** (optional): resolve each distinct postal code
//! 4. **Sequence**: assign page/sequence, then persist the prepared rows
//! 5. **Encode**: header plus one fixed-width line per record
//! 6. **Write**: temporary file renamed into place
//!
//! # Example
//!
//! ```rust,no_run
//! use bpagen::adapters::database::create_stores;
//! use bpagen::config::load_config;
//! use bpagen::core::assembly::{FileAssembler, GenerationOptions};
//! use bpagen::core::job::JobContext;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bpagen.toml")?;
//! let (staging, _cache) = create_stores(&config).await?;
//!
//! let assembler = FileAssembler::new(&config, staging, None);
//! let ctx = JobContext::detached("generate");
//! let summary = assembler
//!     .execute_generation(&GenerationOptions::from_config(&config), &ctx)
//!     .await?;
//!
//! println!("Wrote {}", summary.output_path.display());
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod assembly;
pub mod consolidation;
pub mod format;
pub mod job;
pub mod sequencing;

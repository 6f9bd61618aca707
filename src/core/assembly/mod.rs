//! Batch generation and staging maintenance jobs
//!
//! - [`assembler`] - the generation job ([`FileAssembler`])
//! - [`output`] - file ordering, encoding and the atomic write
//! - [`summary`] - [`GenerationSummary`] and its printable report
//! - [`maintenance`] - address repair and manual address correction over the staging store

pub mod assembler;
pub mod maintenance;
pub mod output;
pub mod summary;

pub use assembler::{FileAssembler, GenerationOptions};
pub use maintenance::{repair_staged_addresses, set_staged_address};
pub use output::{encode_batch, output_file_name, sort_for_output, write_atomically};
pub use summary::{GenerationReport, GenerationSummary};

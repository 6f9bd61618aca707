//! Fixed-width encoding of body lines and the batch header
//!
//! - [`field`] - per-value encoding rules ([`format_field`])
//! - [`layout`] - the consolidated and individualized line layouts ([`format_record`])
//! - [`header`] - control field and header line ([`BatchHeader`])

pub mod field;
pub mod header;
pub mod layout;

pub use field::{format_field, format_spec, FieldKind, FieldSpec};
pub use header::{control_field, BatchHeader, Submitter, HEADER_WIDTH};
pub use layout::{format_record, layout_for, line_width, LINE_TERMINATOR};

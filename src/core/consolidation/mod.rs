//! Consolidation of staged production rows
//!
//! [`Consolidator::consolidate`] turns the raw staging rows into the final
//! exportable set: per-procedure aggregation into consolidated rows, removal
//! of deprecated individualized rows, diagnosis and facility overrides, and
//! the fallback address backstop. Tables live in [`rules`].

pub mod procedures;
pub mod rules;

pub use procedures::{ConsolidationReport, Consolidator};
pub use rules::{AddressBackstop, ConsolidationRules};

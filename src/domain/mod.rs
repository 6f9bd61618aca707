//! Domain models and types for bpagen.
//!
//! The domain layer provides:
//! - **Production records** ([`ProductionRecord`], [`OrgType`], [`Field`])
//! - **Strongly-typed identifiers** ([`Competence`], [`FacilityCode`], [`PostalCode`])
//! - **Address tuples** ([`AddressInfo`], [`OnFileAddress`], [`Municipality`])
//! - **Error types** ([`BpaError`], [`AddressLookupError`]) and the [`Result`] alias
//!
//! ```rust
//! use bpagen::domain::{Competence, OrgType, ProductionRecord};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let competence = Competence::new("202403")?;
//! let mut record = ProductionRecord::new(OrgType::Consolidated);
//! record.competence = competence.to_string();
//! record.quantity = "4".to_string();
//! assert_eq!(record.numeric_quantity(), Some(4));
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod context;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

pub use address::{AddressInfo, Municipality, OnFileAddress};
pub use errors::{AddressLookupError, BpaError};
pub use ids::{Competence, FacilityCode, PostalCode};
pub use record::{parse_digits, Field, OrgType, ProductionRecord};
pub use result::Result;

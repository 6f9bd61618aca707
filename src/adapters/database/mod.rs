//! Storage abstraction layer
//!
//! Trait-based access to the staging table and the local address cache,
//! so the generator can run against PostgreSQL or in memory.

pub mod factory;
pub mod traits;

pub use factory::create_stores;
pub use traits::{AddressCache, StagingStore};

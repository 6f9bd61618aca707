//! Storage abstraction traits
//!
//! The generator talks to two stores through these traits: the staging
//! table holding production rows, and the local address cache. PostgreSQL
//! and in-memory implementations live in sibling modules.

use crate::domain::{AddressInfo, Competence, Municipality, PostalCode, ProductionRecord, Result};
use async_trait::async_trait;

/// Staging table of production rows
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Every staged row, in storage order
    async fn load_records(&self) -> Result<Vec<ProductionRecord>>;

    /// Replace the whole staged set with `records`
    ///
    /// Runs as one transaction: either every row is replaced or nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; the store is left untouched.
    async fn replace_records(&self, records: &[ProductionRecord]) -> Result<()>;

    /// Latest competence among the staged rows
    async fn competence(&self) -> Result<Option<Competence>>;
}

/// Local postal-code and municipality tables
#[async_trait]
pub trait AddressCache: Send + Sync {
    /// Exact postal-code match
    async fn find_by_postal_code(&self, code: &PostalCode) -> Result<Option<AddressInfo>>;

    /// First address whose street contains `street` (case-insensitive) inside
    /// the given municipality and state
    async fn find_by_street(
        &self,
        street: &str,
        municipality_code: &str,
        state: &str,
    ) -> Result<Option<AddressInfo>>;

    /// Municipality whose IBGE code starts with `code_prefix`
    async fn find_municipality(&self, code_prefix: &str) -> Result<Option<Municipality>>;
}

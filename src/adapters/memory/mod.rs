//! In-memory stores for dry runs and tests

use crate::adapters::database::traits::{AddressCache, StagingStore};
use crate::domain::{
    AddressInfo, BpaError, Competence, Municipality, PostalCode, ProductionRecord, Result,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Staging store backed by a vector
#[derive(Debug, Default)]
pub struct InMemoryStagingStore {
    records: RwLock<Vec<ProductionRecord>>,
    read_only: AtomicBool,
}

impl InMemoryStagingStore {
    pub fn new(records: Vec<ProductionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            read_only: AtomicBool::new(false),
        }
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> Vec<ProductionRecord> {
        self.records.read().await.clone()
    }

    /// Makes every subsequent `replace_records` fail without changing anything
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

#[async_trait]
impl StagingStore for InMemoryStagingStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn load_records(&self) -> Result<Vec<ProductionRecord>> {
        Ok(self.snapshot().await)
    }

    async fn replace_records(&self, records: &[ProductionRecord]) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(BpaError::Database(
                "Staging store is read-only".to_string(),
            ));
        }
        *self.records.write().await = records.to_vec();
        Ok(())
    }

    async fn competence(&self) -> Result<Option<Competence>> {
        let records = self.records.read().await;
        records
            .iter()
            .map(|r| r.competence.trim())
            .filter(|c| !c.is_empty())
            .max()
            .map(|c| Competence::new(c).map_err(BpaError::Validation))
            .transpose()
    }
}

/// Cached postal code with the state it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAddress {
    pub address: AddressInfo,
    pub state: String,
}

/// Address cache backed by in-memory tables
#[derive(Debug, Default)]
pub struct InMemoryAddressCache {
    addresses: Vec<CachedAddress>,
    /// IBGE code -> municipality
    municipalities: BTreeMap<String, Municipality>,
}

impl InMemoryAddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: AddressInfo, state: impl Into<String>) -> Self {
        self.addresses.push(CachedAddress {
            address,
            state: state.into(),
        });
        self
    }

    pub fn with_municipality(
        mut self,
        code: impl Into<String>,
        name: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.municipalities.insert(
            code.into(),
            Municipality {
                name: name.into(),
                state: state.into(),
            },
        );
        self
    }
}

#[async_trait]
impl AddressCache for InMemoryAddressCache {
    async fn find_by_postal_code(&self, code: &PostalCode) -> Result<Option<AddressInfo>> {
        Ok(self
            .addresses
            .iter()
            .find(|entry| entry.address.postal_code == code.as_str())
            .map(|entry| entry.address.clone()))
    }

    async fn find_by_street(
        &self,
        street: &str,
        municipality_code: &str,
        state: &str,
    ) -> Result<Option<AddressInfo>> {
        let wanted = street.trim().to_lowercase();
        Ok(self
            .addresses
            .iter()
            .find(|entry| {
                entry.address.street.to_lowercase().contains(&wanted)
                    && entry
                        .address
                        .municipality_code
                        .starts_with(municipality_code)
                    && entry.state == state
            })
            .map(|entry| entry.address.clone()))
    }

    async fn find_municipality(&self, code_prefix: &str) -> Result<Option<Municipality>> {
        Ok(self
            .municipalities
            .iter()
            .find(|(code, _)| code.starts_with(code_prefix))
            .map(|(_, municipality)| municipality.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrgType;

    fn record(competence: &str) -> ProductionRecord {
        let mut r = ProductionRecord::new(OrgType::Individualized);
        r.competence = competence.to_string();
        r
    }

    #[tokio::test]
    async fn test_staging_store_replace() {
        let store = InMemoryStagingStore::new(vec![record("202403")]);
        store
            .replace_records(&[record("202403"), record("202403")])
            .await
            .unwrap();
        assert_eq!(store.load_records().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_read_only_store_keeps_contents() {
        let store = InMemoryStagingStore::new(vec![record("202403")]);
        store.set_read_only(true);
        assert!(store.replace_records(&[]).await.is_err());
        assert_eq!(store.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_competence_skips_blank_rows() {
        let store = InMemoryStagingStore::new(vec![record(""), record("202402")]);
        assert_eq!(
            store.competence().await.unwrap().unwrap().as_str(),
            "202402"
        );
        let empty = InMemoryStagingStore::default();
        assert!(empty.competence().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_competence_is_latest_regardless_of_order() {
        let newest_last = InMemoryStagingStore::new(vec![record("202402"), record("202403")]);
        let newest_first = InMemoryStagingStore::new(vec![record("202403"), record("202402")]);
        for store in [newest_last, newest_first] {
            assert_eq!(
                store.competence().await.unwrap().unwrap().as_str(),
                "202403"
            );
        }
    }

    #[tokio::test]
    async fn test_address_cache_lookups() {
        let cache = InMemoryAddressCache::new()
            .with_address(
                AddressInfo::new("Rua Brasil", "Centro", "07401050", "3503901"),
                "SP",
            )
            .with_municipality("3503901", "Arujá", "SP");

        let code = PostalCode::new("07401050").unwrap();
        assert!(cache.find_by_postal_code(&code).await.unwrap().is_some());

        let by_street = cache.find_by_street("brasil", "350390", "SP").await.unwrap();
        assert_eq!(by_street.unwrap().postal_code, "07401050");
        assert!(cache
            .find_by_street("brasil", "350390", "RJ")
            .await
            .unwrap()
            .is_none());

        let municipality = cache.find_municipality("350390").await.unwrap().unwrap();
        assert_eq!(municipality.name, "Arujá");
    }
}

//! Resolution strategies
//!
//! Each strategy answers one postal-code query or passes. The resolver runs
//! them in order until one produces an address.

use crate::adapters::cep::{
    truncate_municipality, PostalCodeProvider, StreetSearch, StreetSearchProvider,
};
use crate::adapters::database::AddressCache;
use crate::domain::{AddressInfo, OnFileAddress, PostalCode, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// One postal code to resolve, plus what the record set already says about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    pub postal_code: PostalCode,
    pub on_file: Option<OnFileAddress>,
}

impl AddressQuery {
    pub fn new(postal_code: PostalCode) -> Self {
        Self {
            postal_code,
            on_file: None,
        }
    }

    pub fn with_on_file(mut self, on_file: OnFileAddress) -> Self {
        self.on_file = Some(on_file);
        self
    }
}

#[async_trait]
pub trait AddressStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` passes to the next strategy
    async fn resolve(&self, query: &AddressQuery) -> Result<Option<AddressInfo>>;
}

/// Exact match in the local cache
pub struct LocalCacheStrategy {
    cache: Arc<dyn AddressCache>,
}

impl LocalCacheStrategy {
    pub fn new(cache: Arc<dyn AddressCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl AddressStrategy for LocalCacheStrategy {
    fn name(&self) -> &'static str {
        "local-cache"
    }

    async fn resolve(&self, query: &AddressQuery) -> Result<Option<AddressInfo>> {
        self.cache.find_by_postal_code(&query.postal_code).await
    }
}

/// Direct lookup against an HTTP provider
pub struct ProviderStrategy {
    provider: Arc<dyn PostalCodeProvider>,
}

impl ProviderStrategy {
    pub fn new(provider: Arc<dyn PostalCodeProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl AddressStrategy for ProviderStrategy {
    fn name(&self) -> &'static str {
        self.provider.name()
    }

    async fn resolve(&self, query: &AddressQuery) -> Result<Option<AddressInfo>> {
        Ok(self.provider.lookup(&query.postal_code).await?)
    }
}

/// Uses the street already on file: municipality from the IBGE table, then
/// the street in the local cache, then a street search
pub struct CrossReferenceStrategy {
    cache: Arc<dyn AddressCache>,
    street_search: Option<Arc<dyn StreetSearchProvider>>,
}

impl CrossReferenceStrategy {
    pub fn new(
        cache: Arc<dyn AddressCache>,
        street_search: Option<Arc<dyn StreetSearchProvider>>,
    ) -> Self {
        Self {
            cache,
            street_search,
        }
    }
}

#[async_trait]
impl AddressStrategy for CrossReferenceStrategy {
    fn name(&self) -> &'static str {
        "cross-reference"
    }

    async fn resolve(&self, query: &AddressQuery) -> Result<Option<AddressInfo>> {
        let Some(on_file) = &query.on_file else {
            return Ok(None);
        };
        let street = on_file.street.trim();
        let prefix = truncate_municipality(&on_file.municipality_code);
        if street.is_empty() || prefix.len() < 6 {
            return Ok(None);
        }

        let Some(municipality) = self.cache.find_municipality(&prefix).await? else {
            tracing::debug!(municipality_code = %prefix, "Municipality not in local table");
            return Ok(None);
        };

        match self
            .cache
            .find_by_street(street, &prefix, &municipality.state)
            .await
        {
            Ok(Some(found)) => return Ok(Some(found)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(postal_code = %query.postal_code, error = %e, "Local street search failed");
            }
        }

        let Some(search) = &self.street_search else {
            return Ok(None);
        };
        let neighborhood = Some(on_file.neighborhood.trim()).filter(|n| !n.is_empty());
        Ok(search
            .search_street(&StreetSearch {
                state: &municipality.state,
                city: &municipality.name,
                street,
                neighborhood,
                municipality_prefix: Some(&prefix),
            })
            .await?)
    }
}

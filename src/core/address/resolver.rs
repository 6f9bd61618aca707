//! Ordered fallback chain over the resolution strategies

use super::strategy::{
    AddressQuery, AddressStrategy, CrossReferenceStrategy, LocalCacheStrategy, ProviderStrategy,
};
use super::strip_street_prefix;
use crate::adapters::cep::{
    apicep, opencep, returned_postal_code, truncate_municipality, viacep, ApiCepProvider,
    OpenCepProvider, RequestPolicy, StreetSearchProvider, ViaCepProvider,
};
use crate::adapters::database::AddressCache;
use crate::config::AddressConfig;
use crate::domain::{AddressInfo, Result};
use std::sync::Arc;

/// Runs strategies in order until one returns an address
///
/// The default chain is: local cache, OpenCEP, cross-reference (local street
/// match, then ViaCEP street search), ViaCEP, ApiCEP. Strategy errors are
/// logged and treated as a miss.
pub struct AddressResolver {
    strategies: Vec<Box<dyn AddressStrategy>>,
}

impl AddressResolver {
    pub fn new(strategies: Vec<Box<dyn AddressStrategy>>) -> Self {
        Self { strategies }
    }

    /// Builds the default chain; disabled providers are left out
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built
    pub fn from_config(config: &AddressConfig, cache: Arc<dyn AddressCache>) -> Result<Self> {
        let providers = &config.providers;
        let mut strategies: Vec<Box<dyn AddressStrategy>> =
            vec![Box::new(LocalCacheStrategy::new(cache.clone()))];

        if providers.opencep.enabled {
            let policy =
                RequestPolicy::from_config(config, &providers.opencep, opencep::DEFAULT_DELAY_MS);
            let provider = OpenCepProvider::new(providers.opencep.base_url.as_deref(), policy)?;
            strategies.push(Box::new(ProviderStrategy::new(Arc::new(provider))));
        }

        let street_search = if providers.viacep.enabled {
            let policy =
                RequestPolicy::from_config(config, &providers.viacep, viacep::DEFAULT_DELAY_MS);
            Some(Arc::new(ViaCepProvider::new(
                providers.viacep.base_url.as_deref(),
                policy,
            )?))
        } else {
            None
        };

        strategies.push(Box::new(CrossReferenceStrategy::new(
            cache,
            street_search.clone().map(|p| p as Arc<dyn StreetSearchProvider>),
        )));

        if let Some(provider) = street_search {
            strategies.push(Box::new(ProviderStrategy::new(provider)));
        }

        if providers.apicep.enabled {
            let policy =
                RequestPolicy::from_config(config, &providers.apicep, apicep::DEFAULT_DELAY_MS);
            let provider = ApiCepProvider::new(providers.apicep.base_url.as_deref(), policy)?;
            strategies.push(Box::new(ProviderStrategy::new(Arc::new(provider))));
        }

        Ok(Self::new(strategies))
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// First address any strategy finds, normalized
    pub async fn resolve(&self, query: &AddressQuery) -> Option<AddressInfo> {
        for strategy in &self.strategies {
            match strategy.resolve(query).await {
                Ok(Some(found)) => {
                    tracing::debug!(
                        postal_code = %query.postal_code,
                        strategy = strategy.name(),
                        "Postal code resolved"
                    );
                    return Some(normalize(found, query));
                }
                Ok(None) => {
                    tracing::trace!(
                        postal_code = %query.postal_code,
                        strategy = strategy.name(),
                        "No result"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        postal_code = %query.postal_code,
                        strategy = strategy.name(),
                        error = %e,
                        "Strategy failed, trying next"
                    );
                }
            }
        }

        tracing::info!(postal_code = %query.postal_code, "Postal code could not be resolved");
        None
    }
}

fn normalize(found: AddressInfo, query: &AddressQuery) -> AddressInfo {
    AddressInfo {
        street: strip_street_prefix(found.street.trim()).to_string(),
        neighborhood: found.neighborhood.trim().to_string(),
        postal_code: returned_postal_code(&found.postal_code, &query.postal_code),
        municipality_code: truncate_municipality(&found.municipality_code),
    }
}

//! ViaCEP provider
//!
//! - lookup: `GET {base}/ws/{cep}/json/`
//! - street search: `GET {base}/ws/{uf}/{city}/{street}/json/`, answering a list

use super::opencep::is_error_flag;
use super::{
    returned_postal_code, truncate_municipality, PostalCodeProvider, ProviderHttp,
    RequestPolicy, StreetSearch, StreetSearchProvider,
};
use crate::domain::{AddressInfo, AddressLookupError, PostalCode};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br";
pub const DEFAULT_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Deserialize)]
struct ViaCepAddress {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    ibge: String,
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ViaCepProvider {
    http: ProviderHttp,
}

impl ViaCepProvider {
    pub fn new(base_url: Option<&str>, policy: RequestPolicy) -> Result<Self, AddressLookupError> {
        Ok(Self {
            http: ProviderHttp::new(base_url.unwrap_or(DEFAULT_BASE_URL), policy)?,
        })
    }
}

#[async_trait]
impl PostalCodeProvider for ViaCepProvider {
    fn name(&self) -> &'static str {
        "viacep"
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<AddressInfo>, AddressLookupError> {
        let url = self.http.url(&format!("ws/{code}/json/"));
        tracing::debug!(postal_code = %code, provider = "viacep", "Querying provider");

        let Some(body) = self.http.get_json::<ViaCepAddress>(&url).await? else {
            return Ok(None);
        };
        if is_error_flag(body.erro.as_ref()) {
            return Ok(None);
        }

        Ok(Some(AddressInfo::new(
            body.logradouro,
            body.bairro,
            returned_postal_code(&body.cep, code),
            truncate_municipality(&body.ibge),
        )))
    }
}

#[async_trait]
impl StreetSearchProvider for ViaCepProvider {
    fn name(&self) -> &'static str {
        "viacep"
    }

    async fn search_street(
        &self,
        query: &StreetSearch<'_>,
    ) -> Result<Option<AddressInfo>, AddressLookupError> {
        if query.street.trim().is_empty() {
            return Ok(None);
        }

        let url = self.http.segments_url(&[
            "ws",
            query.state,
            query.city,
            query.street,
            "json",
            "",
        ])?;
        tracing::debug!(
            state = query.state,
            city = query.city,
            street = query.street,
            "Searching street"
        );

        // An unknown street answers an object with `erro` instead of a list
        let Some(body) = self.http.get_json::<serde_json::Value>(&url).await? else {
            return Ok(None);
        };
        let candidates: Vec<ViaCepAddress> = match body {
            serde_json::Value::Array(_) => serde_json::from_value(body)
                .map_err(|e| AddressLookupError::InvalidResponse(e.to_string()))?,
            _ => Vec::new(),
        };

        Ok(pick_candidate(candidates, query.neighborhood, query.municipality_prefix).map(
            |chosen| {
                let postal_code = PostalCode::normalize(&chosen.cep)
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                AddressInfo::new(
                    chosen.logradouro,
                    chosen.bairro,
                    postal_code,
                    truncate_municipality(&chosen.ibge),
                )
            },
        ))
    }
}

/// Narrows by neighborhood, then by municipality prefix when still ambiguous
fn pick_candidate(
    mut candidates: Vec<ViaCepAddress>,
    neighborhood: Option<&str>,
    municipality_prefix: Option<&str>,
) -> Option<ViaCepAddress> {
    let neighborhood = neighborhood
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty());

    if let Some(wanted) = &neighborhood {
        let matching: Vec<ViaCepAddress> = candidates
            .iter()
            .filter(|c| c.bairro.trim().to_lowercase() == *wanted)
            .cloned()
            .collect();
        if !matching.is_empty() {
            candidates = matching;
        }
    }

    if let Some(prefix) = municipality_prefix.filter(|p| !p.is_empty()) {
        if neighborhood.is_none() || candidates.len() > 1 {
            let matching: Vec<ViaCepAddress> = candidates
                .iter()
                .filter(|c| c.ibge.starts_with(prefix))
                .cloned()
                .collect();
            if !matching.is_empty() {
                candidates = matching;
            }
        }
    }

    candidates.into_iter().next()
}

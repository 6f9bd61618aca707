//! ApiCEP provider: `GET {base}/file/apicep/{NNNNN-NNN}.json`
//!
//! The body carries its own `status`; only `200` without an error message
//! counts as a hit. No municipality code is returned.

use super::{returned_postal_code, PostalCodeProvider, ProviderHttp, RequestPolicy};
use crate::domain::{AddressInfo, AddressLookupError, PostalCode};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://cdn.apicep.com";
pub const DEFAULT_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct ApiCepResponse {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    code: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    district: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug)]
pub struct ApiCepProvider {
    http: ProviderHttp,
}

impl ApiCepProvider {
    pub fn new(base_url: Option<&str>, policy: RequestPolicy) -> Result<Self, AddressLookupError> {
        Ok(Self {
            http: ProviderHttp::new(base_url.unwrap_or(DEFAULT_BASE_URL), policy)?,
        })
    }
}

#[async_trait]
impl PostalCodeProvider for ApiCepProvider {
    fn name(&self) -> &'static str {
        "apicep"
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<AddressInfo>, AddressLookupError> {
        let url = self
            .http
            .url(&format!("file/apicep/{}.json", code.hyphenated()));
        tracing::debug!(postal_code = %code, provider = self.name(), "Querying provider");

        let Some(body) = self.http.get_json::<ApiCepResponse>(&url).await? else {
            return Ok(None);
        };

        let failed = body.error_message.as_deref().is_some_and(|m| !m.is_empty());
        if body.status != Some(200) || failed {
            tracing::debug!(
                postal_code = %code,
                status = ?body.status,
                message = body.message.as_deref().unwrap_or_default(),
                "ApiCEP reported no address"
            );
            return Ok(None);
        }

        Ok(Some(AddressInfo::new(
            body.address,
            body.district,
            returned_postal_code(&body.code, code),
            String::new(),
        )))
    }
}

//! OpenCEP provider: `GET {base}/v1/{cep}.json`

use super::{truncate_municipality, PostalCodeProvider, ProviderHttp, RequestPolicy};
use crate::domain::{AddressInfo, AddressLookupError, PostalCode};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://opencep.com";
pub const DEFAULT_DELAY_MS: u64 = 100;

#[derive(Debug, Deserialize)]
struct OpenCepResponse {
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
pub struct OpenCepProvider {
    http: ProviderHttp,
}

impl OpenCepProvider {
    pub fn new(base_url: Option<&str>, policy: RequestPolicy) -> Result<Self, AddressLookupError> {
        Ok(Self {
            http: ProviderHttp::new(base_url.unwrap_or(DEFAULT_BASE_URL), policy)?,
        })
    }
}

#[async_trait]
impl PostalCodeProvider for OpenCepProvider {
    fn name(&self) -> &'static str {
        "opencep"
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<AddressInfo>, AddressLookupError> {
        let url = self.http.url(&format!("v1/{code}.json"));
        tracing::debug!(postal_code = %code, provider = self.name(), "Querying provider");

        let Some(body) = self.http.get_json::<OpenCepResponse>(&url).await? else {
            return Ok(None);
        };
        if is_error_flag(body.erro.as_ref()) {
            return Ok(None);
        }

        // OpenCEP echoes the queried code
        Ok(Some(AddressInfo::new(
            body.logradouro,
            body.bairro,
            code.to_string(),
            truncate_municipality(&body.ibge),
        )))
    }
}

/// `erro` arrives as `true` or `"true"` depending on the service version
pub(crate) fn is_error_flag(flag: Option<&serde_json::Value>) -> bool {
    match flag {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

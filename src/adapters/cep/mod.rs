//! HTTP postal-code providers
//!
//! Three public services answer postal-code queries:
//!
//! - [`OpenCepProvider`] - primary lookup
//! - [`ViaCepProvider`] - lookup plus search by state/city/street
//! - [`ApiCepProvider`] - last resort, hyphenated codes
//!
//! Every provider owns a [`RequestPolicy`]: a per-request timeout and a
//! minimum spacing between two calls, enforced by its own rate limiter.
//! Failures surface as [`AddressLookupError`]; a provider that simply has
//! no address for the code answers `Ok(None)`.

pub mod apicep;
pub mod opencep;
pub mod viacep;

pub use apicep::ApiCepProvider;
pub use opencep::OpenCepProvider;
pub use viacep::ViaCepProvider;

use crate::config::{AddressConfig, ProviderConfig};
use crate::domain::{AddressInfo, AddressLookupError, PostalCode};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

const USER_AGENT: &str = concat!("bpagen/", env!("CARGO_PKG_VERSION"));

/// Lookup of one postal code against a remote service
#[async_trait]
pub trait PostalCodeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, code: &PostalCode) -> Result<Option<AddressInfo>, AddressLookupError>;
}

/// Search of a street inside a municipality
#[async_trait]
pub trait StreetSearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// First candidate matching the neighborhood when one is given, otherwise
    /// the municipality prefix
    async fn search_street(
        &self,
        query: &StreetSearch<'_>,
    ) -> Result<Option<AddressInfo>, AddressLookupError>;
}

/// Parameters of a street search
#[derive(Debug, Clone, Copy)]
pub struct StreetSearch<'a> {
    /// Two-letter state abbreviation
    pub state: &'a str,
    pub city: &'a str,
    pub street: &'a str,
    pub neighborhood: Option<&'a str>,
    pub municipality_prefix: Option<&'a str>,
}

/// Timeout and call spacing for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    pub timeout: Duration,
    pub min_interval: Duration,
}

impl RequestPolicy {
    pub fn new(timeout: Duration, min_interval: Duration) -> Self {
        Self {
            timeout,
            min_interval,
        }
    }

    /// Policy from the address section, falling back to the provider's default delay
    pub fn from_config(
        address: &AddressConfig,
        provider: &ProviderConfig,
        default_delay_ms: u64,
    ) -> Self {
        Self::new(
            Duration::from_millis(address.request_timeout_ms),
            Duration::from_millis(provider.delay_ms.unwrap_or(default_delay_ms)),
        )
    }
}

/// Enforces a minimum interval between consecutive calls
#[derive(Debug)]
pub(crate) struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Waits until the provider may be called again
    pub(crate) async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::trace!(wait_ms = wait_time.as_millis() as u64, "Rate limiting");
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Shared HTTP plumbing of the three providers
#[derive(Debug)]
pub(crate) struct ProviderHttp {
    client: Client,
    limiter: RateLimiter,
    base_url: String,
}

impl ProviderHttp {
    pub(crate) fn new(base_url: &str, policy: RequestPolicy) -> Result<Self, AddressLookupError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(policy.timeout)
            .connect_timeout(policy.timeout)
            .build()
            .map_err(|e| AddressLookupError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(policy.min_interval),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Appends each segment percent-encoded; an empty last segment keeps the
    /// trailing slash
    pub(crate) fn segments_url(&self, segments: &[&str]) -> Result<String, AddressLookupError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            AddressLookupError::ConnectionFailed(format!("Invalid base URL {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                AddressLookupError::ConnectionFailed(format!(
                    "Base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// GETs `url` and decodes the body; 404 maps to `Ok(None)`
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, AddressLookupError> {
        self.limiter.wait().await;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AddressLookupError::Timeout(url.to_string())
            } else {
                AddressLookupError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.is_server_error() || status.is_client_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(if status.is_server_error() {
                AddressLookupError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                AddressLookupError::ClientError {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        response.json::<T>().await.map(Some).map_err(|e| {
            if e.is_timeout() {
                AddressLookupError::Timeout(url.to_string())
            } else {
                AddressLookupError::InvalidResponse(e.to_string())
            }
        })
    }
}

/// First six digits of an IBGE municipality code
pub fn truncate_municipality(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_digit()).take(6).collect()
}

/// Digits of the returned postal code, or the queried code when they are not eight
pub fn returned_postal_code(returned: &str, queried: &PostalCode) -> String {
    PostalCode::normalize(returned)
        .map(|code| code.to_string())
        .unwrap_or_else(|| queried.to_string())
}

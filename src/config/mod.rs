//! Configuration management for bpagen.
//!
//! bpagen reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BPAGEN_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run switch
//! - [`StagingConfig`] - PostgreSQL staging store
//! - [`SubmissionConfig`] - submitter metadata written into the header
//! - [`OutputConfig`] - where the batch file lands and how it is named
//! - [`AddressConfig`] - postal-code repair, backstop address, HTTP providers
//! - [`ConsolidationConfig`] - overrides of the consolidation tables
//! - [`LoggingConfig`] - optional JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [staging]
//! connection_string = "${BPAGEN_PG_URL}"
//!
//! [submission]
//! responsible_name = "SECRETARIA MUNICIPAL DE SAUDE"
//! responsible_acronym = "SMS"
//! responsible_document = "46523015000135"
//! destination_name = "SECRETARIA MUNICIPAL DE SAUDE"
//! destination_indicator = "M"
//!
//! [output]
//! directory = "/srv/bpa"
//!
//! [address.providers.apicep]
//! enabled = false
//! ```
//!
//! ```rust,no_run
//! use bpagen::config::load_config;
//!
//! # fn example() {
//! match load_config("bpagen.toml") {
//!     Ok(config) => println!("Writing to {}", config.output.directory),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    AddressConfig, ApplicationConfig, BpaConfig, ConsolidationConfig, FallbackAddressConfig,
    LoggingConfig, OutputConfig, ProviderConfig, ProvidersConfig, StagingConfig,
    SubmissionConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};

//! CLI command implementations
//!
//! Every command returns its process exit code:
//! 0 success, 2 configuration error, 4 connection error, 5 fatal error,
//! 130 cancelled by a signal.

pub mod generate;
pub mod init;
pub mod repair;
pub mod set_address;
pub mod validate;

use crate::adapters::database::{create_stores, AddressCache, StagingStore};
use crate::config::{load_config, BpaConfig};
use crate::domain::BpaError;
use std::sync::Arc;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIGURATION: i32 = 2;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_CANCELLED: i32 = 130;

/// Exit code for an error that ended a command
pub fn exit_code_for(error: &BpaError) -> i32 {
    match error {
        BpaError::Configuration(_) | BpaError::Validation(_) => EXIT_CONFIGURATION,
        BpaError::Connection(_) => EXIT_CONNECTION,
        BpaError::Cancelled => EXIT_CANCELLED,
        _ => EXIT_FATAL,
    }
}

/// Loads the configuration, printing the failure; `Err` carries the exit code
pub(crate) fn load_or_report(config_path: &str) -> Result<BpaConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration: {e}");
        EXIT_CONFIGURATION
    })
}

/// Connects to the staging database, printing the failure; `Err` carries the exit code
pub(crate) async fn connect_or_report(
    config: &BpaConfig,
) -> Result<(Arc<dyn StagingStore>, Arc<dyn AddressCache>), i32> {
    create_stores(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to staging database");
        eprintln!("❌ Failed to connect to staging database: {e}");
        match e {
            BpaError::Configuration(_) => EXIT_CONFIGURATION,
            _ => EXIT_CONNECTION,
        }
    })
}

//! Store factory
//!
//! Both stores share one PostgreSQL connection pool.

use crate::adapters::database::traits::{AddressCache, StagingStore};
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::BpaConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the staging store and the address cache from the same pool
///
/// # Errors
///
/// Returns an error if the connection string is invalid, the pool cannot be
/// built or the schema cannot be verified
pub async fn create_stores(
    config: &BpaConfig,
) -> Result<(Arc<dyn StagingStore>, Arc<dyn AddressCache>)> {
    tracing::info!("Creating PostgreSQL staging store and address cache");
    let client = Arc::new(PostgreSQLClient::new(config.staging.clone()).await?);
    tracing::debug!(target_db = %client.connection_string_safe(), "Connection pool ready");
    client.ensure_schema().await?;
    let adapter = Arc::new(PostgreSQLAdapter::new_with_arc(client));

    Ok((
        adapter.clone() as Arc<dyn StagingStore>,
        adapter as Arc<dyn AddressCache>,
    ))
}

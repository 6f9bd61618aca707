//! Standalone address maintenance over the staging store

use crate::adapters::database::StagingStore;
use crate::core::address::{apply_chosen_address, AddressRepairer, RepairSummary};
use crate::core::job::JobContext;
use crate::domain::{BpaError, PostalCode, Result};

/// Repairs every staged postal code and persists the result
///
/// Nothing is persisted when the job fails or is cancelled part-way.
pub async fn repair_staged_addresses(
    staging: &dyn StagingStore,
    repairer: &AddressRepairer,
    dry_run: bool,
    ctx: &JobContext,
) -> Result<RepairSummary> {
    let result = async {
        ctx.ensure_active()?;
        let mut records = staging.load_records().await?;
        ctx.report(10);

        let summary = repairer.repair(&mut records, ctx).await?;
        ctx.report(90);

        if dry_run {
            tracing::info!("Dry run: repaired addresses not persisted");
        } else if summary.updated + summary.replaced > 0 {
            staging.replace_records(&records).await?;
        }
        summary.log_summary();
        Ok::<_, BpaError>(summary)
    }
    .await;

    match &result {
        Ok(_) => ctx.finish(),
        Err(e) => ctx.fail(e),
    }
    result
}

/// Writes a manually chosen street and neighborhood on every staged record
/// carrying `postal_code`; returns the number of records changed
pub async fn set_staged_address(
    staging: &dyn StagingStore,
    postal_code: &PostalCode,
    street: &str,
    neighborhood: &str,
    dry_run: bool,
) -> Result<usize> {
    let mut records = staging.load_records().await?;
    let changed = apply_chosen_address(&mut records, postal_code, street, neighborhood);

    if changed == 0 {
        tracing::warn!(postal_code = %postal_code, "No staged record carries this postal code");
    } else if dry_run {
        tracing::info!(postal_code = %postal_code, changed, "Dry run: address not persisted");
    } else {
        staging.replace_records(&records).await?;
        tracing::info!(postal_code = %postal_code, changed, "Address set");
    }
    Ok(changed)
}

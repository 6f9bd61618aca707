//! Postal-code repair over a record set

use super::resolver::AddressResolver;
use super::strategy::AddressQuery;
use crate::core::job::JobContext;
use crate::domain::{OnFileAddress, PostalCode, ProductionRecord, Result};

/// Outcome of one repair pass, counted per distinct postal code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub total: usize,
    /// Resolved to the same postal code
    pub updated: usize,
    /// Resolved to a different postal code
    pub replaced: usize,
    pub failed: usize,
    /// Not eight digits after stripping punctuation
    pub skipped: usize,
}

impl RepairSummary {
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            updated = self.updated,
            replaced = self.replaced,
            failed = self.failed,
            skipped = self.skipped,
            "Address repair complete"
        );
    }
}

pub struct AddressRepairer {
    resolver: AddressResolver,
}

impl AddressRepairer {
    pub fn new(resolver: AddressResolver) -> Self {
        Self { resolver }
    }

    /// Resolves every distinct postal code, one at a time, and rewrites the
    /// address of each record carrying it
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::BpaError::Cancelled`] when the job is cancelled
    /// between two postal codes. Records already rewritten keep their changes.
    pub async fn repair(
        &self,
        records: &mut [ProductionRecord],
        ctx: &JobContext,
    ) -> Result<RepairSummary> {
        let mut summary = RepairSummary::default();
        let mut seen: Vec<String> = Vec::new();
        for record in records.iter() {
            let code = record.postal_code.trim();
            if !code.is_empty() && !seen.iter().any(|c| c == code) {
                seen.push(code.to_string());
            }
        }
        summary.total = seen.len();

        for raw in seen {
            ctx.ensure_active()?;

            let Some(code) = PostalCode::normalize(&raw) else {
                tracing::warn!(postal_code = %raw, "Skipping invalid postal code");
                summary.skipped += 1;
                continue;
            };

            let mut query = AddressQuery::new(code.clone());
            if let Some(first) = records.iter().find(|r| r.postal_code.trim() == raw) {
                query = query.with_on_file(OnFileAddress {
                    street: first.street.clone(),
                    neighborhood: first.neighborhood.clone(),
                    municipality_code: first.municipality_code.clone(),
                });
            }

            let Some(found) = self.resolver.resolve(&query).await else {
                summary.failed += 1;
                continue;
            };

            let mut rewritten = 0usize;
            for record in records.iter_mut().filter(|r| r.postal_code.trim() == raw) {
                overwrite_non_empty(&mut record.street, &found.street);
                overwrite_non_empty(&mut record.neighborhood, &found.neighborhood);
                overwrite_non_empty(&mut record.postal_code, &found.postal_code);
                overwrite_non_empty(&mut record.municipality_code, &found.municipality_code);
                rewritten += 1;
            }

            if found.postal_code == code.as_str() {
                summary.updated += 1;
            } else {
                tracing::info!(
                    from = %code,
                    to = %found.postal_code,
                    records = rewritten,
                    "Postal code replaced"
                );
                summary.replaced += 1;
            }
        }

        Ok(summary)
    }
}

fn overwrite_non_empty(target: &mut String, value: &str) {
    if !value.trim().is_empty() {
        *target = value.to_string();
    }
}

/// Writes a manually chosen street and neighborhood on every record with `postal_code`
///
/// Returns the number of records changed.
pub fn apply_chosen_address(
    records: &mut [ProductionRecord],
    postal_code: &PostalCode,
    street: &str,
    neighborhood: &str,
) -> usize {
    let mut changed = 0;
    for record in records.iter_mut().filter(|r| {
        PostalCode::normalize(&r.postal_code).is_some_and(|c| c == *postal_code)
    }) {
        record.street = street.trim().to_string();
        record.neighborhood = neighborhood.trim().to_string();
        changed += 1;
    }
    changed
}

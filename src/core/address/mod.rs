//! Postal-address resolution and repair
//!
//! [`AddressResolver`] walks an ordered list of [`AddressStrategy`] values
//! for one postal code and stops at the first hit. [`AddressRepairer`] runs
//! the resolver over every distinct postal code of a record set, strictly
//! one code at a time, and writes the result back.

pub mod repair;
pub mod resolver;
pub mod strategy;

pub use repair::{apply_chosen_address, AddressRepairer, RepairSummary};
pub use resolver::AddressResolver;
pub use strategy::{
    AddressQuery, AddressStrategy, CrossReferenceStrategy, LocalCacheStrategy, ProviderStrategy,
};

/// Drops the leading street-type word ("Rua", "Avenida", ...)
///
/// Single-word names are returned unchanged.
pub fn strip_street_prefix(street: &str) -> &str {
    match street.split_once(' ') {
        Some((_, rest)) => rest,
        None => street,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAddressCache;
    use crate::core::job::JobContext;
    use crate::domain::{AddressInfo, BpaError, OrgType, PostalCode, ProductionRecord, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        answer: Option<AddressInfo>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AddressStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn resolve(&self, _query: &AddressQuery) -> Result<Option<AddressInfo>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl AddressStrategy for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn resolve(&self, _query: &AddressQuery) -> Result<Option<AddressInfo>> {
            Err(BpaError::Address(crate::domain::AddressLookupError::Timeout(
                "stub".to_string(),
            )))
        }
    }

    fn fixed(answer: Option<AddressInfo>) -> (Box<dyn AddressStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Fixed {
                answer,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    fn query(code: &str) -> AddressQuery {
        AddressQuery::new(PostalCode::new(code).unwrap())
    }

    fn record(code: &str, street: &str) -> ProductionRecord {
        let mut r = ProductionRecord::new(OrgType::Individualized);
        r.postal_code = code.to_string();
        r.street = street.to_string();
        r.neighborhood = "Centro".to_string();
        r.municipality_code = "350390".to_string();
        r
    }

    #[test]
    fn test_strip_street_prefix() {
        assert_eq!(strip_street_prefix("Rua Brasil"), "Brasil");
        assert_eq!(strip_street_prefix("Avenida dos Expedicionários"), "dos Expedicionários");
        assert_eq!(strip_street_prefix("Brasil"), "Brasil");
        assert_eq!(strip_street_prefix(""), "");
    }

    #[tokio::test]
    async fn test_resolver_short_circuits() {
        let (first, first_calls) = fixed(Some(AddressInfo::new(
            "Rua Brasil",
            "Centro",
            "07401050",
            "3503901",
        )));
        let (second, second_calls) = fixed(None);
        let resolver = AddressResolver::new(vec![first, second]);

        let found = resolver.resolve(&query("07401050")).await.unwrap();
        assert_eq!(found.street, "Brasil");
        assert_eq!(found.municipality_code, "350390");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolver_falls_through_errors() {
        let (last, last_calls) = fixed(Some(AddressInfo::new("Rua A", "B", "", "")));
        let broken: Box<dyn AddressStrategy> = Box::new(Broken);
        let resolver = AddressResolver::new(vec![broken, last]);

        let found = resolver.resolve(&query("07401050")).await.unwrap();
        assert_eq!(found.postal_code, "07401050");
        assert_eq!(last_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolver_exhausted() {
        let (only, _) = fixed(None);
        let resolver = AddressResolver::new(vec![only]);
        assert!(resolver.resolve(&query("07401050")).await.is_none());
    }

    #[tokio::test]
    async fn test_cross_reference_uses_local_street() {
        let cache: Arc<InMemoryAddressCache> = Arc::new(
            InMemoryAddressCache::new()
                .with_address(
                    AddressInfo::new("Rua Brasil", "Centro", "07401050", "3503901"),
                    "SP",
                )
                .with_municipality("3503901", "Arujá", "SP"),
        );
        let strategy = CrossReferenceStrategy::new(cache, None);
        let query = query("07400000").with_on_file(crate::domain::OnFileAddress {
            street: "Brasil".to_string(),
            neighborhood: String::new(),
            municipality_code: "350390".to_string(),
        });

        let found = strategy.resolve(&query).await.unwrap().unwrap();
        assert_eq!(found.postal_code, "07401050");
    }

    #[tokio::test]
    async fn test_cross_reference_without_on_file_address() {
        let strategy = CrossReferenceStrategy::new(Arc::new(InMemoryAddressCache::new()), None);
        assert!(strategy.resolve(&query("07401050")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repair_counts_and_rewrites() {
        let (strategy, calls) = fixed(Some(AddressInfo::new(
            "Rua Brasil",
            "",
            "07401-050",
            "3503901",
        )));
        let repairer = AddressRepairer::new(AddressResolver::new(vec![strategy]));
        let mut records = vec![
            record("07401050", "Brasil velho"),
            record("07401050", ""),
            record("0740-105", "x"),
            record("", "sem cep"),
        ];

        let ctx = JobContext::detached("repair-addresses");
        let summary = repairer.repair(&mut records, &ctx).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(records[0].street, "Brasil");
        assert_eq!(records[1].street, "Brasil");
        // empty resolved neighborhood keeps the prior value
        assert_eq!(records[0].neighborhood, "Centro");
        assert_eq!(records[3].street, "sem cep");
    }

    #[tokio::test]
    async fn test_repair_replaced_and_failed() {
        let (strategy, _) = fixed(Some(AddressInfo::new("Rua Nova", "Jardim", "07402000", "")));
        let repairer = AddressRepairer::new(AddressResolver::new(vec![strategy]));
        let mut records = vec![record("07400000", "Rua Velha")];
        let ctx = JobContext::detached("repair-addresses");
        let summary = repairer.repair(&mut records, &ctx).await.unwrap();
        assert_eq!(summary.replaced, 1);
        assert_eq!(records[0].postal_code, "07402000");
        assert_eq!(records[0].municipality_code, "350390");

        let (strategy, _) = fixed(None);
        let repairer = AddressRepairer::new(AddressResolver::new(vec![strategy]));
        let summary = repairer.repair(&mut records, &ctx).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(records[0].street, "Nova");
    }

    #[tokio::test]
    async fn test_repair_stops_when_cancelled() {
        let (strategy, calls) = fixed(None);
        let repairer = AddressRepairer::new(AddressResolver::new(vec![strategy]));
        let mut records = vec![record("07401050", "Rua A")];
        let ctx = JobContext::detached("repair-addresses");
        ctx.cancellation_token().cancel();

        let err = repairer.repair(&mut records, &ctx).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_apply_chosen_address() {
        let mut records = vec![
            record("07401-050", "Rua A"),
            record("07401050", "Rua B"),
            record("07402000", "Rua C"),
        ];
        let code = PostalCode::new("07401050").unwrap();
        let changed = apply_chosen_address(&mut records, &code, " Brasil ", "Centro");
        assert_eq!(changed, 2);
        assert_eq!(records[0].street, "Brasil");
        assert_eq!(records[2].street, "Rua C");
    }
}

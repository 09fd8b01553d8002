use crate::domain::context::RotationContext;
use crate::domain::rotation::RotationRule;
use crate::error::RotationError;
use crate::rotation::filter::RotationFilterEngine;
use crate::rotation::store::CandidateStore;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct CachedRotations {
    context_id: Uuid,
    context_version: u64,
    exclusions: BTreeSet<Uuid>,
    rules: Vec<RotationRule>,
}

/// Filtered rotation set for one context instance, its version and an exclusion set.
#[derive(Debug, Clone, Default)]
pub struct RotationCache {
    inner: Option<CachedRotations>,
}

impl RotationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self, ctx: &RotationContext, exclusions: &BTreeSet<Uuid>) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|c| {
                c.context_id == ctx.id()
                    && c.context_version == ctx.version()
                    && &c.exclusions == exclusions
            })
    }

    pub fn invalidate(&mut self) {
        self.inner = None;
    }

    pub async fn get_or_compute<S: CandidateStore>(
        &mut self,
        ctx: &RotationContext,
        exclusions: &BTreeSet<Uuid>,
        engine: &RotationFilterEngine<S>,
    ) -> Result<&[RotationRule], RotationError> {
        if self.is_valid(ctx, exclusions) {
            tracing::debug!("rotation cache hit at context version {}", ctx.version());
        } else {
            tracing::debug!("rotation cache miss at context version {}", ctx.version());
            self.inner = None;
            let rules = engine.filter(ctx, exclusions).await?;
            self.inner = Some(CachedRotations {
                context_id: ctx.id(),
                context_version: ctx.version(),
                exclusions: exclusions.clone(),
                rules,
            });
        }

        Ok(self.inner.as_ref().map(|c| c.rules.as_slice()).unwrap_or(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rotation::ColumnValue;
    use crate::domain::rotation::{PaymentAccount, RotationRule};
    use crate::rotation::kind::ColumnSpec;
    use crate::rotation::memory_store::InMemoryRotationStore;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    const SCHEMA: [&str; 4] = ["country_id", "group_zone", "payment_account_id", "gateway"];

    fn us_rule() -> RotationRule {
        let mut columns = BTreeMap::new();
        columns.insert("country_id".to_string(), Some(ColumnValue::Int(840)));
        RotationRule {
            rotation_id: Uuid::new_v4(),
            priority: 1,
            ratio: 1,
            gateway_id: "stripe".to_string(),
            columns,
            account: PaymentAccount {
                account_id: Uuid::new_v4(),
                checkout_data: serde_json::Value::Null,
            },
        }
    }

    #[tokio::test]
    async fn contexts_at_same_version_do_not_share_entries() {
        let store = InMemoryRotationStore::new(&SCHEMA, vec![us_rule()]);
        let engine = RotationFilterEngine::new(Arc::new(ColumnSpec::country_zone()), store).unwrap();
        let mut us = RotationContext::new();
        us.set_column("country_id", Some(ColumnValue::Int(840)));
        let mut de = RotationContext::new();
        de.set_column("country_id", Some(ColumnValue::Int(276)));
        assert_eq!(us.version(), de.version());

        let mut cache = RotationCache::new();
        let none = BTreeSet::new();
        assert_eq!(cache.get_or_compute(&us, &none, &engine).await.unwrap().len(), 1);
        assert!(!cache.is_valid(&de, &none));
        assert!(cache.get_or_compute(&de, &none, &engine).await.unwrap().is_empty());

        let mut diverged = us.clone();
        diverged.set_column("country_id", Some(ColumnValue::Int(276)));
        us.set_column("country_id", Some(ColumnValue::Int(840)));
        assert_eq!(us.version(), diverged.version());
        assert_eq!(cache.get_or_compute(&us, &none, &engine).await.unwrap().len(), 1);
        assert!(cache.get_or_compute(&diverged, &none, &engine).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn version_bump_and_invalidate_clear_validity() {
        let store = InMemoryRotationStore::new(&SCHEMA, vec![]);
        let engine = RotationFilterEngine::new(Arc::new(ColumnSpec::country_zone()), store).unwrap();
        let mut ctx = RotationContext::new();
        let mut cache = RotationCache::new();
        let none = BTreeSet::new();

        assert!(!cache.is_valid(&ctx, &none));
        cache.get_or_compute(&ctx, &none, &engine).await.unwrap();
        assert!(cache.is_valid(&ctx, &none));

        ctx.set_column("country_id", Some(ColumnValue::Int(1)));
        assert!(!cache.is_valid(&ctx, &none));

        cache.get_or_compute(&ctx, &none, &engine).await.unwrap();
        cache.invalidate();
        assert!(!cache.is_valid(&ctx, &none));
    }
}

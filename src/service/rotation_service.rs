use crate::domain::context::RotationContext;
use crate::domain::country::Country;
use crate::domain::rotation::{ColumnValue, PaymentAccount, RotationRule};
use crate::error::RotationError;
use crate::rotation::cache::RotationCache;
use crate::rotation::filter::RotationFilterEngine;
use crate::rotation::grouping::group_by_gateway;
use crate::rotation::kind::RotationKind;
use crate::rotation::priority::highest_priority_tier;
use crate::rotation::store::CandidateStore;
use crate::rotation::weighted::{draw, ZeroRatioPolicy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutData {
    pub gateways: BTreeMap<String, serde_json::Value>,
}

/// Per-request account selection: one context, one cached rotation set.
pub struct PaymentRotationService<S> {
    engine: RotationFilterEngine<S>,
    context: RotationContext,
    cache: RotationCache,
    zero_ratio_policy: ZeroRatioPolicy,
}

impl<S: CandidateStore> PaymentRotationService<S> {
    pub fn new(kind: Arc<dyn RotationKind>, store: S) -> Result<Self, RotationError> {
        Ok(Self {
            engine: RotationFilterEngine::new(kind, store)?,
            context: RotationContext::new(),
            cache: RotationCache::new(),
            zero_ratio_policy: ZeroRatioPolicy::default(),
        })
    }

    pub fn with_zero_ratio_policy(mut self, policy: ZeroRatioPolicy) -> Self {
        self.zero_ratio_policy = policy;
        self
    }

    pub fn with_context(mut self, context: RotationContext) -> Self {
        self.context = context;
        self.cache.invalidate();
        self
    }

    pub fn context(&self) -> &RotationContext {
        &self.context
    }

    pub fn column(&self, key: &str) -> Option<&ColumnValue> {
        self.context.column(key)
    }

    pub fn set_column(&mut self, key: &str, value: Option<ColumnValue>) {
        self.context.set_column(key, value);
    }

    pub fn set_country(&mut self, country: &Country) {
        self.context.set_country(country);
    }

    /// Matching rotations ordered by the kind's ordering, before priority reduction.
    pub async fn rotations(&mut self, exclusions: &BTreeSet<Uuid>) -> Result<&[RotationRule], RotationError> {
        self.cache
            .get_or_compute(&self.context, exclusions, &self.engine)
            .await
    }

    pub async fn payment_account_for_each_gateway(
        &mut self,
        exclusions: &BTreeSet<Uuid>,
    ) -> Result<BTreeMap<String, PaymentAccount>, RotationError> {
        let mut rng = StdRng::from_entropy();
        self.payment_account_for_each_gateway_with_rng(exclusions, &mut rng)
            .await
    }

    pub async fn payment_account_for_each_gateway_with_rng<R: Rng + ?Sized>(
        &mut self,
        exclusions: &BTreeSet<Uuid>,
        rng: &mut R,
    ) -> Result<BTreeMap<String, PaymentAccount>, RotationError> {
        let policy = self.zero_ratio_policy;
        let rules = self.rotations(exclusions).await?;
        let tier = highest_priority_tier(rules);
        if tier.is_empty() {
            tracing::debug!("no rotation matched the current context");
        }

        let mut accounts = BTreeMap::new();
        for (gateway, candidates) in group_by_gateway(tier) {
            let winner = draw(&candidates, rng, policy).map_err(|err| {
                tracing::warn!("rotation draw failed for gateway {}: {}", gateway, err);
                err
            })?;
            tracing::debug!(
                "gateway={} account={} ratio={} candidates={}",
                gateway,
                winner.account.account_id,
                winner.ratio,
                candidates.len()
            );
            accounts.insert(gateway, winner.account.clone());
        }
        Ok(accounts)
    }

    pub async fn payment_account_for_gateway_with_rng<R: Rng + ?Sized>(
        &mut self,
        gateway: &str,
        exclusions: &BTreeSet<Uuid>,
        rng: &mut R,
    ) -> Result<PaymentAccount, RotationError> {
        let policy = self.zero_ratio_policy;
        let rules = self.rotations(exclusions).await?;
        let candidates: Vec<RotationRule> = highest_priority_tier(rules)
            .into_iter()
            .filter(|r| r.gateway_id == gateway)
            .collect();
        if candidates.is_empty() {
            return Err(RotationError::NoCandidates {
                gateway: Some(gateway.to_string()),
            });
        }
        draw(&candidates, rng, policy).map(|winner| winner.account.clone())
    }

    pub async fn checkout_data(&mut self, exclusions: &BTreeSet<Uuid>) -> Result<CheckoutData, RotationError> {
        let mut rng = StdRng::from_entropy();
        self.checkout_data_with_rng(exclusions, &mut rng).await
    }

    pub async fn checkout_data_with_rng<R: Rng + ?Sized>(
        &mut self,
        exclusions: &BTreeSet<Uuid>,
        rng: &mut R,
    ) -> Result<CheckoutData, RotationError> {
        let accounts = self
            .payment_account_for_each_gateway_with_rng(exclusions, rng)
            .await?;
        Ok(CheckoutData {
            gateways: accounts
                .into_iter()
                .map(|(gateway, account)| (gateway, account.checkout_data))
                .collect(),
        })
    }
}

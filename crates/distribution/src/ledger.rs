//! Reward ledger
//!
//! Persistent distribution state: the community pool and three buckets per
//! validator. Buckets are created lazily the first time a validator receives
//! an allocation and only grow during block processing (withdrawals are
//! handled elsewhere).

use serde::{Deserialize, Serialize};
use setl_types::{ConsAddress, DecCoins, OperatorId};
use std::collections::BTreeMap;

/// Community pool held by the distribution module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePool {
    pub community_pool: DecCoins,
}

/// Everything the distribution module stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardStore {
    fee_pool: FeePool,
    /// Total owed to a validator and its delegators, not yet withdrawn.
    outstanding: BTreeMap<OperatorId, DecCoins>,
    /// Commission accrued by a validator operator.
    commission: BTreeMap<OperatorId, DecCoins>,
    /// Delegator-shared rewards of the current period.
    current: BTreeMap<OperatorId, DecCoins>,
    /// Consensus address of the proposer of the previous block.
    previous_proposer: Option<ConsAddress>,
}

impl RewardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fee_pool(&self) -> &FeePool {
        &self.fee_pool
    }

    pub fn community_pool(&self) -> &DecCoins {
        &self.fee_pool.community_pool
    }

    pub fn credit_community_pool(&mut self, amount: &DecCoins) {
        self.fee_pool.community_pool = self.fee_pool.community_pool.add(amount);
    }

    pub fn outstanding_rewards(&self, validator: &OperatorId) -> DecCoins {
        self.outstanding.get(validator).cloned().unwrap_or_default()
    }

    pub fn set_outstanding_rewards(&mut self, validator: OperatorId, rewards: DecCoins) {
        self.outstanding.insert(validator, rewards);
    }

    pub fn accumulated_commission(&self, validator: &OperatorId) -> DecCoins {
        self.commission.get(validator).cloned().unwrap_or_default()
    }

    pub fn set_accumulated_commission(&mut self, validator: OperatorId, commission: DecCoins) {
        self.commission.insert(validator, commission);
    }

    pub fn current_rewards(&self, validator: &OperatorId) -> DecCoins {
        self.current.get(validator).cloned().unwrap_or_default()
    }

    pub fn set_current_rewards(&mut self, validator: OperatorId, rewards: DecCoins) {
        self.current.insert(validator, rewards);
    }

    pub fn previous_proposer(&self) -> Option<&ConsAddress> {
        self.previous_proposer.as_ref()
    }

    pub fn set_previous_proposer(&mut self, proposer: ConsAddress) {
        self.previous_proposer = Some(proposer);
    }

    /// Iterates validators with an outstanding-rewards bucket, ordered by id.
    pub fn outstanding_iter(&self) -> impl Iterator<Item = (&OperatorId, &DecCoins)> {
        self.outstanding.iter()
    }

    /// Sum of every validator's outstanding rewards.
    pub fn total_outstanding(&self) -> DecCoins {
        self.outstanding
            .values()
            .fold(DecCoins::new(), |acc, rewards| acc.add(rewards))
    }

    /// Everything the distribution account has to back.
    pub fn total_owed(&self) -> DecCoins {
        self.total_outstanding().add(self.community_pool())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use setl_types::Dec;

    fn stake(value: i64, prec: u32) -> DecCoins {
        DecCoins::single("stake", Dec::new_with_prec(value, prec))
    }

    #[test]
    fn test_buckets_default_to_zero() {
        let store = RewardStore::new();
        let validator = OperatorId::from_label("v0");
        assert!(store.outstanding_rewards(&validator).is_zero());
        assert!(store.accumulated_commission(&validator).is_zero());
        assert!(store.current_rewards(&validator).is_zero());
        assert!(store.previous_proposer().is_none());
    }

    #[test]
    fn test_totals() {
        let mut store = RewardStore::new();
        store.set_outstanding_rewards(OperatorId::from_label("v0"), stake(49, 0));
        store.set_outstanding_rewards(OperatorId::from_label("v1"), stake(245, 1));
        store.credit_community_pool(&stake(2, 0));
        store.credit_community_pool(&stake(5, 1));

        assert_eq!(store.community_pool(), &stake(25, 1));
        assert_eq!(store.total_outstanding(), stake(735, 1));
        assert_eq!(store.total_owed(), stake(76, 0));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut store = RewardStore::new();
        store.set_current_rewards(OperatorId::from_label("v0"), stake(1, 1));
        store.set_previous_proposer(ConsAddress::from_label("v0"));

        let json = serde_json::to_string(&store).unwrap();
        let restored: RewardStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
    }
}
